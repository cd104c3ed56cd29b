use modex_core::config::{ExplorerConfig, LabelStyle};
use modex_core::error::ModexError;
use modex_core::model::{ModuleMap, ScanStatus};
use modex_core::project::Scanner;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Creates each module directory with `index.ts` and `config.ts` inside.
fn workspace(module_dirs: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    for module in module_dirs {
        let full = dir.path().join(module);
        fs::create_dir_all(&full).unwrap();
        fs::write(full.join("index.ts"), "// Test file").unwrap();
        fs::write(full.join("config.ts"), "// Config file").unwrap();
    }
    dir
}

fn scan(roots: &[&Path], config: &ExplorerConfig) -> ModuleMap {
    let roots: Vec<PathBuf> = roots.iter().map(|r| r.to_path_buf()).collect();
    Scanner::scan(&roots, config).unwrap().map
}

fn labels(map: &ModuleMap, module: &str) -> Vec<String> {
    map[module].iter().map(|r| r.label.clone()).collect()
}

#[test]
fn test_convention_scan_finds_modules() {
    let ws = workspace(&[
        "apps/feature1/src/modules/auth",
        "apps/feature1/src/modules/users",
        "packages/core/src/modules/utils",
        "packages/ui/src/modules/components",
        "apps/feature1/src/lib/helpers",
        "tools/src/modules/ignored",
    ]);

    let map = scan(&[ws.path()], &ExplorerConfig::default());
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["auth", "users", "utils", "components"]);

    let auth = &map["auth"];
    assert_eq!(labels(&map, "auth"), vec!["config.ts", "index.ts"]);
    assert!(auth.iter().all(|r| r.root_folder == "apps/feature1"));
    assert!(auth.iter().all(|r| r.module_name == "auth"));
    assert_eq!(
        auth[1].file_path,
        ws.path().join("apps/feature1/src/modules/auth/index.ts")
    );
    assert_eq!(map["components"][0].root_folder, "packages/ui");
}

#[test]
fn test_same_named_modules_merge_across_roots() {
    let first = workspace(&["apps/web/src/modules/auth"]);
    let second = workspace(&["packages/core/src/modules/auth"]);

    let map = scan(&[first.path(), second.path()], &ExplorerConfig::default());
    assert_eq!(map.len(), 1);

    let folders: Vec<&str> = map["auth"].iter().map(|r| r.root_folder.as_str()).collect();
    assert_eq!(
        folders,
        vec!["apps/web", "apps/web", "packages/core", "packages/core"]
    );
}

#[test]
fn test_same_named_modules_merge_within_root() {
    let ws = workspace(&["apps/a/src/modules/shared", "packages/b/src/modules/shared"]);

    let map = scan(&[ws.path()], &ExplorerConfig::default());
    assert_eq!(map.len(), 1);
    assert_eq!(map["shared"].len(), 4);
}

#[test]
fn test_depth_limit_is_configurable() {
    let ws = workspace(&["apps/a/b/c/src/modules/deep", "apps/web/src/modules/shallow"]);

    let bounded = scan(&[ws.path()], &ExplorerConfig::default());
    assert!(bounded.contains_key("shallow"));
    assert!(!bounded.contains_key("deep"));

    let unbounded = ExplorerConfig {
        max_depth: None,
        ..Default::default()
    };
    let map = scan(&[ws.path()], &unbounded);
    assert!(map.contains_key("deep"));
    assert_eq!(map["deep"][0].root_folder, "apps/a/b/c");
}

#[test]
fn test_empty_module_dir_still_creates_entry() {
    let ws = tempdir().unwrap();
    fs::create_dir_all(ws.path().join("apps/web/src/modules/empty")).unwrap();

    let outcome = Scanner::scan(&[ws.path().to_path_buf()], &ExplorerConfig::default()).unwrap();
    assert_eq!(outcome.map.len(), 1);
    assert!(outcome.map["empty"].is_empty());
    assert_eq!(
        outcome.status,
        ScanStatus::Found {
            modules: 1,
            files: 0
        }
    );
}

#[test]
fn test_file_pattern_and_hidden_files() {
    let ws = workspace(&["apps/web/src/modules/auth"]);
    let module = ws.path().join("apps/web/src/modules/auth");
    fs::write(module.join("README.md"), "# auth").unwrap();
    fs::write(module.join(".DS_Store"), "").unwrap();
    fs::create_dir_all(module.join("components")).unwrap();
    fs::write(module.join("components/button.ts"), "").unwrap();

    let all = scan(&[ws.path()], &ExplorerConfig::default());
    assert_eq!(
        labels(&all, "auth"),
        vec!["README.md", "button.ts", "config.ts", "index.ts"]
    );

    let ts_only = ExplorerConfig {
        file_pattern: "**/*.ts".to_string(),
        ..Default::default()
    };
    let map = scan(&[ws.path()], &ts_only);
    assert_eq!(labels(&map, "auth"), vec!["button.ts", "config.ts", "index.ts"]);
}

#[test]
fn test_relative_labels() {
    let ws = workspace(&["apps/web/src/modules/auth"]);
    let config = ExplorerConfig {
        label_style: LabelStyle::Relative,
        ..Default::default()
    };

    let map = scan(&[ws.path()], &config);
    assert_eq!(
        labels(&map, "auth"),
        vec![
            "apps/web/src/modules/auth/config.ts",
            "apps/web/src/modules/auth/index.ts"
        ]
    );
}

#[test]
fn test_root_with_glob_characters_in_its_name() {
    let parent = tempdir().unwrap();
    let root = parent.path().join("[web]");
    for module in ["apps/x/src/modules/auth", "packages/{ui}/src/modules/buttons"] {
        let dir = root.join(module);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.ts"), "").unwrap();
    }

    let outcome = Scanner::scan(&[root.clone()], &ExplorerConfig::default()).unwrap();
    let keys: Vec<&str> = outcome.map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["auth", "buttons"]);
    assert_eq!(outcome.map["auth"][0].root_folder, "apps/x");
    assert_eq!(outcome.map["buttons"][0].root_folder, "packages/{ui}");
    assert_eq!(outcome.map["auth"][0].file_path, root.join("apps/x/src/modules/auth/a.ts"));
}

#[test]
fn test_custom_modules_folder() {
    let ws = workspace(&["apps/web/src/features/billing", "apps/web/src/modules/auth"]);
    let config = ExplorerConfig {
        modules_folder: "features".to_string(),
        ..Default::default()
    };

    let map = scan(&[ws.path()], &config);
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["billing"]);
}

#[test]
fn test_explicit_directories_ignore_roots() {
    let ws = workspace(&["apps/web/src/modules/auth"]);
    let shared = workspace(&["libs/payments", "libs/search"]);
    let config = ExplorerConfig {
        directories: vec![shared.path().join("libs/*").to_string_lossy().into_owned()],
        ..Default::default()
    };

    let map = scan(&[ws.path()], &config);
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["payments", "search"]);
    assert!(map["payments"].iter().all(|r| r.root_folder == "libs"));
}

#[test]
fn test_explicit_literal_directory() {
    let shared = workspace(&["vendor/widgets"]);
    let config = ExplorerConfig {
        directories: vec![
            shared.path().join("vendor/widgets").to_string_lossy().into_owned(),
            shared.path().join("vendor/missing").to_string_lossy().into_owned(),
        ],
        ..Default::default()
    };

    let outcome = Scanner::scan(&[], &config).unwrap();
    assert_eq!(outcome.map.len(), 1);
    assert_eq!(outcome.map["widgets"][0].root_folder, "vendor");
}

#[test]
fn test_no_matches_reports_patterns() {
    let ws = workspace(&["apps/web/src/lib/helpers"]);

    let outcome = Scanner::scan(&[ws.path().to_path_buf()], &ExplorerConfig::default()).unwrap();
    assert!(outcome.map.is_empty());
    assert_eq!(
        outcome.status,
        ScanStatus::NoMatches {
            patterns: vec![
                "apps/**/src/modules/*".to_string(),
                "packages/**/src/modules/*".to_string()
            ]
        }
    );
}

#[test]
fn test_no_input_each_call() {
    for _ in 0..2 {
        let outcome = Scanner::scan(&[], &ExplorerConfig::default()).unwrap();
        assert!(outcome.map.is_empty());
        assert_eq!(outcome.status, ScanStatus::NoInput);
    }
}

#[test]
fn test_invalid_file_pattern_is_an_error() {
    let ws = workspace(&["apps/web/src/modules/auth"]);
    let config = ExplorerConfig {
        file_pattern: "[unclosed".to_string(),
        ..Default::default()
    };

    let err = Scanner::scan(&[ws.path().to_path_buf()], &config).unwrap_err();
    assert!(matches!(err, ModexError::Pattern { .. }));
}
