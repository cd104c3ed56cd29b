mod open;
mod scan;
mod tree;
mod view;
mod watch;

use clap::{Args, Parser, Subcommand};
use modex_core::config::{ConfigOverrides, ConfigSource, JsonSettingsFile, LabelStyle};
use modex_core::Explorer;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "modex",
    version,
    about = "Browse the feature modules of a monorepo",
    long_about = "modex discovers module directories (apps/**/src/modules/* and \
                  packages/**/src/modules/* by default) across one or more workspace roots \
                  and shows them as a tree grouped by the app or package they live in."
)]
pub struct Cli {
    /// Also write logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the workspace and summarize discovered modules
    Scan {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Print the module map as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the module tree
    #[command(
        long_about = "Prints every module with its files grouped by root folder. \
                            With --module, only that module's entries are shown."
    )]
    Tree {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Only show the entries of this module
        #[arg(short, long, value_name = "NAME")]
        module: Option<String>,
    },
    /// Open a file in your editor ($VISUAL, $EDITOR or the system opener)
    Open {
        /// File to open
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Editor command to use instead of the environment
        #[arg(long, value_name = "PROGRAM")]
        with: Option<String>,
    },
    /// Keep the tree up to date as files and settings change
    #[command(
        long_about = "Prints the tree, then watches the workspace roots and the settings file. \
                            The tree is printed again after every refresh. Press Ctrl+C to stop."
    )]
    Watch {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
}

/// Options shared by every command that scans.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace root folders. Defaults to the current directory.
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Settings file holding `modulesExplorer.*` options
    /// [default: <first root>/.vscode/settings.json]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder under `src` that contains modules
    #[arg(long, value_name = "NAME")]
    pub modules_folder: Option<String>,

    /// Glob selecting files inside each module
    #[arg(long, value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Explicit module directory or glob (repeatable); disables convention discovery
    #[arg(long = "directory", value_name = "PATTERN")]
    pub directories: Vec<String>,

    /// Maximum search depth below each pattern's base folder
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Label files with their workspace-relative path
    #[arg(long)]
    pub relative_labels: bool,
}

impl WorkspaceArgs {
    pub fn roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
        } else {
            self.roots.clone()
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            directories: self.directories.clone(),
            modules_folder: self.modules_folder.clone(),
            file_pattern: self.file_pattern.clone(),
            max_depth: self.max_depth,
            label_style: self.relative_labels.then_some(LabelStyle::Relative),
        }
    }

    pub fn config_source(&self) -> Arc<dyn ConfigSource> {
        let file = match &self.config {
            Some(path) => JsonSettingsFile::new(path),
            None => {
                let roots = self.roots();
                JsonSettingsFile::for_root(&roots[0])
            }
        };
        Arc::new(file.with_overrides(self.overrides()))
    }

    pub fn explorer(&self) -> Arc<Explorer> {
        Arc::new(Explorer::new(self.roots(), self.config_source()))
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Watch { .. } => "watch",
        _ => "cli",
    };
    let _guard = modex_core::logging::init_logging(component, cli.verbose);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Scan { workspace, json } => rt.block_on(scan::run(workspace, json)),
        Commands::Tree { workspace, module } => rt.block_on(tree::run(workspace, module)),
        Commands::Open { path, with } => open::run(path, with),
        Commands::Watch { workspace } => rt.block_on(watch::run(workspace)),
    }
}
