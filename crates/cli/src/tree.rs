use crate::view::TreeView;
use crate::WorkspaceArgs;
use modex_core::model::ModuleMap;
use std::io::IsTerminal;

pub async fn run(
    workspace: WorkspaceArgs,
    module: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let explorer = workspace.explorer();
    let snapshot = explorer.refresh().await?;
    let view = TreeView::new(std::io::stdout().is_terminal());

    let lines = match &module {
        Some(name) => module_lines(&view, &snapshot.map, name)?,
        None => view.render_tree(&snapshot.map, &snapshot.status),
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Entries of one module. A module without files renders as nothing.
fn module_lines(view: &TreeView, map: &ModuleMap, name: &str) -> Result<Vec<String>, String> {
    if !map.contains_key(name) {
        return Err(format!("No module named '{}'", name));
    }
    Ok(view.render_module(map, name))
}
