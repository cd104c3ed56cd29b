use crate::view::ModuleRow;
use crate::WorkspaceArgs;
use modex_core::tree;
use tabled::settings::Style;
use tabled::Table;
use tracing::info;

pub async fn run(
    workspace: WorkspaceArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let explorer = workspace.explorer();
    info!("Scanning {:?}...", explorer.roots());

    let snapshot = explorer.refresh().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot.map)?);
        return Ok(());
    }

    if snapshot.map.is_empty() {
        println!("{}", tree::empty_message(&snapshot.status));
        return Ok(());
    }

    let rows = ModuleRow::rows(&snapshot.map);
    let files: usize = rows.iter().map(|r| r.files).sum();
    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!("{} modules, {} files", rows.len(), files);
    Ok(())
}
