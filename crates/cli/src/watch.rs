use crate::view::TreeView;
use crate::WorkspaceArgs;
use modex_core::ExplorerEvent;
use nu_ansi_term::Color;
use std::io::IsTerminal;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub async fn run(workspace: WorkspaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let explorer = workspace.explorer();
    let mut events = explorer.subscribe();
    let interactive = std::io::stdout().is_terminal();
    let view = TreeView::new(interactive);

    // Keep the handle alive; dropping every sender stops the loop.
    let _handle = explorer.clone().watch()?;
    info!("Watching {:?}. Press Ctrl+C to stop.", explorer.roots());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            event = events.recv() => {
                match event {
                    Ok(ExplorerEvent::TreeChanged { generation }) => {
                        let snapshot = explorer.snapshot().await;
                        if interactive {
                            print!("{}", CLEAR_SCREEN);
                        }
                        for line in view.render_tree(&snapshot.map, &snapshot.status) {
                            println!("{}", line);
                        }
                        info!("Rendered scan #{}", generation);
                    }
                    Ok(ExplorerEvent::Warning(message)) => {
                        let message = if interactive {
                            Color::Yellow.paint(message).to_string()
                        } else {
                            message
                        };
                        eprintln!("{}", message);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        info!("Skipped {} explorer events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Watcher stopped.");
    Ok(())
}
