use modex_core::opener::{self, EditorOpener};
use modex_core::tree::Action;
use std::path::PathBuf;
use tracing::info;

pub fn run(path: PathBuf, with: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let opener = match with {
        Some(program) => EditorOpener::with_program(program),
        None => EditorOpener::new(),
    };
    let path = path.canonicalize().unwrap_or(path);

    opener::perform(&opener, &Action::OpenFile { path: path.clone() })?;
    info!("Opened {}", path.display());
    Ok(())
}
