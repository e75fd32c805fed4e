use std::path::PathBuf;

use crate::error::{MunimError, Result};
use crate::settings::{load_settings, save_settings, shellexpand_path};
use crate::sheet::{Sheet, Window};

pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));

    if !resolved.exists() {
        return Err(MunimError::MissingDaybook(
            resolved.display().to_string(),
        ));
    }

    // Parse up front so a malformed or empty file fails here, not on the
    // first report.
    let sheet = Sheet::load(&resolved, Window::reporting())?;

    let mut settings = load_settings();
    settings.daybook = resolved.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!(
        "Registered {} ({} rows, {} dropped)",
        resolved.display(),
        sheet.rows.len(),
        sheet.dropped
    );
    Ok(())
}
