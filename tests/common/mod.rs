/*!
 * Common test utilities for the scriptcut test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use scriptcut::app_config::Config;
use scriptcut::app_controller::Controller;

/// A short screenplay as it comes out of PDF extraction: title page preamble,
/// page numbers, a page footer and all three heading styles.
pub const SAMPLE_SCREENPLAY: &str = "THE LONG NIGHT
Written by A. Writer

INT. WAREHOUSE - NIGHT 11 11
Crates everywhere. MARIA (30s) checks her watch.
MARIA
He's late.
1
EXT. BEACH - DAY 5A
Waves crash on the shore.
Page 2
CẢNH 12
Hai người đứng trên cầu.
ROOFTOP 7
Wind howls.
";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes [`SAMPLE_SCREENPLAY`] as a plain text screenplay
pub fn create_sample_screenplay(dir: &Path) -> Result<PathBuf> {
    create_test_file(dir, "the_long_night.txt", SAMPLE_SCREENPLAY)
}

/// Config whose session file and database live inside `dir`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.session_file = dir.join("data").join("current_session.json");
    config.storage.database_path = Some(dir.join("scriptcut.db"));
    config
}

/// Controller isolated inside `dir`
pub fn test_controller(dir: &Path) -> Result<Controller> {
    Controller::with_config(test_config(dir))
}
