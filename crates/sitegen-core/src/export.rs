//! Saving the assembled page to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name used for saved pages and downloads.
pub const SAVE_FILE_NAME: &str = "your-website.html";

/// MIME type of saved pages.
pub const SAVE_MIME_TYPE: &str = "text/html";

/// Write `code` to `your-website.html` inside `dir`, creating the directory.
pub fn save_to_file(dir: &Path, code: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SAVE_FILE_NAME);
    fs::write(&path, code)?;
    tracing::info!("Saved page to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_named_file() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");

        let path = save_to_file(&out, "<html></html>").unwrap();

        assert_eq!(path, out.join("your-website.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
