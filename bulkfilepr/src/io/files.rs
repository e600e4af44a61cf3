//! Filesystem primitives for the managed file, relative to a repository root.

use std::fs;
use std::io;
use std::path::Path;

pub fn file_exists(root: &Path, relative: &str) -> bool {
    root.join(relative).exists()
}

pub fn read_file(root: &Path, relative: &str) -> io::Result<Vec<u8>> {
    fs::read(root.join(relative))
}

/// Write `contents`, creating parent directories as needed.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
