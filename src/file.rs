// src/file.rs

use std::{
    fs,
    io::ErrorKind,
    path::Path,
};

use crate::error::AupError;

/// Read a text input. A missing file is `MissingInput`, not a bare I/O error.
pub fn read_input(path: &Path) -> Result<String, AupError> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AupError::MissingInput(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Save a downloaded page so later offline runs can reuse it.
pub fn write_snapshot(path: &Path, html: &str) -> Result<(), AupError> {
    write_output(path, html.as_bytes())
}

/// Create parent directories as needed, then create/truncate `path`.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AupError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Overwrites any previous traceback.
pub fn write_traceback(path: &Path, report: &str) -> Result<(), AupError> {
    write_output(path, report.as_bytes())
}

pub fn ensure_directory(dir: &Path) -> Result<(), AupError> {
    if dir.exists() && !dir.is_dir() {
        return Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}
