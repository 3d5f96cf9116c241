//! Utilities for input/output.

use super::OverwriteMode;
use std::{
    fs,
    io::{self, Read},
    path::Path,
};

/// Opens the given file for reading, including the path in any error message.
pub fn open_file_and_map_err<P: AsRef<Path>>(file_path: P) -> io::Result<fs::File> {
    let file_path = file_path.as_ref();
    fs::File::open(file_path).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Could not open {}: {}", file_path.display(), err),
        )
    })
}

/// Creates the given file for writing, along with any missing parent directories.
///
/// If the file already exists, it is truncated when the overwrite mode is
/// `Always` and an `AlreadyExists` error is returned when it is `Never`.
pub fn create_file_and_required_dirs<P: AsRef<Path>>(
    file_path: P,
    overwrite_mode: OverwriteMode,
) -> io::Result<fs::File> {
    let file_path = file_path.as_ref();
    if overwrite_mode == OverwriteMode::Never && file_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("File {} already exists", file_path.display()),
        ));
    }
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::File::create(file_path).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Could not create {}: {}", file_path.display(), err),
        )
    })
}

/// Reads and returns the content of the specified text file.
pub fn read_text_file<P: AsRef<Path>>(file_path: P) -> io::Result<String> {
    let file = open_file_and_map_err(file_path)?;
    let mut text = String::new();
    let _ = io::BufReader::new(file).read_to_string(&mut text)?;
    Ok(text)
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Write;

    #[test]
    fn existing_file_is_only_overwritten_when_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("nested").join("file.txt");

        let mut file = create_file_and_required_dirs(&file_path, OverwriteMode::Never).unwrap();
        file.write_all(b"first").unwrap();
        drop(file);

        let err = create_file_and_required_dirs(&file_path, OverwriteMode::Never).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(read_text_file(&file_path).unwrap(), "first");

        let mut file = create_file_and_required_dirs(&file_path, OverwriteMode::Always).unwrap();
        file.write_all(b"second").unwrap();
        drop(file);
        assert_eq!(read_text_file(&file_path).unwrap(), "second");
    }

    #[test]
    fn missing_file_error_names_path() {
        let err = open_file_and_map_err("/nonexistent/file.obj").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/nonexistent/file.obj"));
    }
}
