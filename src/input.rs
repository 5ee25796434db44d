//! Input resolution: load the HTML document named by the user.
//!
//! The document is read into memory in one go and sent untouched. No
//! charset sniffing or well-formedness check happens here; the service is
//! the only thing that interprets the bytes.

use crate::error::Html2XhtmlError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Path spelling that selects standard input.
pub const STDIN_MARKER: &str = "-";

/// Where the HTML document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A file on disk.
    File(PathBuf),
    /// Standard input, read to EOF.
    Stdin,
}

impl InputSource {
    /// Interpret a CLI argument: `-` means stdin, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIN_MARKER {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    /// Read the whole document.
    pub async fn read(&self) -> Result<Vec<u8>, Html2XhtmlError> {
        match self {
            InputSource::File(path) => read_document(path).await,
            InputSource::Stdin => {
                let mut buf = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut buf)
                    .await
                    .map_err(|e| Html2XhtmlError::FileRead {
                        path: PathBuf::from("<stdin>"),
                        source: e,
                    })?;
                debug!("Read {} bytes from stdin", buf.len());
                Ok(buf)
            }
        }
    }
}

/// Read a local file, mapping I/O failures to file errors.
pub async fn read_document(path: &Path) -> Result<Vec<u8>, Html2XhtmlError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) => Err(map_read_error(path, e)),
    }
}

fn map_read_error(path: &Path, e: std::io::Error) -> Html2XhtmlError {
    let path = path.to_path_buf();
    match e.kind() {
        ErrorKind::NotFound => Html2XhtmlError::FileNotFound { path },
        ErrorKind::PermissionDenied => Html2XhtmlError::PermissionDenied { path },
        _ => Html2XhtmlError::FileRead { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn test_from_arg() {
        assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg("page.html"),
            InputSource::File(PathBuf::from("page.html"))
        );
        assert_eq!(
            InputSource::from_arg("./-"),
            InputSource::File(PathBuf::from("./-"))
        );
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.html");
        let err = read_document(&path).await.unwrap_err();
        assert!(matches!(err, Html2XhtmlError::FileNotFound { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn directory_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::File);
    }

    #[tokio::test]
    async fn reads_raw_bytes_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.html");
        let data = b"<p>caf\xe9</p>\r\n".to_vec();
        std::fs::write(&path, &data).unwrap();

        let read = InputSource::File(path).read().await.unwrap();
        assert_eq!(read, data);
    }
}
