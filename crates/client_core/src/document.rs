use std::{fs, path::Path};

use crate::error::ClientError;

/// File types the extraction service accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "png", "jpg", "jpeg"];

#[derive(Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                ClientError::InvalidDocument(format!("'{file_name}' has no file extension"))
            })?;
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ClientError::InvalidDocument(format!(
                "unsupported file type '.{extension}' (accepted: {})",
                ACCEPTED_EXTENSIONS.join(", ")
            )));
        }
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::InvalidDocument(format!("'{}' is not a file path", path.display()))
            })?
            .to_string();
        let bytes = fs::read(path)?;
        Self::new(file_name, bytes)
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        let doc = SourceDocument::new("Contract.PDF", b"%PDF".to_vec()).expect("pdf");
        assert_eq!(doc.mime_type, "application/pdf");
        assert!(SourceDocument::new("scan.jpeg", Vec::new()).is_ok());
    }

    #[test]
    fn rejects_unsupported_or_missing_extensions() {
        assert!(matches!(
            SourceDocument::new("payload.exe", Vec::new()),
            Err(ClientError::InvalidDocument(_))
        ));
        assert!(matches!(
            SourceDocument::new("README", Vec::new()),
            Err(ClientError::InvalidDocument(_))
        ));
    }

    #[test]
    fn from_path_reads_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lease.txt");
        fs::write(&path, "The tenant shall pay rent.").expect("write");

        let doc = SourceDocument::from_path(&path).expect("load");
        assert_eq!(doc.file_name, "lease.txt");
        assert_eq!(doc.size_bytes(), 26);
        assert_eq!(doc.mime_type, "text/plain");
    }
}
