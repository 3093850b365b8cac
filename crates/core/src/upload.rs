use bytes::Bytes;

/// A file received in one ask request. Owned by the request, never persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Lowercased text after the last `.` in `name`, empty when there is none.
    pub extension: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            extension,
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Lowercased extension after the last dot. `"report"` and `"archive."` have none.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let f = UploadedFile::new("Scan.JPEG", vec![1, 2, 3]);
        assert_eq!(f.extension, "jpeg");
        assert_eq!(f.size(), 3);
    }

    #[test]
    fn last_dot_wins() {
        assert_eq!(extension_of("backup.tar.PDF"), "pdf");
    }

    #[test]
    fn no_extension() {
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("trailing."), "");
    }
}
