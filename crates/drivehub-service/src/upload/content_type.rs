//! Content type resolution for uploads.

use drivehub_entity::file::DEFAULT_CONTENT_TYPE;

/// The declared type if there is one, otherwise a guess from the file
/// extension, otherwise `application/octet-stream`.
pub fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|ct| !ct.is_empty()) {
        return declared.to_string();
    }
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_wins() {
        assert_eq!(
            resolve_content_type(Some("application/x-custom"), "a.pdf"),
            "application/x-custom"
        );
    }

    #[test]
    fn test_guess_from_extension() {
        assert_eq!(resolve_content_type(None, "report.pdf"), "application/pdf");
        assert_eq!(resolve_content_type(Some("  "), "notes.txt"), "text/plain");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(
            resolve_content_type(None, "blob.zzzunknown"),
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(resolve_content_type(None, "README"), DEFAULT_CONTENT_TYPE);
    }
}
