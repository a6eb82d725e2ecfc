//! Content-type guessing from filenames.

use mime_guess::Mime;

/// Fallback used when no type can be inferred.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Guess a MIME type from the extension of `name`.
///
/// Backed by the static extension table shipped with `mime_guess`; returns
/// `None` for names without a known extension.
pub fn guess(name: &str) -> Option<Mime> {
    mime_guess::from_path(name).first()
}

/// The guessed type rendered as a header value, or `DEFAULT_CONTENT_TYPE`.
pub fn content_type_for(name: &str) -> String {
    guess(name)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(content_type_for("report.csv"), "text/csv");
        assert_eq!(content_type_for("exports/2025/report.CSV"), "text/csv");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("scan.pdf"), "application/pdf");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert!(guess("data.qqz").is_none());
        assert!(guess("README").is_none());
        assert_eq!(content_type_for("data.qqz"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(""), DEFAULT_CONTENT_TYPE);
    }
}
