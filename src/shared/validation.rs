use lazy_static::lazy_static;
use regex::Regex;

/// Longest filename fragment embedded in an object key
const MAX_KEY_FILENAME_LEN: usize = 100;

lazy_static! {
    /// Characters allowed in the filename part of an object key
    /// - Kept: ASCII letters, digits, '.', '_', '-'
    /// - Everything else (spaces, slashes, unicode, quotes) becomes '_'
    pub static ref UNSAFE_KEY_CHARS_REGEX: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();

    /// Characters that cannot appear inside a quoted Content-Disposition filename
    pub static ref UNSAFE_HEADER_CHARS_REGEX: Regex = Regex::new(r#"[^\x20-\x7E]|["\\]"#).unwrap();
}

/// Reduce an untrusted filename to a fragment safe for use inside an object key.
///
/// Path components are dropped so a filename can never escape the owner prefix.
pub fn sanitize_key_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned = UNSAFE_KEY_CHARS_REGEX.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    let truncated: String = cleaned.chars().take(MAX_KEY_FILENAME_LEN).collect();
    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated
    }
}

/// Build an `attachment` Content-Disposition value for an untrusted filename.
///
/// Carries an ASCII fallback plus the RFC 5987 `filename*` form for unicode names.
pub fn content_disposition(filename: &str) -> String {
    let fallback = UNSAFE_HEADER_CHARS_REGEX.replace_all(filename, "_");
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key_filename_keeps_safe_names() {
        assert_eq!(sanitize_key_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_key_filename("my-file_v2.tar.gz"), "my-file_v2.tar.gz");
    }

    #[test]
    fn test_sanitize_key_filename_strips_paths_and_unsafe_chars() {
        assert_eq!(sanitize_key_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_key_filename("C:\\Users\\me\\cv.docx"), "cv.docx");
        assert_eq!(sanitize_key_filename("holiday photo (1).jpg"), "holiday_photo_1_.jpg");
        assert_eq!(sanitize_key_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_sanitize_key_filename_falls_back_when_empty() {
        assert_eq!(sanitize_key_filename(""), "file");
        assert_eq!(sanitize_key_filename("dir/"), "file");
        assert_eq!(sanitize_key_filename("..."), "file");
    }

    #[test]
    fn test_sanitize_key_filename_truncates() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_key_filename(&long).len(), 100);
    }

    #[test]
    fn test_content_disposition_escapes_quotes_and_unicode() {
        assert_eq!(
            content_disposition("a.txt"),
            "attachment; filename=\"a.txt\"; filename*=UTF-8''a.txt"
        );

        let value = content_disposition("evil\".txt");
        assert!(value.starts_with("attachment; filename=\"evil_.txt\""));

        let value = content_disposition("报告.pdf");
        assert!(value.contains("filename=\"__.pdf\""));
        assert!(value.contains("filename*=UTF-8''%E6%8A%A5%E5%91%8A.pdf"));
    }
}
