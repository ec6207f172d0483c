//! Label sanitization and cache file naming
//!
//! Labels are arbitrary caller strings (usually host names). Before a label can
//! name a file it is reduced to the allow-list `[0-9a-z._-]`, which keeps every
//! entry directly inside the cache directory.

/// Reduces a label to a safe file stem.
///
/// ASCII letters are lower-cased, then every character outside `[0-9a-z._-]`
/// is dropped. The transform is total and idempotent; two labels that only
/// differ in case or in stripped characters map to the same key.
pub fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| matches!(c, '0'..='9' | 'a'..='z' | '.' | '_' | '-'))
        .collect()
}

/// Builds the file name for an already sanitized key.
///
/// A name that would be empty, `.` or `..` cannot address a regular file in
/// the cache directory, so it is re-derived to `_` plus the extension. With a
/// non-empty extension this never triggers.
pub(crate) fn file_name(key: &str, extension: &str) -> String {
    let name = format!("{}{}", key, extension);
    match name.as_str() {
        "" | "." | ".." => format!("_{}", extension),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_disallowed_characters() {
        assert_eq!(sanitize("foo/bar?baz"), "foobarbaz");
        assert_eq!(sanitize("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize("a b\tc\n"), "abc");
    }

    #[test]
    fn test_sanitize_lowercases_ascii() {
        assert_eq!(sanitize("EXAMPLE.com"), "example.com");
        assert_eq!(sanitize("Shop_Site-01"), "shop_site-01");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize("münchen.de"), "mnchen.de");
        assert_eq!(sanitize("例え.jp"), ".jp");
    }

    #[test]
    fn test_sanitize_empty_label() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("???"), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let labels = [
            "",
            "example.com",
            "EXAMPLE.COM",
            "foo/bar?baz",
            "Ünïcödé//..//x",
            "a\0b\u{202e}c",
            "www.Example.co.uk:8080/path?q=1#frag",
        ];
        for label in labels {
            let once = sanitize(label);
            assert_eq!(sanitize(&once), once, "sanitize not idempotent for {:?}", label);
        }
    }

    #[test]
    fn test_file_name_appends_extension() {
        assert_eq!(file_name("example.com", ".cache"), "example.com.cache");
        assert_eq!(file_name("", ".cache"), ".cache");
    }

    #[test]
    fn test_file_name_rederives_reserved_names() {
        assert_eq!(file_name("", ""), "_");
        assert_eq!(file_name(".", ""), "_");
        assert_eq!(file_name("..", ""), "_");
        assert_eq!(file_name("...", ""), "...");
    }
}
