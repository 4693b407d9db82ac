//! Byte input decoding
//!
//! Markup handed over as bytes is decoded to UTF-8 before tokenizing. The
//! encoding label is looked up in this order:
//!
//! 1. the `charset` parameter of a `Content-Type` value
//! 2. `<meta charset>` or `<meta http-equiv="Content-Type">` within the first
//!    1024 bytes
//! 3. UTF-8
//!
//! Labels are resolved with `encoding_rs`, so every WHATWG label and alias is
//! accepted (`latin1`, `ISO-8859-1` and `windows-1252` all name the same
//! decoder).
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::charset::{decode_to_utf8, detect_charset};
//!
//! assert_eq!(detect_charset(Some("text/html; charset=iso-8859-1"), b""), "ISO-8859-1");
//!
//! let text = decode_to_utf8(b"Caf\xE9", Some("text/html; charset=ISO-8859-1")).unwrap();
//! assert_eq!(text, "Café");
//! ```

use encoding_rs::Encoding;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::RewriteError;

/// Label used when nothing else is declared
const DEFAULT_CHARSET: &str = "UTF-8";

/// Only this many leading bytes are scanned for `<meta>` declarations
const META_SCAN_LIMIT: usize = 1024;

/// Pick the charset label for a byte payload
///
/// Always returns a label, upper-cased; falls back to `UTF-8`.
pub fn detect_charset(content_type: Option<&str>, html: &[u8]) -> String {
    if let Some(content_type) = content_type
        && let Some(charset) = extract_charset_from_content_type(content_type)
    {
        return normalize_charset(&charset);
    }

    if let Some(charset) = extract_charset_from_html(html) {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

/// `charset` parameter of a `Content-Type` value, quoted or bare
///
/// ```rust
/// use markup_rewriter::charset::extract_charset_from_content_type;
///
/// assert_eq!(
///     extract_charset_from_content_type("text/html; charset=\"UTF-8\"; q=1"),
///     Some("UTF-8".to_string())
/// );
/// assert_eq!(extract_charset_from_content_type("text/html"), None);
/// ```
pub fn extract_charset_from_content_type(content_type: &str) -> Option<String> {
    static CHARSET_PARAM: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = CHARSET_PARAM
        .get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok())
        .as_ref()?;

    regex
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Charset declared by a `<meta>` tag near the start of the document
///
/// Both the `charset` attribute form and the `http-equiv="Content-Type"`
/// form are recognized; the first one found wins.
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let prefix = &html[..html.len().min(META_SCAN_LIMIT)];
    // Declarations are ASCII; lossy decoding is enough to find them.
    let prefix = String::from_utf8_lossy(prefix);

    static META_CHARSET: OnceLock<Option<Regex>> = OnceLock::new();
    let meta_charset = META_CHARSET
        .get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*["']?([^"';>\s]+)"#).ok())
        .as_ref()?;

    if let Some(caps) = meta_charset.captures(&prefix)
        && let Some(m) = caps.get(1)
    {
        return Some(m.as_str().to_string());
    }

    static META_HTTP_EQUIV: OnceLock<Option<Regex>> = OnceLock::new();
    let meta_http_equiv = META_HTTP_EQUIV
        .get_or_init(|| {
            Regex::new(
                r#"(?i)<meta\s+http-equiv\s*=\s*["']?Content-Type["']?\s+content\s*=\s*["']?[^"'>]*charset\s*=\s*([^"';>\s]+)"#,
            )
            .ok()
        })
        .as_ref()?;

    meta_http_equiv
        .captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Upper-case a charset label
pub fn normalize_charset(charset: &str) -> String {
    charset.to_ascii_uppercase()
}

/// Resolve a charset label to an `encoding_rs` decoder
///
/// # Errors
///
/// [`RewriteError::EncodingError`] if the label is unknown.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, RewriteError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        RewriteError::EncodingError(format!("Unsupported charset '{}'", label))
    })
}

/// Decode a byte payload to UTF-8 text
///
/// UTF-8 input is borrowed without copying. Other encodings are transcoded;
/// malformed sequences are rejected rather than replaced.
///
/// # Errors
///
/// [`RewriteError::EncodingError`] if the charset is unknown or the bytes are
/// not valid in it.
pub fn decode_to_utf8<'a>(
    html: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, RewriteError> {
    let charset = detect_charset(content_type, html);
    let encoding = encoding_for_label(&charset)?;

    if encoding == encoding_rs::UTF_8 {
        return std::str::from_utf8(html).map(Cow::Borrowed).map_err(|e| {
            RewriteError::EncodingError(format!(
                "Invalid UTF-8 at byte {} (charset {})",
                e.valid_up_to(),
                charset
            ))
        });
    }

    tracing::debug!(charset = %charset, encoding = encoding.name(), "transcoding input to UTF-8");
    encoding
        .decode_without_bom_handling_and_without_replacement(html)
        .ok_or_else(|| {
            RewriteError::EncodingError(format!("Invalid byte sequence for charset '{}'", charset))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ============================================================================
    // Label extraction
    // ============================================================================

    #[test]
    fn test_content_type_variants() {
        for (header, expected) in [
            ("text/html; charset=UTF-8", Some("UTF-8")),
            ("text/html;charset=windows-1252", Some("windows-1252")),
            ("text/html; CHARSET=\"ISO-8859-1\"", Some("ISO-8859-1")),
            ("text/html; charset=UTF-8; boundary=x", Some("UTF-8")),
            ("text/html", None),
            ("", None),
        ] {
            assert_eq!(
                extract_charset_from_content_type(header).as_deref(),
                expected,
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_meta_charset_forms() {
        assert_eq!(
            extract_charset_from_html(b"<head><META charset='utf-8'></head>"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset_from_html(
                b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\">"
            ),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(extract_charset_from_html(b"<p>no declaration</p>"), None);
    }

    #[test]
    fn test_meta_beyond_scan_limit_is_ignored() {
        let mut html = vec![b' '; META_SCAN_LIMIT + 10];
        html.extend_from_slice(b"<meta charset=\"ISO-8859-1\">");
        assert_eq!(extract_charset_from_html(&html), None);
        assert_eq!(detect_charset(None, &html), "UTF-8");
    }

    #[test]
    fn test_header_wins_over_meta() {
        let html = b"<meta charset=\"ISO-8859-1\">";
        assert_eq!(detect_charset(Some("text/html; charset=utf-8"), html), "UTF-8");
        assert_eq!(detect_charset(Some("text/html"), html), "ISO-8859-1");
    }

    // ============================================================================
    // Decoding
    // ============================================================================

    #[test]
    fn test_decode_utf8_borrows() {
        let decoded = decode_to_utf8("héllo".as_bytes(), None).unwrap();
        assert!(matches!(decoded, Cow::Borrowed("héllo")));
    }

    #[test]
    fn test_decode_latin1_and_windows_1252() {
        let latin1 = decode_to_utf8(b"Caf\xE9", Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(latin1, "Café");

        let cp1252 = decode_to_utf8(b"Price \x80 10", Some("text/html; charset=windows-1252")).unwrap();
        assert_eq!(cp1252, "Price € 10");
    }

    #[test]
    fn test_decode_uses_meta_declaration() {
        let html = b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>";
        let decoded = decode_to_utf8(html, None).unwrap();
        assert!(decoded.contains("Café"));
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_to_utf8(b"\xFF\xFE<p>", None).unwrap_err();
        assert!(matches!(err, RewriteError::EncodingError(_)));

        let err = decode_to_utf8(b"<p>", Some("text/html; charset=x-unknown-test")).unwrap_err();
        assert_eq!(err, RewriteError::EncodingError("Unsupported charset 'X-UNKNOWN-TEST'".to_string()));
    }

    #[test]
    fn test_empty_input_decodes() {
        assert_eq!(decode_to_utf8(b"", None).unwrap(), "");
    }

    proptest! {
        #[test]
        fn prop_header_has_priority_over_meta(
            header in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252", "shift_jis"]),
            meta in prop::sample::select(vec!["UTF-8", "ISO-8859-2", "KOI8-R", "GB2312"]),
        ) {
            let content_type = format!("text/html; charset={header}");
            let html = format!(r#"<html><head><meta charset="{meta}"></head></html>"#);
            prop_assert_eq!(detect_charset(Some(&content_type), html.as_bytes()), header.to_uppercase());
        }

        #[test]
        fn prop_ascii_decodes_identically(text in "[ -~]{0,200}") {
            let decoded = decode_to_utf8(text.as_bytes(), Some("text/html; charset=windows-1252")).unwrap();
            prop_assert_eq!(decoded, text.as_str());
        }
    }
}
