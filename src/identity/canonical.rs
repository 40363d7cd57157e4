//! Canonical identity algorithm (design spec §4.B).
//!
//! Turns any source location (URL, scp-style address, file path) into a
//! lower-case, NFC-precomposed string of the shape `[/]host/path...` with
//! no scheme, userinfo, port, query or fragment.

use unicode_normalization::UnicodeNormalization;

use crate::error::CoreError;
use crate::string_surgery::{
    self, drop_scheme, drop_userinfo, first_separator, normalize_windows_path_prefix,
    remove_fragment, remove_port, remove_query, replace_first,
};

/// Compute the canonical identity string for `input`.
///
/// See design spec §4.B for the exact, order-sensitive algorithm; the
/// numbered comments below correspond to its numbered steps.
pub fn canonicalize(input: &str) -> Result<String, CoreError> {
    let original_starts_with_separator = input.chars().next().is_some_and(string_surgery::is_separator);

    // 1. NFC-normalize, then ASCII lower-case.
    let mut buf: String = input.nfc().collect::<String>().to_lowercase();

    // 2. Windows path prefix.
    let windows_path = normalize_windows_path_prefix(&mut buf);

    // 3. Scheme.
    let scheme = drop_scheme(&mut buf);

    // 4. Userinfo, with tilde expansion for a non-empty user.
    if let Some(info) = drop_userinfo(&mut buf) {
        if !info.user.is_empty() {
            let replacement = format!("/~{}/", info.user);
            replace_first(&mut buf, "/~/", &replacement, None);
        }
    }

    // 5-7. Port, fragment, query.
    remove_port(&mut buf);
    remove_fragment(&mut buf);
    remove_query(&mut buf);

    // 8. scp-style host:path separator, only with no scheme or an `ssh` scheme.
    let treat_as_scp = match scheme.as_deref() {
        None => true,
        Some("ssh") => true,
        Some(_) => false,
    };
    if treat_as_scp {
        if let Some(sep_idx) = first_separator(&buf) {
            if let Some(colon_idx) = buf[..sep_idx].find(':') {
                buf.replace_range(colon_idx..colon_idx + 1, "/");
            }
        } else if let Some(colon_idx) = buf.find(':') {
            buf.replace_range(colon_idx..colon_idx + 1, "/");
        }
    }

    // 9. Split on separators, drop empty segments, percent-decode each.
    let mut segments: Vec<String> = buf
        .split(string_surgery::is_separator)
        .filter(|s| !s.is_empty())
        .map(percent_decode_segment)
        .collect();

    // 10. Strip trailing `.git` from the last segment.
    if let Some(last) = segments.last_mut() {
        string_surgery::remove_suffix(last, ".git");
    }

    // 11. Join with `/`.
    let mut result = segments.join("/");

    // 12. Leading `/` for file-like locations.
    let is_file_scheme = scheme.as_deref() == Some("file");
    if windows_path || is_file_scheme || original_starts_with_separator {
        result.insert(0, '/');
    }

    let host = result.split('/').find(|s| !s.is_empty()).unwrap_or("");
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(CoreError::NonAsciiHost(input.to_string()));
    }

    Ok(result)
}

fn percent_decode_segment(segment: &str) -> String {
    match percent_encoding::percent_decode_str(segment).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn assert_canon(input: &str, expected: &str) {
        assert_eq!(canonicalize(input).unwrap(), expected, "input: {input:?}");
    }

    #[test]
    fn https_url() {
        assert_canon(
            "https://example.com/mona/LinkedList",
            "example.com/mona/linkedlist",
        );
    }

    #[test]
    fn scp_style() {
        assert_canon(
            "git@example.com:mona/LinkedList.git",
            "example.com/mona/linkedlist",
        );
    }

    #[test]
    fn ssh_tilde_expansion() {
        assert_canon(
            "ssh://mona@example.com/~/LinkedList.git",
            "example.com/~mona/linkedlist",
        );
    }

    #[test]
    fn host_with_port() {
        assert_canon(
            "example.com:443/mona/LinkedList",
            "example.com/mona/linkedlist",
        );
    }

    #[test]
    fn file_url() {
        assert_canon(
            "file:///Users/mona/LinkedList",
            "/users/mona/linkedlist",
        );
    }

    #[test]
    fn windows_drive_path() {
        assert_canon("c:\\user\\mona\\LinkedList", "/user/mona/linkedlist");
    }

    #[test]
    fn windows_verbatim_disk_path() {
        assert_canon(
            "\\\\?\\C:\\user\\mona\\LinkedList",
            "/user/mona/linkedlist",
        );
    }

    #[test]
    fn percent_encoded_segment() {
        assert_canon(
            "example.com/mona/%F0%9F%94%97List",
            "example.com/mona/\u{1F517}list",
        );
    }

    #[test]
    fn query_and_fragment_stripped() {
        assert_canon(
            "example.com/mona/LinkedList?utm=x#top",
            "example.com/mona/linkedlist",
        );
    }

    #[test]
    fn idempotent() {
        let once = canonicalize("https://Example.COM/Mona/LinkedList.git").unwrap();
        let twice = canonicalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn case_and_nfc_insensitive() {
        // "é" as a single precomposed code point vs. "e" + combining acute.
        let precomposed = canonicalize("EXAMPLE.com/mona/Caf\u{00e9}").unwrap();
        let decomposed = canonicalize("example.COM/mona/cafe\u{0301}").unwrap();
        assert_eq!(precomposed, decomposed);
    }

    #[test]
    fn multiple_consecutive_separators_collapse() {
        assert_canon("example.com//mona///LinkedList", "example.com/mona/linkedlist");
    }

    #[test]
    fn colon_after_first_slash_is_not_scp_separator() {
        assert_canon("example.com/mona:tag/LinkedList", "example.com/mona:tag/linkedlist");
    }

    #[test]
    fn non_ascii_host_is_rejected() {
        assert!(canonicalize("xn--or-host-\u{00e9}.com/mona/LinkedList").is_err());
    }

    #[test]
    fn no_trailing_slash_no_dotgit_no_scheme_markers() {
        let canon = canonicalize("https://example.com/mona/LinkedList.git/").unwrap();
        assert!(!canon.contains("://"));
        assert!(!canon.contains('?'));
        assert!(!canon.contains('#'));
        assert!(!canon.ends_with('/'));
        assert!(!canon.ends_with(".git"));
    }
}
