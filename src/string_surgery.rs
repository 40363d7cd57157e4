//! In-place string rewrites shared by the identity canonicalization
//! algorithms.
//!
//! Every function here takes ownership of a `&mut String` and mutates it in
//! place, mirroring the "buffer surgery" primitives the design spec
//! describes (remove/drop/replace operations on a character buffer). None
//! of them touch case or Unicode normalization; callers apply NFC folding
//! and ASCII lower-casing once, up front, before any of these run.

/// A URL scheme split off the front of a buffer by [`drop_scheme`].
pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'
}

/// Index of the first path separator (`/` or `\`) in `s`, if any.
pub fn first_separator(s: &str) -> Option<usize> {
    s.find(is_separator)
}

/// Remove `prefix` from the front of `buf` if present. Returns whether a
/// removal occurred.
pub fn remove_prefix(buf: &mut String, prefix: &str) -> bool {
    if let Some(rest) = buf.strip_prefix(prefix) {
        let rest = rest.to_string();
        *buf = rest;
        true
    } else {
        false
    }
}

/// Remove `suffix` from the end of `buf` if present. Returns whether a
/// removal occurred.
pub fn remove_suffix(buf: &mut String, suffix: &str) -> bool {
    if let Some(rest) = buf.strip_suffix(suffix) {
        let rest = rest.to_string();
        *buf = rest;
        true
    } else {
        false
    }
}

/// If `buf` begins with `L [+-.L0-9]* "://"` (`L` an ASCII letter), remove
/// through the `://` and return the dropped scheme. Otherwise leave `buf`
/// untouched and return `None`.
pub fn drop_scheme(buf: &mut String) -> Option<String> {
    let idx = buf.find("://")?;
    let candidate = &buf[..idx];
    if candidate.is_empty() {
        return None;
    }
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(is_scheme_char) {
        return None;
    }
    let scheme = candidate.to_string();
    buf.replace_range(0..idx + 3, "");
    Some(scheme)
}

/// Userinfo split off the front of a buffer by [`drop_userinfo`].
pub struct UserInfo {
    pub user: String,
    pub password: Option<String>,
}

/// If there is an `@` strictly before the first path separator, split the
/// text before it on `:` into `(user, password?)`, remove the prefix up to
/// and including `@`, and return it. The *last* `@` before the separator is
/// used, so a password containing `@` does not confuse detection.
pub fn drop_userinfo(buf: &mut String) -> Option<UserInfo> {
    let search_end = first_separator(buf).unwrap_or(buf.len());
    let at_idx = buf[..search_end].rfind('@')?;
    let userinfo = &buf[..at_idx];
    let (user, password) = match userinfo.split_once(':') {
        Some((u, p)) => (u.to_string(), Some(p.to_string())),
        None => (userinfo.to_string(), None),
    };
    buf.replace_range(0..at_idx + 1, "");
    Some(UserInfo { user, password })
}

/// If a `:` appears between the start of `buf` and the first path
/// separator, followed only by ASCII digits running to that separator,
/// remove `:digits`. Returns whether a removal occurred.
pub fn remove_port(buf: &mut String) -> bool {
    let search_end = first_separator(buf).unwrap_or(buf.len());
    let host = &buf[..search_end];
    let Some(colon_idx) = host.find(':') else {
        return false;
    };
    let digits = &host[colon_idx + 1..];
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        buf.replace_range(colon_idx..search_end, "");
        true
    } else {
        false
    }
}

/// Truncate `buf` from the first `#` onward, if any.
pub fn remove_fragment(buf: &mut String) {
    if let Some(idx) = buf.find('#') {
        buf.truncate(idx);
    }
}

/// Truncate `buf` from the first `?` onward, if any.
pub fn remove_query(buf: &mut String) {
    if let Some(idx) = buf.find('?') {
        buf.truncate(idx);
    }
}

/// Replace the first occurrence of `needle` with `with`, optionally only if
/// its start lies before `before`. Returns whether a replacement occurred.
pub fn replace_first(buf: &mut String, needle: &str, with: &str, before: Option<usize>) -> bool {
    let Some(idx) = buf.find(needle) else {
        return false;
    };
    if let Some(limit) = before {
        if idx >= limit {
            return false;
        }
    }
    buf.replace_range(idx..idx + needle.len(), with);
    true
}

/// Detect and strip a `\\?\` or `\\??\` prefix, then a `X:` drive-letter
/// prefix. Returns whether a Windows path form was recognized; the caller
/// is responsible for re-adding a leading `/` when this returns `true`.
pub fn normalize_windows_path_prefix(buf: &mut String) -> bool {
    let mut recognized = false;
    for verbatim in ["\\\\??\\", "\\\\?\\"] {
        if remove_prefix(buf, verbatim) {
            recognized = true;
            break;
        }
    }
    let bytes = buf.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        buf.replace_range(0..2, "");
        recognized = true;
    }
    recognized
}
