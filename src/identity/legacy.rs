//! Legacy identity algorithm (design spec §4.C).
//!
//! Deliberately lossy: takes only the last path component of the input.
//! Kept only for backward compatibility with identities computed before
//! the canonical algorithm existed.

/// `true` on targets where legacy identity also treats `\` as a path
/// separator, matching the host-OS-dependent behavior the design spec
/// calls out for this component specifically (unlike canonical identity,
/// which always treats `\` as a separator).
#[cfg(windows)]
const BACKSLASH_IS_SEPARATOR: bool = true;
#[cfg(not(windows))]
const BACKSLASH_IS_SEPARATOR: bool = false;

fn is_separator(c: char) -> bool {
    c == '/' || (BACKSLASH_IS_SEPARATOR && c == '\\')
}

/// Compute the legacy identity string for `input`: the lower-cased last
/// path component, stripped of one trailing separator and a trailing
/// `.git`.
pub fn legacy_identity(input: &str) -> String {
    let trimmed = if input.ends_with(is_separator) && !input.is_empty() {
        &input[..input.len() - 1]
    } else {
        input
    };

    let last = match trimmed.rfind(is_separator) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };

    let last = last.strip_suffix(".git").unwrap_or(last);
    last.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_slash_path() {
        assert_eq!(legacy_identity("https://example.com/Mona/LinkedList.git"), "linkedlist");
    }

    #[test]
    fn trailing_slash_is_trimmed_once() {
        assert_eq!(legacy_identity("example.com/Mona/LinkedList/"), "linkedlist");
    }

    #[test]
    fn no_separators() {
        assert_eq!(legacy_identity("LinkedList"), "linkedlist");
    }
}
