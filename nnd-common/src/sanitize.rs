//! Filename and path sanitizer.
//!
//! Every string that becomes part of a path (the job folder built from a tag query or an album
//! title, or a file name derived from a remote title) goes through here first.
use once_cell::sync::Lazy;
use regex::Regex;

/// Folder names longer than this are cut, keeping paths short enough for Windows.
pub const MAX_FOLDER_NAME_LEN: usize = 90;

/// Name used when nothing survives sanitization.
pub const FALLBACK_NAME: &str = "unnamed";

static UNSAFE_FOLDER_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|$#@&%!`^(){}\[\]=+~,;\x00]"#).unwrap());

const UNSAFE_FILE_CHARS: &[char] = &[
    '/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0', '$', '#', '@', '&', '%', '!', '`', '^',
    '(', ')', '{', '}', '[', ']', '=', '+', '~', ',', ';',
];

/// Turns an arbitrary string into a single, filesystem-safe folder name.
///
/// Unsafe characters are removed, the result is cut to [`MAX_FOLDER_NAME_LEN`] characters and
/// spaces become underscores.
pub fn sanitize_folder_name(name: &str) -> String {
    let stripped = UNSAFE_FOLDER_CHARS.replace_all(name.trim(), "");

    let truncated: String = stripped.chars().take(MAX_FOLDER_NAME_LEN).collect();

    let safe = truncated.trim().replace(' ', "_");

    let safe = safe.trim_matches('.');

    if safe.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    safe.to_string()
}

/// Turns an arbitrary string into a filesystem-safe file name stem.
///
/// Unsafe characters and spaces are replaced with `_`, leading and trailing dots or spaces are
/// dropped and an empty result becomes [`FALLBACK_NAME`].
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == ' ' || UNSAFE_FILE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let safe = replaced.trim_matches(|c| c == '.' || c == ' ');

    if safe.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    safe.to_string()
}

#[cfg(test)]
mod test {
    use super::{sanitize_file_name, sanitize_folder_name, MAX_FOLDER_NAME_LEN};

    #[test]
    fn folder_names_lose_unsafe_chars() {
        assert_eq!(
            sanitize_folder_name("12-01-2024_10-00-00 wolf rating:safe (solo)"),
            "12-01-2024_10-00-00_wolf_ratingsafe_solo"
        );
        assert_eq!(sanitize_folder_name("a/b\\c"), "abc");
        assert_eq!(sanitize_folder_name("???"), "unnamed");
    }

    #[test]
    fn folder_names_are_bounded() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_folder_name(&long).chars().count(), MAX_FOLDER_NAME_LEN);

        let wide = "狼".repeat(120);
        assert_eq!(sanitize_folder_name(&wide).chars().count(), MAX_FOLDER_NAME_LEN);
    }

    #[test]
    fn file_names_replace_unsafe_chars() {
        assert_eq!(sanitize_file_name("My Comic: Part 1?"), "My_Comic__Part_1_");
        assert_eq!(sanitize_file_name("..hidden.."), "hidden");
        assert_eq!(sanitize_file_name(" . "), "unnamed");
        assert_eq!(sanitize_file_name(""), "unnamed");
    }
}
