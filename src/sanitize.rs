use unicode_normalization::UnicodeNormalization;

pub const FALLBACK_NAME: &str = "untitled";

const ILLEGAL: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Clone)]
pub struct SanitizeOptions<'a> {
    pub fallback: &'a str,
    pub normalize_unicode: bool,
}

impl Default for SanitizeOptions<'_> {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_NAME,
            normalize_unicode: false,
        }
    }
}

/// Make a task label safe to use as a file name on Windows, macOS and Linux.
pub fn sanitize(name: &str) -> String {
    sanitize_with(name, &SanitizeOptions::default())
}

pub fn sanitize_with(name: &str, opts: &SanitizeOptions<'_>) -> String {
    let replaced: String = if opts.normalize_unicode {
        name.nfc().map(replace_illegal).collect()
    } else {
        name.chars().map(replace_illegal).collect()
    };

    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.is_empty() {
        opts.fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn replace_illegal(ch: char) -> char {
    if ILLEGAL.contains(&ch) || ch.is_ascii_control() {
        '_'
    } else {
        ch
    }
}
