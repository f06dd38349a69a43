use std::sync::LazyLock;

use regex::Regex;

static ILLEGAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f\x7f]"#).unwrap());

/// Budget in bytes, leaving room for the hash suffix and `.md` under the usual 255-byte limit.
const MAX_STEM_BYTES: usize = 200;
const HASH_LEN: usize = 8;
const RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// File stem for an article title.
///
/// Single spaces become `-`. A title that needed any other change, or that already
/// contained a `-`, gets a short hash of the original appended so that distinct
/// titles never end up overwriting each other's file.
pub fn sanitize_title(title: &str) -> String {
    let stem = clean(title);
    let plain = !title.contains('-') && stem == title.replace(' ', "-");
    if plain {
        stem
    } else {
        let hash = blake3::hash(title.as_bytes()).to_hex();
        format!("{stem}-{}", &hash.as_str()[..HASH_LEN])
    }
}

/// Directory name for a category slug or label.
pub fn sanitize_dir(name: &str) -> String {
    clean(name)
}

fn clean(raw: &str) -> String {
    let replaced = ILLEGAL_RE.replace_all(raw, " ");
    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("-");
    let trimmed = joined.trim_matches(|c: char| c == '-' || c == '.');

    let cut = truncate_bytes(trimmed, MAX_STEM_BYTES);
    let mut stem = cut.trim_end_matches(|c: char| c == '-' || c == '.').to_string();

    let prefix_len = stem.find('.').unwrap_or(stem.len());
    if RESERVED
        .iter()
        .any(|r| r.eq_ignore_ascii_case(&stem[..prefix_len]))
    {
        stem.insert(prefix_len, '_');
    }

    if stem.is_empty() {
        stem = "untitled".to_string();
    }
    stem
}

/// Longest prefix of `s` within `max` bytes that ends on a char boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
