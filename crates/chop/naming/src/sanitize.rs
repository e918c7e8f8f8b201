//! String helpers shared by every name part

/// Characters a name may not start or end with
const TRIM_CHARS: &[char] = &['-', '_', '.'];

/// Strip leading and trailing `-`, `_` and `.`
pub fn sanitize(s: &str) -> &str {
    s.trim_matches(TRIM_CHARS)
}

/// First `n` characters of `s`
pub fn string_head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Compact identifier of `s`, `n` characters long
///
/// Hex digest of the full source string, cut to `n`; depends only on `s`
/// and `n`.
pub fn create_string_id(s: &str, n: usize) -> String {
    let digest = blake3::hash(s.as_bytes());
    let hex = digest.to_hex();
    string_head(hex.as_str(), n).to_string()
}
