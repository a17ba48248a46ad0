//! Form-url-encoded request bodies

use percent_encoding::percent_decode;

/// Percent-decode a form-url-encoded body
///
/// `%XX` must be followed by exactly two hex digits and `+` stands for a
/// space. Returns `None` for a malformed or truncated escape, or when the
/// decoded bytes are not UTF-8.
pub fn url_decode(input: &[u8]) -> Option<String> {
    // percent_decode passes malformed escapes through unchanged
    if !escapes_are_complete(input) {
        return None;
    }

    let spaced: Vec<u8> = input
        .iter()
        .map(|&byte| if byte == b'+' { b' ' } else { byte })
        .collect();

    percent_decode(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Every `%` is followed by two hex digits
fn escapes_are_complete(input: &[u8]) -> bool {
    let mut rest = input;
    while let Some(pos) = rest.iter().position(|&byte| byte == b'%') {
        match rest.get(pos + 1..pos + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => rest = &rest[pos + 3..],
            _ => return false,
        }
    }
    true
}
