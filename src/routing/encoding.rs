//! Percent-encoding helpers shared by the tokenizer, compiler and builder.

/// Percent-encode a path component. Alphanumerics and `-_.~` pass through.
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Percent-decode a path component.
///
/// Malformed escapes are kept verbatim and invalid UTF-8 is replaced, so
/// decoding never fails.
pub fn decode_component(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}

/// Returns true when `c` survives [`encode_component`] unchanged.
pub fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}
