//! Strict percent-decoding and query parsing.
//!
//! Decoding is strict: a malformed URL is an error, never passed through
//! half-decoded.

use std::collections::HashMap;

use thiserror::Error;

/// Characters `decode_uri` leaves escaped.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";

/// A malformed percent-encoding in a request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed escape sequence at byte {offset} of {input:?}")]
    MalformedEscape { input: String, offset: usize },

    #[error("escape sequences in {0:?} do not form valid UTF-8")]
    InvalidUtf8(String),
}

/// Decode a full URL, keeping escapes of reserved characters intact.
pub fn decode_uri(input: &str) -> Result<String, DecodeError> {
    percent_decode(input, URI_RESERVED)
}

/// Decode a single path segment or parameter value completely.
pub fn decode_component(input: &str) -> Result<String, DecodeError> {
    percent_decode(input, &[])
}

fn percent_decode(input: &str, keep: &[u8]) -> Result<String, DecodeError> {
    if !input.contains('%') {
        return Ok(input.to_string());
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let decoded = bytes
            .get(i + 1..i + 3)
            .and_then(|pair| Some(hex_value(pair[0])? << 4 | hex_value(pair[1])?))
            .ok_or_else(|| DecodeError::MalformedEscape {
                input: input.to_string(),
                offset: i,
            })?;

        if keep.contains(&decoded) {
            out.extend_from_slice(&bytes[i..i + 3]);
        } else {
            out.push(decoded);
        }
        i += 3;
    }

    String::from_utf8(out).map_err(|_| DecodeError::InvalidUtf8(input.to_string()))
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Parse a query string into a flat map. Repeated keys keep the last value.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_is_unchanged() {
        assert_eq!(decode_uri("/blog/42?x=1").unwrap(), "/blog/42?x=1");
    }

    #[test]
    fn test_decode_uri_keeps_reserved() {
        assert_eq!(decode_uri("/a%20b/c%2Fd").unwrap(), "/a b/c%2Fd");
        assert_eq!(decode_uri("/caf%C3%A9").unwrap(), "/café");
    }

    #[test]
    fn test_decode_component_decodes_everything() {
        assert_eq!(decode_component("c%2Fd%3F").unwrap(), "c/d?");
    }

    #[test]
    fn test_malformed_escapes() {
        assert!(matches!(
            decode_uri("/%zz"),
            Err(DecodeError::MalformedEscape { offset: 1, .. })
        ));
        assert!(matches!(
            decode_uri("/trailing%4"),
            Err(DecodeError::MalformedEscape { .. })
        ));
        assert!(matches!(
            decode_uri("/%E0%A4%A"),
            Err(DecodeError::MalformedEscape { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(decode_uri("/%C3"), Err(DecodeError::InvalidUtf8(_))));
        assert!(matches!(decode_component("%FF"), Err(DecodeError::InvalidUtf8(_))));
    }

    #[test]
    fn test_parse_query() {
        let query = parse_query(Some("page=2&tag=rust+web&tag=last&flag"));
        assert_eq!(query.get("page").map(String::as_str), Some("2"));
        assert_eq!(query.get("tag").map(String::as_str), Some("last"));
        assert_eq!(query.get("flag").map(String::as_str), Some(""));
        assert!(parse_query(None).is_empty());
    }
}
