//! Raw text decoding for plain-text uploads.

use super::IngestError;

/// Decodes `data` as UTF-8, dropping a leading byte-order mark.
pub fn decode_text(data: &[u8]) -> Result<String, IngestError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    String::from_utf8(data.to_vec())
        .map_err(|e| IngestError::Parse(format!("File is not valid UTF-8 text: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_utf8() {
        assert_eq!(decode_text("Sjekkliste æøå".as_bytes()).unwrap(), "Sjekkliste æøå");
    }

    #[test]
    fn strips_byte_order_mark() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello").unwrap(), "hello");
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            decode_text(&[0xff, 0xfe, 0x00]),
            Err(IngestError::Parse(_))
        ));
    }
}
