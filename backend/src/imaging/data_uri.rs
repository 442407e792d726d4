use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Drops a leading `data:<mime>;base64,` header if present.
pub fn strip_header(data: &str) -> &str {
    let data = data.trim();
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload;
        }
    }
    data
}

/// Decodes either a full data URI or a bare base64 payload.
pub fn decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload: String = strip_header(data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(payload)
}

pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_optional() {
        let bytes = b"\x89PNG fake payload";
        let uri = encode(bytes, "image/png");
        assert!(uri.starts_with("data:image/png;base64,"));

        assert_eq!(decode(&uri).unwrap(), bytes);
        assert_eq!(decode(strip_header(&uri)).unwrap(), bytes);
    }

    #[test]
    fn whitespace_in_payload_is_tolerated() {
        let encoded = STANDARD.encode(b"mask-bytes");
        let (head, tail) = encoded.split_at(4);
        let wrapped = format!("data:image/png;base64,{}\n{}\n", head, tail);
        assert_eq!(decode(&wrapped).unwrap(), b"mask-bytes");
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(decode("data:image/png;base64,@@@not-base64@@@").is_err());
    }

    #[test]
    fn png_signature_is_sniffed() {
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(sniff_mime(&png_header), "image/png");
        assert_eq!(sniff_mime(b"plain text"), "application/octet-stream");
    }
}
