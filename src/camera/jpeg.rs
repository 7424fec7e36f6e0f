const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const MIN_JPEG_BYTES: usize = JPEG_SOI.len() + JPEG_EOI.len();

/// Cheap structural check: the buffer opens with a start-of-image marker and
/// closes with an end-of-image marker. Nothing in between is decoded.
pub fn is_complete_jpeg(data: &[u8]) -> bool {
    data.len() >= MIN_JPEG_BYTES && data.starts_with(&JPEG_SOI) && data.ends_with(&JPEG_EOI)
}

#[cfg(test)]
pub(crate) fn fake_jpeg(payload: &[u8]) -> Vec<u8> {
    let mut out = JPEG_SOI.to_vec();
    out.extend_from_slice(payload);
    out.extend_from_slice(&JPEG_EOI);
    out
}

#[cfg(test)]
mod tests {
    use super::{fake_jpeg, is_complete_jpeg};

    #[test]
    fn accepts_buffer_with_both_markers() {
        assert!(is_complete_jpeg(&fake_jpeg(b"abc")));
    }

    #[test]
    fn accepts_bare_markers() {
        assert!(is_complete_jpeg(&fake_jpeg(b"")));
    }

    #[test]
    fn rejects_truncated_frame() {
        let mut frame = fake_jpeg(b"hello-world");
        frame.truncate(frame.len() - 1);
        assert!(!is_complete_jpeg(&frame));
    }

    #[test]
    fn rejects_missing_start_marker() {
        let mut frame = b"header".to_vec();
        frame.extend_from_slice(&fake_jpeg(b"abc"));
        assert!(!is_complete_jpeg(&frame));
    }

    #[test]
    fn rejects_short_or_empty_buffers() {
        assert!(!is_complete_jpeg(&[]));
        assert!(!is_complete_jpeg(&[0xFF, 0xD8, 0xD9]));
    }
}
