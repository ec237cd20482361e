//! RecordIO framing used by the scheduler event stream.
//!
//! Each record is `<decimal length>\n<payload>`; the length counts payload bytes only.
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::error::TransportError;

/// Upper bound for a single record.
pub const MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// Longest length header accepted before a newline must appear.
const MAX_HEADER_LEN: usize = 20;

#[derive(Debug)]
pub struct RecordIo {
    max_len: usize,
    pending: Option<usize>,
}

impl RecordIo {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            pending: None,
        }
    }
}

impl Default for RecordIo {
    fn default() -> Self {
        Self::new(MAX_RECORD_LEN)
    }
}

impl Decoder for RecordIo {
    type Item = Bytes;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, TransportError> {
        let len = match self.pending {
            Some(len) => len,
            None => {
                let Some(pos) = src.iter().position(|b| *b == b'\n') else {
                    if src.len() > MAX_HEADER_LEN {
                        return Err(TransportError::Codec("record header too long".into()));
                    }
                    return Ok(None);
                };
                let header = src.split_to(pos + 1);
                let text = std::str::from_utf8(&header[..pos])
                    .map_err(|_| TransportError::Codec("record header is not utf-8".into()))?;
                let len: usize = text.trim().parse().map_err(|_| {
                    TransportError::Codec(format!("bad record length {:?}", text.trim()))
                })?;
                if len > self.max_len {
                    return Err(TransportError::Codec(format!(
                        "record of {len} bytes exceeds limit of {}",
                        self.max_len
                    )));
                }
                self.pending = Some(len);
                len
            }
        };

        if src.len() < len {
            src.reserve(len - src.len());
            return Ok(None);
        }
        self.pending = None;
        Ok(Some(src.split_to(len).freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(codec: &mut RecordIo, buf: &mut BytesMut) -> Vec<Bytes> {
        let mut out = Vec::new();
        while let Some(rec) = codec.decode(buf).unwrap() {
            out.push(rec);
        }
        out
    }

    #[test]
    fn decodes_back_to_back_records() {
        let mut codec = RecordIo::default();
        let mut buf = BytesMut::from(&b"5\nhello3\nabc"[..]);
        assert_eq!(feed(&mut codec, &mut buf), vec![Bytes::from("hello"), Bytes::from("abc")]);
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_split_chunks() {
        let mut codec = RecordIo::default();
        let mut buf = BytesMut::from(&b"1"[..]);
        assert!(feed(&mut codec, &mut buf).is_empty());

        buf.extend_from_slice(b"2\n{\"type\":");
        assert!(feed(&mut codec, &mut buf).is_empty());

        buf.extend_from_slice(b"\"X\"}");
        assert_eq!(feed(&mut codec, &mut buf), vec![Bytes::from(r#"{"type":"X"}"#)]);
    }

    #[test]
    fn rejects_garbage_and_oversized_headers() {
        let mut codec = RecordIo::default();
        let mut buf = BytesMut::from(&b"abc\n"[..]);
        assert!(matches!(codec.decode(&mut buf), Err(TransportError::Codec(_))));

        let mut codec = RecordIo::new(4);
        let mut buf = BytesMut::from(&b"5\nhello"[..]);
        assert!(matches!(codec.decode(&mut buf), Err(TransportError::Codec(_))));

        let mut codec = RecordIo::default();
        let mut buf = BytesMut::from(&[b'9'; 32][..]);
        assert!(codec.decode(&mut buf).is_err());
    }
}
