//! Newline-delimited JSON codec for the stdio transport.
//!
//! Each message is a single JSON value terminated by `\n`. A line that is not
//! valid JSON (or is too long) is surfaced as [`Frame::Malformed`] so the
//! server can answer with a parse error and keep reading.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

/// Default maximum line length (16 MB).
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// One decoded line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<T> {
    /// A line that deserialized into `T`.
    Message(T),
    /// A line that could not be decoded, with the reason.
    Malformed(String),
}

/// Newline-delimited JSON codec.
#[derive(Debug)]
pub struct NdJsonCodec<T> {
    _phantom: PhantomData<T>,
    max_length: usize,
    /// Dropping the rest of an oversized line
    discarding: bool,
}

impl<T> NdJsonCodec<T> {
    /// Create a new codec with default max length (16 MB).
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LENGTH)
    }

    /// Create a new codec with custom max length.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            _phantom: PhantomData,
            max_length,
            discarding: false,
        }
    }

    /// Get the max message length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl<T> Default for NdJsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NdJsonCodec<T> {
    fn clone(&self) -> Self {
        Self::with_max_length(self.max_length)
    }
}

fn parse_line<T: DeserializeOwned>(line: &[u8]) -> Frame<T> {
    match serde_json::from_slice(line) {
        Ok(message) => Frame::Message(message),
        Err(e) => Frame::Malformed(format!("Parse error: {}", e)),
    }
}

impl<T: DeserializeOwned> Decoder for NdJsonCodec<T> {
    type Item = Frame<T>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|&b| b == b'\n') else {
                if !self.discarding && src.len() > self.max_length {
                    let length = src.len();
                    src.clear();
                    self.discarding = true;
                    return Ok(Some(Frame::Malformed(format!(
                        "Message too large: {} > {}",
                        length, self.max_length
                    ))));
                }
                if self.discarding {
                    src.clear();
                }
                return Ok(None);
            };

            let line = src.split_to(pos);
            src.advance(1);

            if self.discarding {
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_length {
                return Ok(Some(Frame::Malformed(format!(
                    "Message too large: {} > {}",
                    line.len(),
                    self.max_length
                ))));
            }

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(parse_line(trimmed)));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        // Last line without a trailing newline
        let rest = src.split();
        if self.discarding {
            self.discarding = false;
            return Ok(None);
        }
        let trimmed = rest.trim_ascii();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse_line(trimmed)))
    }
}

impl<T: Serialize> Encoder<T> for NdJsonCodec<T> {
    type Error = std::io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> std::result::Result<(), Self::Error> {
        // Compact serialization never contains a raw newline
        let json = serde_json::to_vec(&item)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("JSON error: {}", e)))?;

        if json.len() > self.max_length {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Message too large: {} > {}", json.len(), self.max_length),
            ));
        }

        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ping {
        id: u32,
        method: String,
    }

    fn decode_all(codec: &mut NdJsonCodec<Value>, buf: &mut BytesMut) -> Vec<Frame<Value>> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_codec_default_max_length() {
        let codec: NdJsonCodec<Value> = NdJsonCodec::new();
        assert_eq!(codec.max_length(), DEFAULT_MAX_LENGTH);
        assert_eq!(codec.clone().max_length(), DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn test_encode_appends_newline() {
        let mut codec: NdJsonCodec<Ping> = NdJsonCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(
                Ping {
                    id: 1,
                    method: "ping".into(),
                },
                &mut buf,
            )
            .unwrap();

        assert_eq!(&buf[..], b"{\"id\":1,\"method\":\"ping\"}\n");
    }

    #[test]
    fn test_encode_too_large() {
        let mut codec: NdJsonCodec<Ping> = NdJsonCodec::with_max_length(8);
        let mut buf = BytesMut::new();
        let result = codec.encode(
            Ping {
                id: 1,
                method: "a long method name".into(),
            },
            &mut buf,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_typed_message() {
        let mut codec: NdJsonCodec<Ping> = NdJsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"id\":7,\"method\":\"tools/list\"}\n"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            frame,
            Frame::Message(Ping {
                id: 7,
                method: "tools/list".into()
            })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line_waits() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"id\":1"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"}\n");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Message(serde_json::json!({"id": 1})));
    }

    #[test]
    fn test_decode_skips_blank_lines_and_crlf() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::new();
        let mut buf = BytesMut::from(&b"\n  \r\n{\"a\":1}\r\n{\"b\":2}\n"[..]);

        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(
            frames,
            vec![
                Frame::Message(serde_json::json!({"a": 1})),
                Frame::Message(serde_json::json!({"b": 2})),
            ]
        );
    }

    #[test]
    fn test_decode_malformed_line_does_not_poison_stream() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::new();
        let mut buf = BytesMut::from(&b"{not json}\n{\"ok\":true}\n"[..]);

        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(frames.len(), 2);
        assert!(matches!(&frames[0], Frame::Malformed(reason) if reason.starts_with("Parse error")));
        assert_eq!(frames[1], Frame::Message(serde_json::json!({"ok": true})));
    }

    #[test]
    fn test_decode_oversized_line_is_discarded() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::with_max_length(16);
        let mut buf = BytesMut::from(&b"[1,2,3,4,5,6,7,8,9,10,11,12]"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(frame, Frame::Malformed(reason) if reason.starts_with("Message too large")));

        // Tail of the oversized line, then a normal one
        buf.extend_from_slice(b",13]\n{\"n\":1}\n");
        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(frames, vec![Frame::Message(serde_json::json!({"n": 1}))]);
    }

    #[test]
    fn test_decode_oversized_complete_line() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::with_max_length(4);
        let mut buf = BytesMut::from(&b"{\"abc\":1}\n"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(frame, Frame::Malformed(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_takes_unterminated_line() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"last\":true}"[..]);

        let frame = codec.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Message(serde_json::json!({"last": true})));
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_eof_ignores_trailing_whitespace() {
        let mut codec: NdJsonCodec<Value> = NdJsonCodec::new();
        let mut buf = BytesMut::from(&b"  \r"[..]);
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }
}
