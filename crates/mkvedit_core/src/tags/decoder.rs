//! Reversal of track content encodings (compression, encryption).

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::error::{TagError, TagResult};
use crate::ebml::{ids, Element, Value};

/// Scope bit for encodings applied to frame contents.
pub const SCOPE_BLOCK: u64 = 1;

/// Undo a track's content encodings on frame data.
pub trait ContentDecoder {
    /// Whether every encoding of the track can be reversed.
    fn is_ok(&self) -> bool;

    /// Reverse the encodings applicable to `scope`.
    fn reverse(&self, data: Vec<u8>, scope: u64) -> TagResult<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Transform {
    Zlib,
    HeaderStripping(Vec<u8>),
    Unsupported(String),
}

#[derive(Debug, Clone)]
struct Encoding {
    order: u64,
    scope: u64,
    transform: Transform,
}

/// Content decoder built from a track's `ContentEncodings`.
#[derive(Debug, Clone, Default)]
pub struct TrackContentDecoder {
    track_number: u64,
    /// Sorted by descending order, the sequence they are undone in.
    encodings: Vec<Encoding>,
}

impl TrackContentDecoder {
    /// Build the decoder for a `TrackEntry`.
    pub fn from_track(track: &Element) -> Self {
        let track_number = track.child_u64(ids::TRACK_NUMBER).unwrap_or(0);
        let mut encodings: Vec<Encoding> = track
            .find_child(ids::CONTENT_ENCODINGS)
            .map(|encs| encs.children_of(ids::CONTENT_ENCODING).map(read_encoding).collect())
            .unwrap_or_default();

        encodings.sort_by(|a, b| b.order.cmp(&a.order));

        Self {
            track_number,
            encodings,
        }
    }

    /// Description of the first encoding that cannot be reversed.
    pub fn unsupported_reason(&self) -> Option<&str> {
        self.encodings.iter().find_map(|e| match &e.transform {
            Transform::Unsupported(reason) => Some(reason.as_str()),
            _ => None,
        })
    }
}

fn read_encoding(encoding: &Element) -> Encoding {
    let order = encoding.child_u64(ids::CONTENT_ENCODING_ORDER).unwrap_or(0);
    let scope = encoding.child_u64(ids::CONTENT_ENCODING_SCOPE).unwrap_or(SCOPE_BLOCK);
    let kind = encoding.child_u64(ids::CONTENT_ENCODING_TYPE).unwrap_or(0);

    let transform = match kind {
        0 => {
            let compression = encoding.find_child(ids::CONTENT_COMPRESSION);
            let algo = compression
                .and_then(|c| c.child_u64(ids::CONTENT_COMP_ALGO))
                .unwrap_or(0);
            match algo {
                0 => Transform::Zlib,
                1 => Transform::Unsupported("bzlib compression".into()),
                2 => Transform::Unsupported("lzo compression".into()),
                3 => {
                    let header = compression
                        .and_then(|c| c.find_child(ids::CONTENT_COMP_SETTINGS))
                        .and_then(|s| match s.value() {
                            Some(Value::Binary(bytes)) => Some(bytes.clone()),
                            _ => None,
                        })
                        .unwrap_or_default();
                    Transform::HeaderStripping(header)
                }
                other => Transform::Unsupported(format!("compression algorithm {}", other)),
            }
        }
        1 => Transform::Unsupported("encryption".into()),
        other => Transform::Unsupported(format!("content encoding type {}", other)),
    };

    Encoding {
        order,
        scope,
        transform,
    }
}

impl ContentDecoder for TrackContentDecoder {
    fn is_ok(&self) -> bool {
        self.unsupported_reason().is_none()
    }

    fn reverse(&self, mut data: Vec<u8>, scope: u64) -> TagResult<Vec<u8>> {
        for encoding in &self.encodings {
            if encoding.scope & scope == 0 {
                continue;
            }

            data = match &encoding.transform {
                Transform::Zlib => {
                    let mut out = Vec::with_capacity(data.len() * 2);
                    ZlibDecoder::new(data.as_slice())
                        .read_to_end(&mut out)
                        .map_err(|e| TagError::ContentDecoding {
                            track_number: self.track_number,
                            message: format!("zlib: {}", e),
                        })?;
                    out
                }
                Transform::HeaderStripping(header) => {
                    let mut out = Vec::with_capacity(header.len() + data.len());
                    out.extend_from_slice(header);
                    out.extend_from_slice(&data);
                    out
                }
                Transform::Unsupported(_) => {
                    return Err(TagError::UnsupportedContentEncoding {
                        track_number: self.track_number,
                    })
                }
            };
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn track(encodings: Vec<Element>) -> Element {
        Element::master_with(
            ids::TRACK_ENTRY,
            vec![
                Element::unsigned(ids::TRACK_NUMBER, 1),
                Element::master_with(ids::CONTENT_ENCODINGS, encodings),
            ],
        )
    }

    fn compression(order: u64, algo: u64, settings: Option<Vec<u8>>) -> Element {
        let mut comp = Element::master_with(
            ids::CONTENT_COMPRESSION,
            vec![Element::unsigned(ids::CONTENT_COMP_ALGO, algo)],
        );
        if let Some(settings) = settings {
            comp.push(Element::binary(ids::CONTENT_COMP_SETTINGS, settings));
        }
        Element::master_with(
            ids::CONTENT_ENCODING,
            vec![
                Element::unsigned(ids::CONTENT_ENCODING_ORDER, order),
                Element::unsigned(ids::CONTENT_ENCODING_TYPE, 0),
                comp,
            ],
        )
    }

    #[test]
    fn plain_track_passes_data_through() {
        let decoder = TrackContentDecoder::from_track(&Element::master(ids::TRACK_ENTRY));
        assert!(decoder.is_ok());
        assert_eq!(decoder.reverse(vec![1, 2, 3], SCOPE_BLOCK).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn header_stripping_restores_prefix() {
        let decoder = TrackContentDecoder::from_track(&track(vec![compression(
            0,
            3,
            Some(vec![0xAA, 0xBB]),
        )]));
        assert!(decoder.is_ok());
        assert_eq!(
            decoder.reverse(vec![1], SCOPE_BLOCK).unwrap(),
            vec![0xAA, 0xBB, 1]
        );
    }

    #[test]
    fn zlib_is_inflated() {
        let payload = b"frame payload frame payload".to_vec();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoder = TrackContentDecoder::from_track(&track(vec![compression(0, 0, None)]));
        assert_eq!(decoder.reverse(compressed, SCOPE_BLOCK).unwrap(), payload);
    }

    #[test]
    fn higher_order_is_undone_first() {
        // Encoded as: strip header (order 0), then zlib (order 1).
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"body").unwrap();
        let stored = encoder.finish().unwrap();

        let decoder = TrackContentDecoder::from_track(&track(vec![
            compression(0, 3, Some(b"head-".to_vec())),
            compression(1, 0, None),
        ]));
        assert_eq!(decoder.reverse(stored, SCOPE_BLOCK).unwrap(), b"head-body".to_vec());
    }

    #[test]
    fn encryption_and_lzo_are_not_ok() {
        let encrypted = track(vec![Element::master_with(
            ids::CONTENT_ENCODING,
            vec![
                Element::unsigned(ids::CONTENT_ENCODING_TYPE, 1),
                Element::master(ids::CONTENT_ENCRYPTION),
            ],
        )]);
        let decoder = TrackContentDecoder::from_track(&encrypted);
        assert!(!decoder.is_ok());
        assert_eq!(decoder.unsupported_reason(), Some("encryption"));
        assert!(matches!(
            decoder.reverse(vec![0], SCOPE_BLOCK),
            Err(TagError::UnsupportedContentEncoding { track_number: 1 })
        ));

        let lzo = TrackContentDecoder::from_track(&track(vec![compression(0, 2, None)]));
        assert!(!lzo.is_ok());
    }

    #[test]
    fn other_scopes_are_skipped() {
        let mut encoding = compression(0, 3, Some(vec![9]));
        encoding.set_child_u64(ids::CONTENT_ENCODING_SCOPE, 2);
        let decoder = TrackContentDecoder::from_track(&track(vec![encoding]));
        assert_eq!(decoder.reverse(vec![1], SCOPE_BLOCK).unwrap(), vec![1]);
    }

    #[test]
    fn corrupt_zlib_data_fails() {
        let decoder = TrackContentDecoder::from_track(&track(vec![compression(0, 0, None)]));
        assert!(matches!(
            decoder.reverse(vec![1, 2, 3, 4], SCOPE_BLOCK),
            Err(TagError::ContentDecoding { .. })
        ));
    }
}
