use crate::types::{Dimensions, GeometryKind};
use std::fmt;

/// The result returned by the decode and encode functions of the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Where in the byte layout a decode failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// GeoPackage magic, version, flags and SRID
    Header,
    /// GeoPackage envelope doubles
    Envelope,
    /// WKB byte order byte
    ByteOrder,
    /// WKB geometry type code
    TypeCode,
    /// point, ring or child counts
    Count,
    /// coordinate doubles
    Coordinate,
    /// bytes left over after the geometry
    Trailer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Header => "header",
            Stage::Envelope => "envelope",
            Stage::ByteOrder => "byte order",
            Stage::TypeCode => "type code",
            Stage::Count => "count",
            Stage::Coordinate => "coordinate",
            Stage::Trailer => "trailer",
        };
        f.write_str(name)
    }
}

/// The reason a decode or encode failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("input truncated, needed {needed} bytes but only {remaining} remain")]
    TruncatedInput { needed: usize, remaining: usize },
    #[error("bad GeoPackage magic {found:02x?}, expected [47, 50]")]
    BadMagic { found: Vec<u8> },
    #[error("unsupported GeoPackage binary version {version}")]
    UnsupportedVersion { version: u8 },
    #[error("invalid WKB byte order {value}")]
    InvalidByteOrder { value: u8 },
    #[error("unknown WKB geometry type code {code}")]
    UnknownGeometryType { code: u32 },
    #[error("expected a {expected} child geometry but found a {found}")]
    UnexpectedGeometryType {
        expected: GeometryKind,
        found: GeometryKind,
    },
    #[error("invalid GeoPackage envelope indicator {indicator}")]
    InvalidEnvelopeIndicator { indicator: u8 },
    #[error("extended GeoPackage binary geometries are not supported")]
    ExtendedBinary,
    #[error("geometry nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
    #[error("geometry mixes {expected} and {found} coordinates")]
    InconsistentDimensionality {
        expected: Dimensions,
        found: Dimensions,
    },
    #[error("ring {ring} is not closed")]
    RingNotClosed { ring: usize },
    #[error("{count} trailing bytes after the geometry")]
    TrailingBytes { count: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("error decoding geometry: {kind} ({stage} at byte {offset})")]
    Decode {
        stage: Stage,
        offset: usize,
        kind: ErrorKind,
    },
    #[error("error encoding geometry: {kind}")]
    Encode { kind: ErrorKind },
}

impl Error {
    pub(crate) fn decode(stage: Stage, offset: usize, kind: ErrorKind) -> Self {
        Error::Decode {
            stage,
            offset,
            kind,
        }
    }

    pub(crate) fn encode(kind: ErrorKind) -> Self {
        Error::Encode { kind }
    }

    pub fn kind(&self) -> &ErrorKind {
        match self {
            Error::Decode { kind, .. } | Error::Encode { kind } => kind,
        }
    }

    /// The decoding stage, `None` for encode errors
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Decode { stage, .. } => Some(*stage),
            Error::Encode { .. } => None,
        }
    }

    /// Byte offset into the input at which decoding failed, `None` for encode errors
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Decode { offset, .. } => Some(*offset),
            Error::Encode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_message_names_stage_and_offset() {
        let err = Error::decode(
            Stage::Count,
            9,
            ErrorKind::TruncatedInput {
                needed: 4,
                remaining: 1,
            },
        );
        assert_eq!(
            err.to_string(),
            "error decoding geometry: input truncated, needed 4 bytes but only 1 remain \
             (count at byte 9)"
        );
        assert_eq!(err.stage(), Some(Stage::Count));
        assert_eq!(err.offset(), Some(9));
    }

    #[test]
    fn encode_error_has_no_position() {
        let err = Error::encode(ErrorKind::RingNotClosed { ring: 1 });
        assert_eq!(err.to_string(), "error encoding geometry: ring 1 is not closed");
        assert_eq!(err.stage(), None);
        assert_eq!(err.offset(), None);
        assert_eq!(err.kind(), &ErrorKind::RingNotClosed { ring: 1 });
    }

    #[test]
    fn bad_magic_shows_hex() {
        let kind = ErrorKind::BadMagic {
            found: vec![0x00, 0x01],
        };
        assert_eq!(
            kind.to_string(),
            "bad GeoPackage magic [00, 01], expected [47, 50]"
        );
    }
}
