use crate::cursor::Endianness;

/// Default limit on Multi* / GeometryCollection nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do with a GeoPackage binary version other than 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// fail with `UnsupportedVersion`
    #[default]
    Reject,
    /// log a warning and decode as version 0
    Warn,
}

/// What to do with bytes left over after a complete geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBytes {
    #[default]
    Warn,
    Ignore,
    /// fail with `TrailingBytes`
    Reject,
}

/// Type code convention used when writing WKB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WkbFlavor {
    /// ISO numeric ranges, 1001 for Point Z
    #[default]
    Iso,
    /// PostGIS high bit flags, 0x80000001 for Point Z
    Extended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub max_depth: usize,
    /// Check ring closure
    pub strict: bool,
    /// Accept PostGIS EWKB type codes next to the ISO ones
    pub allow_ewkb: bool,
    pub version_policy: VersionPolicy,
    pub trailing_bytes: TrailingBytes,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
            allow_ewkb: true,
            version_policy: VersionPolicy::default(),
            trailing_bytes: TrailingBytes::default(),
        }
    }
}

impl DecodeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_ewkb(mut self, allow_ewkb: bool) -> Self {
        self.allow_ewkb = allow_ewkb;
        self
    }

    pub fn with_version_policy(mut self, policy: VersionPolicy) -> Self {
        self.version_policy = policy;
        self
    }

    pub fn with_trailing_bytes(mut self, policy: TrailingBytes) -> Self {
        self.trailing_bytes = policy;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Byte order of the GeoPackage header and of every WKB body in the tree
    pub byte_order: Endianness,
    pub flavor: WkbFlavor,
    /// Refuse to write unclosed rings
    pub strict: bool,
}

impl EncodeOptions {
    pub fn new(byte_order: Endianness) -> Self {
        EncodeOptions {
            byte_order,
            ..Default::default()
        }
    }

    pub fn with_flavor(mut self, flavor: WkbFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let decode = DecodeOptions::default();
        assert_eq!(decode.max_depth, 64);
        assert!(!decode.strict);
        assert!(decode.allow_ewkb);
        assert_eq!(decode.version_policy, VersionPolicy::Reject);
        assert_eq!(decode.trailing_bytes, TrailingBytes::Warn);

        let encode = EncodeOptions::default();
        assert_eq!(encode.byte_order, Endianness::Little);
        assert_eq!(encode.flavor, WkbFlavor::Iso);
        assert!(!encode.strict);
    }

    #[test]
    fn builders() {
        let decode = DecodeOptions::default()
            .with_max_depth(3)
            .with_strict(true)
            .with_ewkb(false)
            .with_version_policy(VersionPolicy::Warn)
            .with_trailing_bytes(TrailingBytes::Reject);
        assert_eq!(
            decode,
            DecodeOptions {
                max_depth: 3,
                strict: true,
                allow_ewkb: false,
                version_policy: VersionPolicy::Warn,
                trailing_bytes: TrailingBytes::Reject,
            }
        );

        let encode = EncodeOptions::new(Endianness::Big)
            .with_flavor(WkbFlavor::Extended)
            .with_strict(true);
        assert_eq!(encode.byte_order, Endianness::Big);
        assert_eq!(encode.flavor, WkbFlavor::Extended);
        assert!(encode.strict);
    }
}
