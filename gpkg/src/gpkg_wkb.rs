use crate::cursor::{ByteCursor, ByteWriter, Endianness};
use crate::options::{DecodeOptions, EncodeOptions, VersionPolicy};
use crate::result::{Error, ErrorKind, Result, Stage};
use crate::types::*;
use crate::wkb;

/// "GP" in ASCII
pub const MAGIC: [u8; 2] = [0x47, 0x50];
/// The only binary version the GeoPackage specification defines, 0 means version 1
pub const VERSION: u8 = 0;

/// The flags byte of a GeoPackage binary header
///
/// See the [flags layout](https://www.geopackage.org/spec130/#flags_layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    /// bit 5, set for ExtendedGeoPackageBinary
    pub extended: bool,
    /// bit 4
    pub empty: bool,
    /// bit 0, the order of the SRID and envelope
    pub byte_order: Endianness,
    /// bits 1-3
    pub envelope: EnvelopeType,
}

impl HeaderFlags {
    /// Reserved bits 6 and 7 are ignored.
    pub fn from_byte(b: u8) -> std::result::Result<Self, ErrorKind> {
        let extended = ((b >> 5) & 1) > 0;
        let empty = ((b >> 4) & 1) > 0;
        let byte_order = match b & 1 {
            0 => Endianness::Big,
            _ => Endianness::Little,
        };
        let indicator = (b >> 1) & 0b111;
        let envelope = EnvelopeType::from_indicator(indicator)
            .ok_or(ErrorKind::InvalidEnvelopeIndicator { indicator })?;
        Ok(HeaderFlags {
            extended,
            empty,
            byte_order,
            envelope,
        })
    }

    pub fn to_byte(&self) -> u8 {
        let mut flags = 0u8;
        flags |= (self.extended as u8) << 5;
        flags |= (self.empty as u8) << 4;
        flags |= self.envelope.indicator() << 1;
        flags |= self.byte_order.wkb_byte();
        flags
    }
}

/// A decoded GeoPackageBinaryHeader
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPackageHeader {
    pub version: u8,
    pub flags: HeaderFlags,
    pub srid: i32,
    pub envelope: Option<Envelope>,
}

/// A geometry as stored in a GeoPackage geometry column: SRID, optional
/// envelope and the geometry itself.
///
/// The geometry is absent only when a blob has the empty flag set and no
/// body at all. With the empty flag and a body, it is an empty geometry of
/// the kind the body declares.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGeometry {
    pub srid: i32,
    pub envelope: Option<Envelope>,
    geometry: Option<Geometry>,
}

impl SpatialGeometry {
    /// A geometry without an envelope
    pub fn new(srid: i32, geometry: Geometry) -> Self {
        SpatialGeometry {
            srid,
            envelope: None,
            geometry: Some(geometry),
        }
    }

    /// A value with the empty flag set and no geometry body.
    /// Use [SpatialGeometry::new] with [Geometry::empty] to keep the kind.
    pub fn empty(srid: i32) -> Self {
        SpatialGeometry {
            srid,
            envelope: None,
            geometry: None,
        }
    }

    pub fn with_envelope(mut self, envelope: Option<Envelope>) -> Self {
        self.envelope = envelope;
        self
    }

    /// Replaces the envelope with the bounds of the geometry, or removes it
    /// when there is no geometry or no finite coordinate.
    pub fn with_computed_envelope(mut self) -> Self {
        self.envelope = self.geometry.as_ref().and_then(Geometry::envelope);
        self
    }

    /// True when there is no geometry or the geometry has no coordinates,
    /// which is what the empty flag of an encoded blob records.
    pub fn is_empty(&self) -> bool {
        self.geometry.as_ref().map_or(true, Geometry::is_empty)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn into_geometry(self) -> Option<Geometry> {
        self.geometry
    }
}

/// Decode a StandardGeoPackageBinary blob with default options.
pub fn decode_geopackage(bytes: &[u8]) -> Result<SpatialGeometry> {
    decode_geopackage_with(bytes, &DecodeOptions::default())
}

pub fn decode_geopackage_with(bytes: &[u8], options: &DecodeOptions) -> Result<SpatialGeometry> {
    let mut cursor = ByteCursor::new(bytes);
    let header = read_header(&mut cursor, options)?;

    if header.flags.empty {
        // only the kind of an empty body is kept
        let geometry = match cursor.remaining() {
            0 => None,
            _ => Some(Geometry::empty(wkb::read_geometry_type(&mut cursor, options)?)),
        };
        log::debug!(
            "empty geometry flag set, skipping {} body bytes",
            cursor.remaining()
        );
        return Ok(SpatialGeometry {
            srid: header.srid,
            envelope: header.envelope,
            geometry,
        });
    }

    // the WKB body declares its own byte order, which may differ from the header's
    let geometry = wkb::read_geometry(&mut cursor, options)?;
    wkb::check_trailing(&mut cursor, options.trailing_bytes)?;

    Ok(SpatialGeometry {
        srid: header.srid,
        envelope: header.envelope,
        geometry: Some(geometry),
    })
}

/// Decode only the header, returning it with the offset at which the WKB body starts.
///
/// Useful for filtering on the envelope without decoding geometries.
pub fn decode_header(bytes: &[u8]) -> Result<(GeoPackageHeader, usize)> {
    decode_header_with(bytes, &DecodeOptions::default())
}

/// Like [decode_header], with `options.version_policy` applied to the version byte.
pub fn decode_header_with(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<(GeoPackageHeader, usize)> {
    let mut cursor = ByteCursor::new(bytes);
    let header = read_header(&mut cursor, options)?;
    Ok((header, cursor.position()))
}

fn read_header(cursor: &mut ByteCursor<'_>, options: &DecodeOptions) -> Result<GeoPackageHeader> {
    cursor.set_stage(Stage::Header);

    // a short buffer is only truncated if what is there could still be the magic
    let available = cursor.remaining().min(MAGIC.len());
    let magic = cursor.read_bytes(available)?;
    if magic != &MAGIC[..available] {
        return Err(cursor.error_at(
            0,
            ErrorKind::BadMagic {
                found: magic.to_vec(),
            },
        ));
    }
    cursor.read_bytes(MAGIC.len() - available)?;

    let version = cursor.read_u8()?;
    if version != VERSION {
        match options.version_policy {
            VersionPolicy::Reject => {
                return Err(cursor.error_at(2, ErrorKind::UnsupportedVersion { version }))
            }
            VersionPolicy::Warn => {
                log::warn!(
                    "unknown GeoPackage binary version {}, decoding as version {}",
                    version,
                    VERSION
                )
            }
        }
    }

    let flags =
        HeaderFlags::from_byte(cursor.read_u8()?).map_err(|kind| cursor.error_at(3, kind))?;
    if flags.extended {
        return Err(cursor.error_at(3, ErrorKind::ExtendedBinary));
    }

    let order = flags.byte_order;
    let srid = cursor.read_i32(order)?;

    cursor.set_stage(Stage::Envelope);
    let envelope = read_envelope(cursor, order, flags.envelope)?;

    Ok(GeoPackageHeader {
        version,
        flags,
        srid,
        envelope,
    })
}

fn read_envelope(
    cursor: &mut ByteCursor<'_>,
    order: Endianness,
    envelope_type: EnvelopeType,
) -> Result<Option<Envelope>> {
    if envelope_type.is_empty() {
        return Ok(None);
    }
    let mut range = || -> Result<(f64, f64)> {
        Ok((cursor.read_f64(order)?, cursor.read_f64(order)?))
    };
    let (min_x, max_x) = range()?;
    let (min_y, max_y) = range()?;
    let z = match envelope_type {
        EnvelopeType::Xyz | EnvelopeType::Xyzm => Some(range()?),
        _ => None,
    };
    let m = match envelope_type {
        EnvelopeType::Xym | EnvelopeType::Xyzm => Some(range()?),
        _ => None,
    };
    Ok(Some(Envelope {
        min_x,
        max_x,
        min_y,
        max_y,
        z,
        m,
    }))
}

/// Encode as a StandardGeoPackageBinary with ISO WKB in `byte_order`.
pub fn encode_geopackage(geometry: &SpatialGeometry, byte_order: Endianness) -> Result<Vec<u8>> {
    encode_geopackage_with(geometry, &EncodeOptions::new(byte_order))
}

pub fn encode_geopackage_with(
    geometry: &SpatialGeometry,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    if let Some(g) = &geometry.geometry {
        g.validate(options.strict).map_err(Error::encode)?;
    }

    let envelope_type = geometry
        .envelope
        .as_ref()
        .map(Envelope::envelope_type)
        .unwrap_or(EnvelopeType::Missing);
    let flags = HeaderFlags {
        extended: false,
        empty: geometry.is_empty(),
        byte_order: options.byte_order,
        envelope: envelope_type,
    };

    let body_len = geometry.geometry.as_ref().map(wkb::encoded_len).unwrap_or(0);
    let mut w = ByteWriter::with_capacity(8 + envelope_type.len() * 8 + body_len);
    w.write_bytes(&MAGIC);
    w.write_u8(VERSION);
    w.write_u8(flags.to_byte());
    w.write_i32(options.byte_order, geometry.srid);
    if let Some(envelope) = &geometry.envelope {
        write_envelope(&mut w, options.byte_order, envelope);
    }
    if let Some(g) = &geometry.geometry {
        wkb::write_geometry(&mut w, g, options);
    }
    Ok(w.into_inner())
}

fn write_envelope(w: &mut ByteWriter, order: Endianness, envelope: &Envelope) {
    for v in [envelope.min_x, envelope.max_x, envelope.min_y, envelope.max_y] {
        w.write_f64(order, v);
    }
    for (min, max) in [envelope.z, envelope.m].into_iter().flatten() {
        w.write_f64(order, min);
        w.write_f64(order, max);
    }
}
