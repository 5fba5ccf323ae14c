use crate::cursor::{ByteCursor, ByteWriter, Endianness};
use crate::options::{DecodeOptions, EncodeOptions, TrailingBytes, WkbFlavor};
use crate::result::{Error, ErrorKind, Result, Stage};
use crate::types::*;

/// Decode a standard WKB geometry (ISO, or PostGIS EWKB type codes) with default options.
pub fn decode_wkb(bytes: &[u8]) -> Result<Geometry> {
    decode_wkb_with(bytes, &DecodeOptions::default())
}

pub fn decode_wkb_with(bytes: &[u8], options: &DecodeOptions) -> Result<Geometry> {
    let mut cursor = ByteCursor::new(bytes);
    let geometry = read_geometry(&mut cursor, options)?;
    check_trailing(&mut cursor, options.trailing_bytes)?;
    Ok(geometry)
}

/// Encode a geometry as ISO WKB, using `byte_order` for every body in the tree.
pub fn encode_wkb(geometry: &Geometry, byte_order: Endianness) -> Result<Vec<u8>> {
    encode_wkb_with(geometry, &EncodeOptions::new(byte_order))
}

/// Encode a geometry after checking that its dimensions are consistent
/// (and, in strict mode, that its rings are closed). Nothing is written
/// when the check fails.
pub fn encode_wkb_with(geometry: &Geometry, options: &EncodeOptions) -> Result<Vec<u8>> {
    geometry.validate(options.strict).map_err(Error::encode)?;
    let mut w = ByteWriter::with_capacity(encoded_len(geometry));
    write_geometry(&mut w, geometry, options);
    Ok(w.into_inner())
}

/// Read one complete WKB geometry starting at the cursor position.
pub(crate) fn read_geometry(
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
) -> Result<Geometry> {
    let mut reader = Reader {
        cursor,
        options,
        depth: 0,
    };
    reader.read_geometry()
}

/// Read only the byte order and type code of the WKB geometry at the cursor.
pub(crate) fn read_geometry_type(
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
) -> Result<GeometryType> {
    let mut reader = Reader {
        cursor,
        options,
        depth: 0,
    };
    Ok(reader.read_type_header()?.1)
}

pub(crate) fn check_trailing(cursor: &mut ByteCursor<'_>, policy: TrailingBytes) -> Result<()> {
    let count = cursor.remaining();
    if count == 0 {
        return Ok(());
    }
    match policy {
        TrailingBytes::Warn => {
            log::warn!(
                "ignoring {} trailing bytes after the geometry at byte {}",
                count,
                cursor.position()
            );
            Ok(())
        }
        TrailingBytes::Ignore => Ok(()),
        TrailingBytes::Reject => {
            cursor.set_stage(Stage::Trailer);
            Err(cursor.error_at(cursor.position(), ErrorKind::TrailingBytes { count }))
        }
    }
}

// How the dimensions were encoded in a type code. Resolved once per
// geometry so the body readers only ever see a plain GeometryType.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeCodeConvention {
    Iso,
    Extended { has_srid: bool },
}

fn parse_type_code(code: u32, allow_ewkb: bool) -> Option<(GeometryType, TypeCodeConvention)> {
    let flags = code & (EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG);
    if flags != 0 {
        if !allow_ewkb {
            return None;
        }
        let kind = GeometryKind::from_wkb_id(code & 0x0FFF_FFFF)?;
        let dimensions = Dimensions::new(code & EWKB_Z_FLAG != 0, code & EWKB_M_FLAG != 0);
        let convention = TypeCodeConvention::Extended {
            has_srid: code & EWKB_SRID_FLAG != 0,
        };
        return Some((GeometryType::new(kind, dimensions), convention));
    }
    let dimensions = match code / 1000 {
        0 => Dimensions::Xy,
        1 => Dimensions::Xyz,
        2 => Dimensions::Xym,
        3 => Dimensions::Xyzm,
        _ => return None,
    };
    let kind = GeometryKind::from_wkb_id(code % 1000)?;
    Some((GeometryType::new(kind, dimensions), TypeCodeConvention::Iso))
}

struct Reader<'a, 'c> {
    cursor: &'c mut ByteCursor<'a>,
    options: &'c DecodeOptions,
    depth: usize,
}

impl Reader<'_, '_> {
    fn read_geometry(&mut self) -> Result<Geometry> {
        let start = self.cursor.position();
        self.cursor.set_stage(Stage::ByteOrder);
        if self.depth >= self.options.max_depth {
            return Err(self.cursor.error_at(
                start,
                ErrorKind::DepthExceeded {
                    max_depth: self.options.max_depth,
                },
            ));
        }

        let (order, geometry_type) = self.read_type_header()?;
        log::trace!("decoding {} at byte {}", geometry_type, start);

        let dims = geometry_type.dimensions;
        self.depth += 1;
        let geometry = match geometry_type.kind {
            GeometryKind::Point => Point::read_body(self, order, dims)?.into(),
            GeometryKind::LineString => LineString::read_body(self, order, dims)?.into(),
            GeometryKind::Polygon => Polygon::read_body(self, order, dims)?.into(),
            GeometryKind::MultiPoint => MultiPoint::read_body(self, order, dims)?.into(),
            GeometryKind::MultiLineString => MultiLineString::read_body(self, order, dims)?.into(),
            GeometryKind::MultiPolygon => MultiPolygon::read_body(self, order, dims)?.into(),
            GeometryKind::GeometryCollection => {
                GeometryCollection::read_body(self, order, dims)?.into()
            }
        };
        self.depth -= 1;
        Ok(geometry)
    }

    /// Reads the byte order byte and the type code, skipping an EWKB SRID.
    fn read_type_header(&mut self) -> Result<(Endianness, GeometryType)> {
        let start = self.cursor.position();
        self.cursor.set_stage(Stage::ByteOrder);
        let value = self.cursor.read_u8()?;
        let order = Endianness::from_wkb_byte(value)
            .ok_or_else(|| self.cursor.error_at(start, ErrorKind::InvalidByteOrder { value }))?;

        self.cursor.set_stage(Stage::TypeCode);
        let code_offset = self.cursor.position();
        let code = self.cursor.read_u32(order)?;
        let (geometry_type, convention) = parse_type_code(code, self.options.allow_ewkb)
            .ok_or_else(|| {
                self.cursor
                    .error_at(code_offset, ErrorKind::UnknownGeometryType { code })
            })?;
        if let TypeCodeConvention::Extended { has_srid: true } = convention {
            let srid = self.cursor.read_i32(order)?;
            log::debug!("discarding EWKB SRID {} at byte {}", srid, code_offset);
        }
        Ok((order, geometry_type))
    }

    /// Reads a u32 count and rejects it up front when the remaining input
    /// cannot hold `count` items of at least `min_item_len` bytes each.
    fn read_count(&mut self, order: Endianness, min_item_len: usize) -> Result<usize> {
        self.cursor.set_stage(Stage::Count);
        let offset = self.cursor.position();
        let count = self.cursor.read_u32(order)? as usize;
        let needed = count.saturating_mul(min_item_len);
        let remaining = self.cursor.remaining();
        if needed > remaining {
            return Err(self
                .cursor
                .error_at(offset, ErrorKind::TruncatedInput { needed, remaining }));
        }
        Ok(count)
    }

    fn read_coord(&mut self, order: Endianness, dims: Dimensions) -> Result<Coord> {
        self.cursor.set_stage(Stage::Coordinate);
        let x = self.cursor.read_f64(order)?;
        let y = self.cursor.read_f64(order)?;
        let z = match dims.has_z() {
            true => Some(self.cursor.read_f64(order)?),
            false => None,
        };
        let m = match dims.has_m() {
            true => Some(self.cursor.read_f64(order)?),
            false => None,
        };
        Ok(Coord { x, y, z, m })
    }

    fn read_coords(&mut self, order: Endianness, dims: Dimensions) -> Result<Vec<Coord>> {
        let num_points = self.read_count(order, dims.size() * 8)?;
        let mut coords = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            coords.push(self.read_coord(order, dims)?);
        }
        Ok(coords)
    }

    /// Reads `count` nested geometries, each a complete WKB body, checking
    /// that every child has the expected kind and the parent's dimensions.
    fn read_children<T: WkbBody>(&mut self, order: Endianness, dims: Dimensions) -> Result<Vec<T>> {
        // a nested body is at least a byte order byte and a type code
        let count = self.read_count(order, 5)?;
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = self.cursor.position();
            let child = self.read_geometry()?;
            if child.dimensions() != dims {
                return Err(Error::decode(
                    Stage::TypeCode,
                    offset,
                    ErrorKind::InconsistentDimensionality {
                        expected: dims,
                        found: child.dimensions(),
                    },
                ));
            }
            let found = child.kind();
            let child = T::from_geometry(child).ok_or_else(|| {
                Error::decode(
                    Stage::TypeCode,
                    offset,
                    ErrorKind::UnexpectedGeometryType {
                        expected: T::KIND,
                        found,
                    },
                )
            })?;
            children.push(child);
        }
        Ok(children)
    }
}

// Reading and writing of the part of a WKB geometry that follows the byte
// order byte and the type code.
trait WkbBody: Sized {
    const KIND: GeometryKind;

    fn read_body(r: &mut Reader<'_, '_>, order: Endianness, dims: Dimensions) -> Result<Self>;
    fn write_body(&self, w: &mut ByteWriter, options: &EncodeOptions);
    fn dimensions(&self) -> Dimensions;
    fn from_geometry(geometry: Geometry) -> Option<Self>;

    fn geometry_type(&self) -> GeometryType {
        GeometryType::new(Self::KIND, self.dimensions())
    }
}

impl WkbBody for Point {
    const KIND: GeometryKind = GeometryKind::Point;

    fn read_body(r: &mut Reader<'_, '_>, order: Endianness, dims: Dimensions) -> Result<Self> {
        Ok(Point {
            dimensions: dims,
            coord: r.read_coord(order, dims)?,
        })
    }

    fn write_body(&self, w: &mut ByteWriter, options: &EncodeOptions) {
        write_coord(w, options.byte_order, self.dimensions, &self.coord);
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn from_geometry(geometry: Geometry) -> Option<Self> {
        match geometry {
            Geometry::Point(g) => Some(g),
            _ => None,
        }
    }
}

impl WkbBody for LineString {
    const KIND: GeometryKind = GeometryKind::LineString;

    fn read_body(r: &mut Reader<'_, '_>, order: Endianness, dims: Dimensions) -> Result<Self> {
        Ok(LineString {
            dimensions: dims,
            coords: r.read_coords(order, dims)?,
        })
    }

    fn write_body(&self, w: &mut ByteWriter, options: &EncodeOptions) {
        write_coords(w, options.byte_order, self.dimensions, &self.coords);
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn from_geometry(geometry: Geometry) -> Option<Self> {
        match geometry {
            Geometry::LineString(g) => Some(g),
            _ => None,
        }
    }
}

impl WkbBody for Polygon {
    const KIND: GeometryKind = GeometryKind::Polygon;

    fn read_body(r: &mut Reader<'_, '_>, order: Endianness, dims: Dimensions) -> Result<Self> {
        // every ring carries at least its own point count
        let num_rings = r.read_count(order, 4)?;
        let mut rings = Vec::with_capacity(num_rings);
        for index in 0..num_rings {
            let offset = r.cursor.position();
            let ring = r.read_coords(order, dims)?;
            if r.options.strict {
                check_ring_closed(index, &ring)
                    .map_err(|kind| Error::decode(Stage::Coordinate, offset, kind))?;
            }
            rings.push(ring);
        }
        Ok(Polygon {
            dimensions: dims,
            rings,
        })
    }

    fn write_body(&self, w: &mut ByteWriter, options: &EncodeOptions) {
        w.write_u32(options.byte_order, self.rings.len() as u32);
        for ring in &self.rings {
            write_coords(w, options.byte_order, self.dimensions, ring);
        }
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn from_geometry(geometry: Geometry) -> Option<Self> {
        match geometry {
            Geometry::Polygon(g) => Some(g),
            _ => None,
        }
    }
}

// the multi types and the collection only differ in their child type
// and field name, so the body impls are generated
macro_rules! wkb_collection_body {
    ($t:ident, $field:ident, $child:ty) => {
        impl WkbBody for $t {
            const KIND: GeometryKind = GeometryKind::$t;

            fn read_body(
                r: &mut Reader<'_, '_>,
                order: Endianness,
                dims: Dimensions,
            ) -> Result<Self> {
                Ok($t {
                    dimensions: dims,
                    $field: r.read_children::<$child>(order, dims)?,
                })
            }

            fn write_body(&self, w: &mut ByteWriter, options: &EncodeOptions) {
                w.write_u32(options.byte_order, self.$field.len() as u32);
                for child in &self.$field {
                    write_full(w, child, options);
                }
            }

            fn dimensions(&self) -> Dimensions {
                self.dimensions
            }

            fn from_geometry(geometry: Geometry) -> Option<Self> {
                match geometry {
                    Geometry::$t(g) => Some(g),
                    _ => None,
                }
            }
        }
    };
}

wkb_collection_body!(MultiPoint, points, Point);
wkb_collection_body!(MultiLineString, line_strings, LineString);
wkb_collection_body!(MultiPolygon, polygons, Polygon);
wkb_collection_body!(GeometryCollection, geometries, Geometry);

// children of a collection, which report their own kind when written
impl WkbBody for Geometry {
    const KIND: GeometryKind = GeometryKind::GeometryCollection;

    fn read_body(r: &mut Reader<'_, '_>, order: Endianness, dims: Dimensions) -> Result<Self> {
        Ok(GeometryCollection::read_body(r, order, dims)?.into())
    }

    fn write_body(&self, w: &mut ByteWriter, options: &EncodeOptions) {
        match self {
            Geometry::Point(g) => g.write_body(w, options),
            Geometry::LineString(g) => g.write_body(w, options),
            Geometry::Polygon(g) => g.write_body(w, options),
            Geometry::MultiPoint(g) => g.write_body(w, options),
            Geometry::MultiLineString(g) => g.write_body(w, options),
            Geometry::MultiPolygon(g) => g.write_body(w, options),
            Geometry::GeometryCollection(g) => g.write_body(w, options),
        }
    }

    fn dimensions(&self) -> Dimensions {
        Geometry::dimensions(self)
    }

    fn from_geometry(geometry: Geometry) -> Option<Self> {
        Some(geometry)
    }

    fn geometry_type(&self) -> GeometryType {
        Geometry::geometry_type(self)
    }
}

/// Write a complete geometry without validating it first.
pub(crate) fn write_geometry(w: &mut ByteWriter, geometry: &Geometry, options: &EncodeOptions) {
    write_full(w, geometry, options);
}

fn write_full<T: WkbBody>(w: &mut ByteWriter, geometry: &T, options: &EncodeOptions) {
    write_header(w, geometry.geometry_type(), options);
    geometry.write_body(w, options);
}

fn write_header(w: &mut ByteWriter, geometry_type: GeometryType, options: &EncodeOptions) {
    w.write_u8(options.byte_order.wkb_byte());
    let code = match options.flavor {
        WkbFlavor::Iso => geometry_type.wkb_id(),
        WkbFlavor::Extended => geometry_type.ewkb_id(),
    };
    w.write_u32(options.byte_order, code);
}

fn write_coord(w: &mut ByteWriter, order: Endianness, dims: Dimensions, coord: &Coord) {
    w.write_f64(order, coord.x);
    w.write_f64(order, coord.y);
    if dims.has_z() {
        w.write_f64(order, coord.z.unwrap_or(f64::NAN));
    }
    if dims.has_m() {
        w.write_f64(order, coord.m.unwrap_or(f64::NAN));
    }
}

fn write_coords(w: &mut ByteWriter, order: Endianness, dims: Dimensions, coords: &[Coord]) {
    w.write_u32(order, coords.len() as u32);
    for coord in coords {
        write_coord(w, order, dims, coord);
    }
}

/// Exact encoded size of a geometry in bytes.
pub(crate) fn encoded_len(geometry: &Geometry) -> usize {
    let coord_len = geometry.dimensions().size() * 8;
    let body = match geometry {
        Geometry::Point(_) => coord_len,
        Geometry::LineString(ls) => 4 + ls.coords.len() * coord_len,
        Geometry::Polygon(poly) => polygon_len(poly, coord_len),
        Geometry::MultiPoint(mp) => 4 + mp.points.len() * (5 + coord_len),
        Geometry::MultiLineString(mls) => {
            4 + mls
                .line_strings
                .iter()
                .map(|ls| 5 + 4 + ls.coords.len() * coord_len)
                .sum::<usize>()
        }
        Geometry::MultiPolygon(mp) => {
            4 + mp
                .polygons
                .iter()
                .map(|poly| 5 + polygon_len(poly, coord_len))
                .sum::<usize>()
        }
        Geometry::GeometryCollection(gc) => {
            4 + gc.geometries.iter().map(encoded_len).sum::<usize>()
        }
    };
    5 + body
}

fn polygon_len(poly: &Polygon, coord_len: usize) -> usize {
    4 + poly
        .rings
        .iter()
        .map(|ring| 4 + ring.len() * coord_len)
        .sum::<usize>()
}
