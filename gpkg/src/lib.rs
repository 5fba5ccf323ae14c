//! Decoding and encoding of GeoPackage geometry BLOBs.
//!
//! A GeoPackage geometry column stores a small binary header (magic, version,
//! flags, SRID and an optional envelope) followed by an ISO WKB body, see the
//! [encoding section](https://www.geopackage.org/spec130/#gpb_format) of the
//! GeoPackage specification.
//!
//! ```
//! use gpkg_geometry::{
//!     decode_geopackage, encode_geopackage, Coord, Endianness, Point, SpatialGeometry,
//! };
//!
//! let sg = SpatialGeometry::new(4326, Point::new(Coord::xy(-105.0, 40.0)).into())
//!     .with_computed_envelope();
//! let blob = encode_geopackage(&sg, Endianness::Little).unwrap();
//! assert_eq!(decode_geopackage(&blob).unwrap(), sg);
//! ```
//!
//! Plain WKB, including PostGIS EWKB type codes, is handled by [decode_wkb]
//! and [encode_wkb].
mod convert;
pub mod cursor;
pub mod gpkg_wkb;
pub mod options;
pub mod result;
#[cfg(feature = "rusqlite")]
mod sql;
pub mod srs;
pub mod types;
pub mod wkb;

#[doc(inline)]
pub use cursor::Endianness;
#[doc(inline)]
pub use gpkg_wkb::{
    decode_geopackage, decode_geopackage_with, decode_header, decode_header_with,
    encode_geopackage, encode_geopackage_with, GeoPackageHeader, HeaderFlags, SpatialGeometry,
};
pub use options::{DecodeOptions, EncodeOptions, TrailingBytes, VersionPolicy, WkbFlavor};
pub use result::{Error, ErrorKind, Result, Stage};
pub use types::{
    Coord, Dimensions, Envelope, EnvelopeType, Geometry, GeometryCollection, GeometryKind,
    GeometryType, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
#[doc(inline)]
pub use wkb::{decode_wkb, decode_wkb_with, encode_wkb, encode_wkb_with};
