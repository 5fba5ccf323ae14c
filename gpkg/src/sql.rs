//! rusqlite bindings for GeoPackage geometry BLOB columns

use crate::cursor::Endianness;
use crate::gpkg_wkb::{
    decode_geopackage, decode_header, encode_geopackage, GeoPackageHeader, SpatialGeometry,
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;

impl ToSql for SpatialGeometry {
    #[inline]
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        // GeoPackage writers conventionally use little endian
        let blob = encode_geopackage(self, Endianness::Little)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        Ok(ToSqlOutput::from(blob))
    }
}

macro_rules! impl_gpkg_from_sql {
    ($($t:ty => $decode:expr),*) => {
       $(
            impl FromSql for $t {
                #[inline]
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    let blob = value.as_blob()?;
                    $decode(blob).map_err(|e| FromSqlError::Other(Box::new(e)))
                }
            }
       )*
    };
}

impl_gpkg_from_sql! {
    SpatialGeometry => decode_geopackage,
    GeoPackageHeader => |blob| decode_header(blob).map(|(header, _)| header)
}
