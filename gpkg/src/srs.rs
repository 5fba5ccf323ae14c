//! Well known SRID values, as they appear in the GeoPackage
//! [specification](https://www.geopackage.org/spec130/#gpkg_spatial_ref_sys_cols)
//!
//! SRIDs are carried through the codec as opaque `i32` values.

/// "undefined geographic SRS"
pub const UNDEFINED_GEOGRAPHIC: i32 = 0;
/// "undefined cartesian SRS"
pub const UNDEFINED_CARTESIAN: i32 = -1;
/// WGS 84 geodetic, EPSG:4326
pub const WGS84: i32 = 4326;

/// True for the two SRIDs every GeoPackage reserves for an unknown reference system.
pub fn is_undefined(srid: i32) -> bool {
    srid == UNDEFINED_GEOGRAPHIC || srid == UNDEFINED_CARTESIAN
}
