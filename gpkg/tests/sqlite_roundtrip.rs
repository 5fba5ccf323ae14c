#![cfg(feature = "rusqlite")]

use gpkg_geometry::*;
use rusqlite::{params, Connection};
use tempfile::tempdir;

fn features() -> Vec<SpatialGeometry> {
    let road: Geometry = LineString::new(vec![
        Coord::xyz(-105.0, 40.0, 1600.0),
        Coord::xyz(-105.1, 40.2, 1650.0),
        Coord::xyz(-105.3, 40.3, 1700.0),
    ])
    .into();
    let parcel: Geometry = MultiPolygon::new(vec![Polygon::new(vec![
        vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(10.0, 0.0),
            Coord::xy(10.0, 10.0),
            Coord::xy(0.0, 0.0),
        ],
        vec![
            Coord::xy(1.0, 1.0),
            Coord::xy(2.0, 1.0),
            Coord::xy(2.0, 2.0),
            Coord::xy(1.0, 1.0),
        ],
    ])])
    .into();
    vec![
        SpatialGeometry::new(srs::WGS84, road).with_computed_envelope(),
        SpatialGeometry::new(srs::UNDEFINED_CARTESIAN, parcel),
        SpatialGeometry::empty(srs::WGS84),
    ]
}

#[test]
fn file_backed_geometry_column() {
    let dir = tempdir().unwrap();
    let filename = dir.path().join("roundtrip.gpkg");

    let conn = Connection::open(&filename).unwrap();
    conn.execute(
        "CREATE TABLE roads (fid INTEGER PRIMARY KEY AUTOINCREMENT, geom BLOB)",
        [],
    )
    .unwrap();
    for sg in features() {
        conn.execute("INSERT INTO roads (geom) VALUES (?1)", params![sg])
            .unwrap();
    }
    conn.close().unwrap();

    let conn = Connection::open(&filename).unwrap();
    let mut stmt = conn.prepare("SELECT geom FROM roads ORDER BY fid").unwrap();
    let read: Vec<SpatialGeometry> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(read, features());
    assert!(read[2].is_empty());
}

#[test]
fn envelope_filter_without_decoding_bodies() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute("CREATE TABLE pts (fid INTEGER PRIMARY KEY, geom BLOB)", [])
        .unwrap();
    for (x, y) in [(-105.0, 40.0), (2.0, 48.0), (151.0, -33.0)] {
        let sg = SpatialGeometry::new(srs::WGS84, Point::new(Coord::xy(x, y)).into())
            .with_computed_envelope();
        conn.execute("INSERT INTO pts (geom) VALUES (?1)", params![sg])
            .unwrap();
    }

    let mut stmt = conn.prepare("SELECT fid, geom FROM pts").unwrap();
    let headers: Vec<(i64, GeoPackageHeader)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    let northern: Vec<i64> = headers
        .iter()
        .filter(|(_, h)| h.envelope.map_or(false, |e| e.min_y > 0.0))
        .map(|(fid, _)| *fid)
        .collect();
    assert_eq!(northern, vec![1, 2]);
}

#[test]
fn blob_written_elsewhere() {
    // big endian header with an XY envelope and a little endian body
    let mut blob = vec![0x47, 0x50, 0x00, 0b0000_0010];
    blob.extend(4326i32.to_be_bytes());
    for v in [1.0f64, 1.0, 2.0, 2.0] {
        blob.extend(v.to_be_bytes());
    }
    blob.push(0x01);
    blob.extend(1u32.to_le_bytes());
    blob.extend(1.0f64.to_le_bytes());
    blob.extend(2.0f64.to_le_bytes());

    let conn = Connection::open_in_memory().unwrap();
    let sg: SpatialGeometry = conn
        .query_row("SELECT ?1", params![blob], |row| row.get(0))
        .unwrap();
    assert_eq!(sg.srid, 4326);
    assert_eq!(sg.envelope, Some(Envelope::xy(1.0, 1.0, 2.0, 2.0)));
    assert_eq!(
        sg.geometry(),
        Some(&Geometry::from(Point::new(Coord::xy(1.0, 2.0))))
    );
}
