//! Conversions to and from [geo_types] geometries.
//!
//! geo-types only models XY, so Z and M are dropped when converting to it.
//! Note that `geo_types::Polygon::new` closes rings that are open.

use crate::types::*;

fn coord_from_geo(c: &geo_types::Coord<f64>) -> Coord {
    Coord::xy(c.x, c.y)
}

fn coord_to_geo(c: &Coord) -> geo_types::Coord<f64> {
    geo_types::Coord { x: c.x, y: c.y }
}

fn coords_from_geo(ls: &geo_types::LineString<f64>) -> Vec<Coord> {
    ls.0.iter().map(coord_from_geo).collect()
}

fn line_string_to_geo(coords: &[Coord]) -> geo_types::LineString<f64> {
    geo_types::LineString(coords.iter().map(coord_to_geo).collect())
}

impl From<&geo_types::Point<f64>> for Point {
    fn from(p: &geo_types::Point<f64>) -> Self {
        Point::new(coord_from_geo(&p.0))
    }
}

impl From<&geo_types::LineString<f64>> for LineString {
    fn from(ls: &geo_types::LineString<f64>) -> Self {
        LineString {
            dimensions: Dimensions::Xy,
            coords: coords_from_geo(ls),
        }
    }
}

impl From<&geo_types::Polygon<f64>> for Polygon {
    fn from(poly: &geo_types::Polygon<f64>) -> Self {
        let mut rings = Vec::with_capacity(1 + poly.interiors().len());
        if !poly.exterior().0.is_empty() || !poly.interiors().is_empty() {
            rings.push(coords_from_geo(poly.exterior()));
        }
        rings.extend(poly.interiors().iter().map(coords_from_geo));
        Polygon {
            dimensions: Dimensions::Xy,
            rings,
        }
    }
}

impl From<&geo_types::Geometry<f64>> for Geometry {
    fn from(geom: &geo_types::Geometry<f64>) -> Self {
        use geo_types::Geometry as G;
        match geom {
            G::Point(p) => Point::from(p).into(),
            G::Line(l) => LineString {
                dimensions: Dimensions::Xy,
                coords: vec![coord_from_geo(&l.start), coord_from_geo(&l.end)],
            }
            .into(),
            G::LineString(ls) => LineString::from(ls).into(),
            G::Polygon(poly) => Polygon::from(poly).into(),
            G::MultiPoint(mp) => MultiPoint {
                dimensions: Dimensions::Xy,
                points: mp.0.iter().map(Point::from).collect(),
            }
            .into(),
            G::MultiLineString(mls) => MultiLineString {
                dimensions: Dimensions::Xy,
                line_strings: mls.0.iter().map(LineString::from).collect(),
            }
            .into(),
            G::MultiPolygon(mp) => MultiPolygon {
                dimensions: Dimensions::Xy,
                polygons: mp.0.iter().map(Polygon::from).collect(),
            }
            .into(),
            G::GeometryCollection(gc) => GeometryCollection {
                dimensions: Dimensions::Xy,
                geometries: gc.0.iter().map(Geometry::from).collect(),
            }
            .into(),
            G::Rect(r) => Polygon::from(&r.to_polygon()).into(),
            G::Triangle(t) => Polygon::from(&t.to_polygon()).into(),
        }
    }
}

fn polygon_to_geo(poly: &Polygon) -> geo_types::Polygon<f64> {
    let exterior = poly
        .exterior()
        .map(line_string_to_geo)
        .unwrap_or_else(|| geo_types::LineString(vec![]));
    let interiors = poly.interiors().iter().map(|r| line_string_to_geo(r)).collect();
    geo_types::Polygon::new(exterior, interiors)
}

impl From<&Geometry> for geo_types::Geometry<f64> {
    fn from(geom: &Geometry) -> Self {
        match geom {
            Geometry::Point(p) => geo_types::Point(coord_to_geo(&p.coord)).into(),
            Geometry::LineString(ls) => line_string_to_geo(&ls.coords).into(),
            Geometry::Polygon(poly) => polygon_to_geo(poly).into(),
            Geometry::MultiPoint(mp) => geo_types::MultiPoint(
                mp.points
                    .iter()
                    .map(|p| geo_types::Point(coord_to_geo(&p.coord)))
                    .collect(),
            )
            .into(),
            Geometry::MultiLineString(mls) => geo_types::MultiLineString(
                mls.line_strings
                    .iter()
                    .map(|ls| line_string_to_geo(&ls.coords))
                    .collect(),
            )
            .into(),
            Geometry::MultiPolygon(mp) => {
                geo_types::MultiPolygon(mp.polygons.iter().map(polygon_to_geo).collect()).into()
            }
            Geometry::GeometryCollection(gc) => {
                geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(
                    gc.geometries.iter().map(geo_types::Geometry::from).collect(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endianness;
    use crate::wkb::{decode_wkb, encode_wkb};
    use geo_types::{coord, line_string, point, polygon, Rect};

    #[test]
    fn from_geo_types() {
        let geo: geo_types::Geometry<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 0.0)
        ]
        .into();
        let converted = Geometry::from(&geo);
        assert_eq!(converted.geometry_type().wkb_id(), 3);
        match &converted {
            Geometry::Polygon(p) => {
                assert_eq!(p.rings.len(), 1);
                assert_eq!(p.rings[0][2], Coord::xy(4.0, 4.0));
            }
            other => panic!("expected a polygon, got {:?}", other),
        }
        assert_eq!(geo_types::Geometry::from(&converted), geo);
    }

    #[test]
    fn line_rect_and_triangle() {
        let line: geo_types::Geometry<f64> =
            geo_types::Line::new(coord! { x: 1.0, y: 2.0 }, coord! { x: 3.0, y: 4.0 }).into();
        assert_eq!(
            Geometry::from(&line),
            Geometry::from(LineString::new(vec![Coord::xy(1.0, 2.0), Coord::xy(3.0, 4.0)]))
        );

        let rect: geo_types::Geometry<f64> =
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 1.0 }).into();
        match Geometry::from(&rect) {
            Geometry::Polygon(p) => {
                let ring = p.exterior().unwrap();
                assert_eq!(ring.len(), 5);
                assert_eq!(ring.first(), ring.last());
            }
            other => panic!("expected a polygon, got {:?}", other),
        }

        let triangle: geo_types::Geometry<f64> = geo_types::Triangle::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
        )
        .into();
        match Geometry::from(&triangle) {
            Geometry::Polygon(p) => assert_eq!(p.exterior().map(<[Coord]>::len), Some(4)),
            other => panic!("expected a polygon, got {:?}", other),
        }
    }

    #[test]
    fn z_and_m_are_dropped() {
        let point: Geometry = Point::new(Coord::xyzm(1.0, 2.0, 3.0, 4.0)).into();
        assert_eq!(
            geo_types::Geometry::from(&point),
            geo_types::Geometry::Point(point!(x: 1.0, y: 2.0))
        );
    }

    #[test]
    fn through_wkb() {
        let geo = geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(vec![
            point!(x: -105.0, y: 40.0).into(),
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
        ]));
        let bytes = encode_wkb(&Geometry::from(&geo), Endianness::Big).unwrap();
        let decoded = decode_wkb(&bytes).unwrap();
        assert_eq!(geo_types::Geometry::from(&decoded), geo);
    }

    #[test]
    fn empty_polygon() {
        let empty = Polygon::empty(Dimensions::Xy);
        let geo = geo_types::Geometry::from(&Geometry::from(empty.clone()));
        assert_eq!(Geometry::from(&geo), Geometry::from(empty));
    }
}
