use crate::result::ErrorKind;
use std::fmt;

/// Which ordinates beyond X and Y a coordinate carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimensions {
    #[default]
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimensions {
    pub fn new(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimensions::Xy,
            (true, false) => Dimensions::Xyz,
            (false, true) => Dimensions::Xym,
            (true, true) => Dimensions::Xyzm,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimensions::Xyz | Dimensions::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Dimensions::Xym | Dimensions::Xyzm)
    }

    /// Number of doubles in one coordinate tuple
    pub fn size(self) -> usize {
        2 + self.has_z() as usize + self.has_m() as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimensions::Xy => "XY",
            Dimensions::Xyz => "XYZ",
            Dimensions::Xym => "XYM",
            Dimensions::Xyzm => "XYZM",
        };
        f.write_str(name)
    }
}

/// The base geometry kind of a WKB type code, without dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    /// Parses the kind component of a WKB type code (1 for Point...7 for GeometryCollection).
    pub fn from_wkb_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(GeometryKind::Point),
            2 => Some(GeometryKind::LineString),
            3 => Some(GeometryKind::Polygon),
            4 => Some(GeometryKind::MultiPoint),
            5 => Some(GeometryKind::MultiLineString),
            6 => Some(GeometryKind::MultiPolygon),
            7 => Some(GeometryKind::GeometryCollection),
            _ => None,
        }
    }

    pub fn wkb_id(self) -> u32 {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
            GeometryKind::MultiPoint => 4,
            GeometryKind::MultiLineString => 5,
            GeometryKind::MultiPolygon => 6,
            GeometryKind::GeometryCollection => 7,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        };
        f.write_str(name)
    }
}

/// A geometry kind together with its dimensions, i.e. everything a WKB type code says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryType {
    pub kind: GeometryKind,
    pub dimensions: Dimensions,
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimensions {
            Dimensions::Xy => write!(f, "{}", self.kind),
            Dimensions::Xyz => write!(f, "{} Z", self.kind),
            Dimensions::Xym => write!(f, "{} M", self.kind),
            Dimensions::Xyzm => write!(f, "{} ZM", self.kind),
        }
    }
}

pub(crate) const EWKB_Z_FLAG: u32 = 0x8000_0000;
pub(crate) const EWKB_M_FLAG: u32 = 0x4000_0000;
pub(crate) const EWKB_SRID_FLAG: u32 = 0x2000_0000;

impl GeometryType {
    pub fn new(kind: GeometryKind, dimensions: Dimensions) -> Self {
        GeometryType { kind, dimensions }
    }

    /// ISO type code, e.g. 1001 for a Point Z
    pub fn wkb_id(self) -> u32 {
        let offset = match self.dimensions {
            Dimensions::Xy => 0,
            Dimensions::Xyz => 1000,
            Dimensions::Xym => 2000,
            Dimensions::Xyzm => 3000,
        };
        offset + self.kind.wkb_id()
    }

    /// PostGIS EWKB type code, e.g. 0x80000001 for a Point Z
    pub fn ewkb_id(self) -> u32 {
        let mut code = self.kind.wkb_id();
        if self.dimensions.has_z() {
            code |= EWKB_Z_FLAG;
        }
        if self.dimensions.has_m() {
            code |= EWKB_M_FLAG;
        }
        code
    }
}

/// A single coordinate tuple
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Coord {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Coord {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Coord {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    pub fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Coord {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.z.is_some(), self.m.is_some())
    }

    // bitwise so that NaN ordinates (empty points) still compare equal
    fn same_position(&self, other: &Coord) -> bool {
        fn same(a: Option<f64>, b: Option<f64>) -> bool {
            a.map(f64::to_bits) == b.map(f64::to_bits)
        }
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && same(self.z, other.z)
            && same(self.m, other.m)
    }
}

fn dimensions_of(coords: &[Coord]) -> Dimensions {
    coords.first().map(Coord::dimensions).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub dimensions: Dimensions,
    pub coord: Coord,
}

impl Point {
    pub fn new(coord: Coord) -> Self {
        Point {
            dimensions: coord.dimensions(),
            coord,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub dimensions: Dimensions,
    pub coords: Vec<Coord>,
}

impl LineString {
    /// Dimensions are taken from the first coordinate, XY when there is none.
    pub fn new(coords: Vec<Coord>) -> Self {
        LineString {
            dimensions: dimensions_of(&coords),
            coords,
        }
    }

    pub fn empty(dimensions: Dimensions) -> Self {
        LineString {
            dimensions,
            coords: Vec::new(),
        }
    }
}

/// A polygon as a list of rings, the first being the exterior
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub dimensions: Dimensions,
    pub rings: Vec<Vec<Coord>>,
}

impl Polygon {
    pub fn new(rings: Vec<Vec<Coord>>) -> Self {
        let dimensions = rings
            .iter()
            .find(|ring| !ring.is_empty())
            .map(|ring| dimensions_of(ring))
            .unwrap_or_default();
        Polygon { dimensions, rings }
    }

    pub fn empty(dimensions: Dimensions) -> Self {
        Polygon {
            dimensions,
            rings: Vec::new(),
        }
    }

    pub fn exterior(&self) -> Option<&[Coord]> {
        self.rings.first().map(Vec::as_slice)
    }

    pub fn interiors(&self) -> &[Vec<Coord>] {
        self.rings.get(1..).unwrap_or_default()
    }
}

// the multi types and collections all share the same shape: a dimensions tag
// and a list of children that carry their own dimensions
macro_rules! multi_geometry {
    ($(#[$meta:meta])* $name:ident, $field:ident, $child:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            pub dimensions: Dimensions,
            pub $field: Vec<$child>,
        }

        impl $name {
            /// Dimensions are taken from the first child, XY when there is none.
            pub fn new($field: Vec<$child>) -> Self {
                $name {
                    dimensions: $field.first().map(|g| g.dimensions()).unwrap_or_default(),
                    $field,
                }
            }

            pub fn empty(dimensions: Dimensions) -> Self {
                $name {
                    dimensions,
                    $field: Vec::new(),
                }
            }
        }
    };
}

multi_geometry!(MultiPoint, points, Point);
multi_geometry!(MultiLineString, line_strings, LineString);
multi_geometry!(MultiPolygon, polygons, Polygon);
multi_geometry!(
    /// A heterogeneous list of geometries
    GeometryCollection,
    geometries,
    Geometry
);

// lets the multi_geometry! constructors ask any child for its dimensions
trait HasDimensions {
    fn dimensions(&self) -> Dimensions;
}

macro_rules! has_dimensions {
    ($($t:ty),*) => {
        $(
            impl HasDimensions for $t {
                fn dimensions(&self) -> Dimensions {
                    self.dimensions
                }
            }
        )*
    };
}

has_dimensions!(Point, LineString, Polygon);

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        match self {
            Geometry::Point(g) => g.dimensions,
            Geometry::LineString(g) => g.dimensions,
            Geometry::Polygon(g) => g.dimensions,
            Geometry::MultiPoint(g) => g.dimensions,
            Geometry::MultiLineString(g) => g.dimensions,
            Geometry::MultiPolygon(g) => g.dimensions,
            Geometry::GeometryCollection(g) => g.dimensions,
        }
    }

    pub fn geometry_type(&self) -> GeometryType {
        GeometryType::new(self.kind(), self.dimensions())
    }

    /// An empty geometry of the given kind. Points are empty when their
    /// ordinates are NaN.
    pub fn empty(geometry_type: GeometryType) -> Geometry {
        let dims = geometry_type.dimensions;
        match geometry_type.kind {
            GeometryKind::Point => {
                let nan = |present: bool| present.then_some(f64::NAN);
                Point {
                    dimensions: dims,
                    coord: Coord {
                        x: f64::NAN,
                        y: f64::NAN,
                        z: nan(dims.has_z()),
                        m: nan(dims.has_m()),
                    },
                }
                .into()
            }
            GeometryKind::LineString => LineString::empty(dims).into(),
            GeometryKind::Polygon => Polygon::empty(dims).into(),
            GeometryKind::MultiPoint => MultiPoint::empty(dims).into(),
            GeometryKind::MultiLineString => MultiLineString::empty(dims).into(),
            GeometryKind::MultiPolygon => MultiPolygon::empty(dims).into(),
            GeometryKind::GeometryCollection => GeometryCollection::empty(dims).into(),
        }
    }

    /// True when the geometry holds no coordinates. A point whose ordinates
    /// are all NaN counts as empty, following the usual WKB convention.
    pub fn is_empty(&self) -> bool {
        let mut empty = true;
        self.for_each_coord(&mut |c| {
            if !(c.x.is_nan() && c.y.is_nan()) {
                empty = false;
            }
        });
        empty
    }

    fn for_each_coord(&self, f: &mut impl FnMut(&Coord)) {
        match self {
            Geometry::Point(p) => f(&p.coord),
            Geometry::LineString(ls) => ls.coords.iter().for_each(f),
            Geometry::Polygon(poly) => poly.rings.iter().flatten().for_each(f),
            Geometry::MultiPoint(mp) => mp.points.iter().for_each(|p| f(&p.coord)),
            Geometry::MultiLineString(mls) => mls
                .line_strings
                .iter()
                .flat_map(|ls| ls.coords.iter())
                .for_each(f),
            Geometry::MultiPolygon(mp) => mp
                .polygons
                .iter()
                .flat_map(|poly| poly.rings.iter().flatten())
                .for_each(f),
            Geometry::GeometryCollection(gc) => {
                for g in &gc.geometries {
                    g.for_each_coord(f);
                }
            }
        }
    }

    /// Bounding box over all coordinates, skipping NaN ordinates.
    ///
    /// Z and M ranges are included when the geometry has those dimensions, so
    /// the envelope type always follows [Geometry::dimensions]. A range with no
    /// finite value is `(NaN, NaN)`. Returns `None` when there is no coordinate
    /// with finite X and Y.
    pub fn envelope(&self) -> Option<Envelope> {
        let dims = self.dimensions();
        let mut envelope: Option<Envelope> = None;
        self.for_each_coord(&mut |c| {
            if c.x.is_nan() || c.y.is_nan() {
                return;
            }
            let env = envelope.get_or_insert(Envelope {
                min_x: c.x,
                max_x: c.x,
                min_y: c.y,
                max_y: c.y,
                z: None,
                m: None,
            });
            env.min_x = env.min_x.min(c.x);
            env.max_x = env.max_x.max(c.x);
            env.min_y = env.min_y.min(c.y);
            env.max_y = env.max_y.max(c.y);
            if dims.has_z() {
                env.z = extend_range(env.z, c.z);
            }
            if dims.has_m() {
                env.m = extend_range(env.m, c.m);
            }
        });
        envelope.map(|mut env| {
            if dims.has_z() {
                env.z = env.z.or(Some((f64::NAN, f64::NAN)));
            }
            if dims.has_m() {
                env.m = env.m.or(Some((f64::NAN, f64::NAN)));
            }
            env
        })
    }

    /// Checks that every coordinate and child shares the root's dimensions and,
    /// when `strict` is set, that every non-empty polygon ring is closed.
    pub fn validate(&self, strict: bool) -> Result<(), ErrorKind> {
        self.validate_as(self.dimensions(), strict)
    }

    fn validate_as(&self, expected: Dimensions, strict: bool) -> Result<(), ErrorKind> {
        check_dimensions(expected, self.dimensions())?;
        match self {
            Geometry::Point(p) => check_dimensions(expected, p.coord.dimensions()),
            Geometry::LineString(ls) => check_coords(expected, &ls.coords),
            Geometry::Polygon(poly) => check_polygon(expected, poly, strict),
            Geometry::MultiPoint(mp) => mp.points.iter().try_for_each(|p| {
                check_dimensions(expected, p.dimensions)?;
                check_dimensions(expected, p.coord.dimensions())
            }),
            Geometry::MultiLineString(mls) => mls.line_strings.iter().try_for_each(|ls| {
                check_dimensions(expected, ls.dimensions)?;
                check_coords(expected, &ls.coords)
            }),
            Geometry::MultiPolygon(mp) => mp
                .polygons
                .iter()
                .try_for_each(|poly| check_polygon(expected, poly, strict)),
            Geometry::GeometryCollection(gc) => gc
                .geometries
                .iter()
                .try_for_each(|g| g.validate_as(expected, strict)),
        }
    }
}

fn extend_range(range: Option<(f64, f64)>, value: Option<f64>) -> Option<(f64, f64)> {
    match (range, value) {
        (range, None) => range,
        (range, Some(v)) if v.is_nan() => range,
        (None, Some(v)) => Some((v, v)),
        (Some((lo, hi)), Some(v)) => Some((lo.min(v), hi.max(v))),
    }
}

fn check_dimensions(expected: Dimensions, found: Dimensions) -> Result<(), ErrorKind> {
    if expected == found {
        Ok(())
    } else {
        Err(ErrorKind::InconsistentDimensionality { expected, found })
    }
}

fn check_coords(expected: Dimensions, coords: &[Coord]) -> Result<(), ErrorKind> {
    coords
        .iter()
        .try_for_each(|c| check_dimensions(expected, c.dimensions()))
}

pub(crate) fn check_ring_closed(index: usize, ring: &[Coord]) -> Result<(), ErrorKind> {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if !first.same_position(last) => {
            Err(ErrorKind::RingNotClosed { ring: index })
        }
        _ => Ok(()),
    }
}

fn check_polygon(expected: Dimensions, poly: &Polygon, strict: bool) -> Result<(), ErrorKind> {
    check_dimensions(expected, poly.dimensions)?;
    for (index, ring) in poly.rings.iter().enumerate() {
        check_coords(expected, ring)?;
        if strict {
            check_ring_closed(index, ring)?;
        }
    }
    Ok(())
}

macro_rules! impl_into_geometry {
    ($($t:ident),*) => {
        $(
            impl From<$t> for Geometry {
                fn from(g: $t) -> Self {
                    Geometry::$t(g)
                }
            }
        )*
    };
}

impl_into_geometry!(
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection
);

/// Which ranges a GeoPackage envelope carries, bits 1-3 of the header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeType {
    Missing,
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl EnvelopeType {
    pub fn from_indicator(indicator: u8) -> Option<Self> {
        match indicator {
            0 => Some(EnvelopeType::Missing),
            1 => Some(EnvelopeType::Xy),
            2 => Some(EnvelopeType::Xyz),
            3 => Some(EnvelopeType::Xym),
            4 => Some(EnvelopeType::Xyzm),
            _ => None,
        }
    }

    pub fn indicator(self) -> u8 {
        match self {
            EnvelopeType::Missing => 0,
            EnvelopeType::Xy => 1,
            EnvelopeType::Xyz => 2,
            EnvelopeType::Xym => 3,
            EnvelopeType::Xyzm => 4,
        }
    }

    /// Number of doubles stored in the header
    pub fn len(self) -> usize {
        match self {
            EnvelopeType::Missing => 0,
            EnvelopeType::Xy => 4,
            EnvelopeType::Xyz | EnvelopeType::Xym => 6,
            EnvelopeType::Xyzm => 8,
        }
    }

    pub fn is_empty(self) -> bool {
        self == EnvelopeType::Missing
    }
}

/// Axis aligned bounds stored in a GeoPackage header.
///
/// The envelope is advisory, nothing checks it against the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    /// (min, max) of Z
    pub z: Option<(f64, f64)>,
    /// (min, max) of M
    pub m: Option<(f64, f64)>,
}

impl Envelope {
    pub fn xy(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Envelope {
            min_x,
            max_x,
            min_y,
            max_y,
            z: None,
            m: None,
        }
    }

    pub fn envelope_type(&self) -> EnvelopeType {
        match (self.z.is_some(), self.m.is_some()) {
            (false, false) => EnvelopeType::Xy,
            (true, false) => EnvelopeType::Xyz,
            (false, true) => EnvelopeType::Xym,
            (true, true) => EnvelopeType::Xyzm,
        }
    }
}
