use serde::{Deserialize, Serialize};

/// `[lon, lat]` or `[lon, lat, alt]`.
pub type Position = Vec<f64>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VectorGeometryKind {
    Point,
    Line,
    Area,
}

/// GeoJSON geometry of a hit feature, as reported by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum VectorGeometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl VectorGeometry {
    pub fn kind(&self) -> VectorGeometryKind {
        match self {
            VectorGeometry::Point(_) | VectorGeometry::MultiPoint(_) => VectorGeometryKind::Point,
            VectorGeometry::LineString(_) | VectorGeometry::MultiLineString(_) => {
                VectorGeometryKind::Line
            }
            VectorGeometry::Polygon(_) | VectorGeometry::MultiPolygon(_) => VectorGeometryKind::Area,
        }
    }

    /// First vertex of the geometry, if any.
    pub fn first_position(&self) -> Option<&Position> {
        match self {
            VectorGeometry::Point(p) => Some(p),
            VectorGeometry::MultiPoint(ps) | VectorGeometry::LineString(ps) => ps.first(),
            VectorGeometry::MultiLineString(rings) | VectorGeometry::Polygon(rings) => {
                rings.first().and_then(|r| r.first())
            }
            VectorGeometry::MultiPolygon(polys) => polys
                .first()
                .and_then(|rings| rings.first())
                .and_then(|r| r.first()),
        }
    }
}
