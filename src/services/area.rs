//! Rooftop area from a drawn GeoJSON polygon.
//!
//! The area is geodesic on the WGS84 ellipsoid (Karney's algorithm via
//! `geo::GeodesicArea`), not a planar approximation.

use geo::{GeodesicArea, LineString, Polygon};

use crate::error::PlannerError;
use crate::models::solar::{AreaEstimate, Geometry};

/// Rule-of-thumb panel footprint: 10 m² of roof per kW installed.
const SQUARE_METERS_PER_KW: f64 = 10.0;

/// Relative cross-product tolerance below which three vertices count as collinear.
const COLLINEAR_EPS: f64 = 1e-12;

const DRAW_A_POLYGON: &str = "please draw a polygon";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
    LineString,
    MultiLineString,
    Point,
    MultiPoint,
    Other(String),
}

pub fn classify(geometry: &Geometry) -> GeometryKind {
    match geometry.kind.as_str() {
        "Polygon" => GeometryKind::Polygon,
        "MultiPolygon" => GeometryKind::MultiPolygon,
        "LineString" => GeometryKind::LineString,
        "MultiLineString" => GeometryKind::MultiLineString,
        "Point" => GeometryKind::Point,
        "MultiPoint" => GeometryKind::MultiPoint,
        other => GeometryKind::Other(other.to_string()),
    }
}

pub fn estimate_area(geometry: &Geometry) -> Result<AreaEstimate, PlannerError> {
    let area = geodesic_area(geometry)?;
    Ok(AreaEstimate {
        area_square_meters: area,
        implied_capacity_kw: area / SQUARE_METERS_PER_KW,
    })
}

/// Absolute geodesic area in m². Interior rings are subtracted.
pub fn geodesic_area(geometry: &Geometry) -> Result<f64, PlannerError> {
    Ok(to_polygon(geometry)?.geodesic_area_unsigned())
}

/// Validates a GeoJSON Polygon and converts it to a `geo::Polygon` in (lon, lat) degrees.
fn to_polygon(geometry: &Geometry) -> Result<Polygon<f64>, PlannerError> {
    let kind = classify(geometry);
    if kind != GeometryKind::Polygon {
        return Err(PlannerError::InvalidGeometry(format!(
            "{DRAW_A_POLYGON} (got {})",
            geometry.kind
        )));
    }

    let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(geometry.coordinates.clone())
        .map_err(|e| PlannerError::InvalidGeometry(format!("{DRAW_A_POLYGON}: {e}")))?;

    let mut rings = rings.into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| PlannerError::InvalidGeometry(format!("{DRAW_A_POLYGON}: no rings")))?;

    let exterior = LineString::from(parse_ring(&exterior)?);
    let interiors = rings
        .map(|hole| parse_ring(&hole).map(LineString::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Validates positions and returns (lon, lat) pairs in degrees, open ring.
fn parse_ring(raw: &[Vec<f64>]) -> Result<Vec<(f64, f64)>, PlannerError> {
    let mut ring = Vec::with_capacity(raw.len());
    for pos in raw {
        let (lon, lat) = match pos.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => {
                return Err(PlannerError::InvalidGeometry(format!(
                    "{DRAW_A_POLYGON}: position needs longitude and latitude"
                )));
            }
        };
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(PlannerError::InvalidGeometry(format!(
                "{DRAW_A_POLYGON}: invalid position [{lon}, {lat}]"
            )));
        }
        ring.push((lon, lat));
    }

    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    let mut distinct: Vec<(f64, f64)> = Vec::with_capacity(ring.len());
    for p in &ring {
        if !distinct.contains(p) {
            distinct.push(*p);
        }
    }
    if distinct.len() < 3 {
        return Err(PlannerError::InvalidGeometry(format!(
            "{DRAW_A_POLYGON}: ring needs at least 3 distinct vertices, got {}",
            distinct.len()
        )));
    }
    if is_collinear(&distinct) {
        return Err(PlannerError::InvalidGeometry(format!(
            "{DRAW_A_POLYGON}: all vertices lie on one line"
        )));
    }
    Ok(ring)
}

/// True when every vertex lies on the line through the first two.
/// Longitude offsets are taken the short way round so rings across the
/// antimeridian are judged in one piece.
fn is_collinear(points: &[(f64, f64)]) -> bool {
    let (lon0, lat0) = points[0];
    let offset = |(lon, lat): (f64, f64)| ((lon - lon0 + 180.0).rem_euclid(360.0) - 180.0, lat - lat0);

    let (ax, ay) = offset(points[1]);
    let a_len = ax.hypot(ay);
    points[2..].iter().all(|&p| {
        let (bx, by) = offset(p);
        let cross = ax * by - ay * bx;
        cross.abs() <= COLLINEAR_EPS * a_len * bx.hypot(by)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WGS84_A: f64 = 6_378_137.0;
    const WGS84_F: f64 = 1.0 / 298.257_223_563;

    fn geom(kind: &str, coordinates: serde_json::Value) -> Geometry {
        Geometry { kind: kind.to_string(), coordinates }
    }

    /// Square of `side` metres with its south-west corner at (lon, lat).
    fn square(lon: f64, lat: f64, side: f64) -> Geometry {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let phi = lat.to_radians();
        let w = 1.0 - e2 * phi.sin().powi(2);
        let meridional = WGS84_A * (1.0 - e2) / w.powf(1.5);
        let prime_vertical = WGS84_A / w.sqrt();
        let dlat = (side / meridional).to_degrees();
        let dlon = (side / (prime_vertical * phi.cos())).to_degrees();
        geom(
            "Polygon",
            json!([[
                [lon, lat],
                [lon + dlon, lat],
                [lon + dlon, lat + dlat],
                [lon, lat + dlat],
                [lon, lat]
            ]]),
        )
    }

    #[test]
    fn test_ten_metre_square() {
        let est = estimate_area(&square(73.8567, 18.5204, 10.0)).unwrap();
        assert!((est.area_square_meters - 100.0).abs() < 0.1,
            "area = {}", est.area_square_meters);
        assert!((est.implied_capacity_kw - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_square_at_high_latitude() {
        let area = geodesic_area(&square(10.75, 59.91, 25.0)).unwrap();
        assert!((area - 625.0).abs() < 0.5, "area = {area}");
    }

    #[test]
    fn test_one_degree_cell_at_equator() {
        // ≈ 111 319.5 m × 110 574.4 m on WGS84
        let cell = geom("Polygon", json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]));
        let area = geodesic_area(&cell).unwrap();
        let expected = 111_319.49 * 110_574.39;
        assert!(((area - expected) / expected).abs() < 5e-3, "area = {area}");
    }

    #[test]
    fn test_winding_order_does_not_matter() {
        let ccw = geom("Polygon", json!([[[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.001]]]));
        let cw = geom("Polygon", json!([[[0.0, 0.0], [0.0, 0.001], [0.001, 0.001], [0.001, 0.0]]]));
        let a = geodesic_area(&ccw).unwrap();
        let b = geodesic_area(&cw).unwrap();
        assert!(a > 0.0);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_ring_crossing_antimeridian() {
        let west = geom("Polygon", json!([[[-0.001, 0.0], [0.001, 0.0], [0.001, 0.001], [-0.001, 0.001]]]));
        let wrapped = geom("Polygon", json!([[[179.999, 0.0], [-179.999, 0.0], [-179.999, 0.001], [179.999, 0.001]]]));
        let a = geodesic_area(&west).unwrap();
        let b = geodesic_area(&wrapped).unwrap();
        assert!((a - b).abs() / a < 1e-6, "{a} vs {b}");
    }

    #[test]
    fn test_hole_is_subtracted() {
        let with_hole = geom(
            "Polygon",
            json!([
                [[0.0, 0.0], [0.002, 0.0], [0.002, 0.002], [0.0, 0.002], [0.0, 0.0]],
                [[0.0005, 0.0005], [0.0015, 0.0005], [0.0015, 0.0015], [0.0005, 0.0015], [0.0005, 0.0005]]
            ]),
        );
        let outer = geom("Polygon", json!([[[0.0, 0.0], [0.002, 0.0], [0.002, 0.002], [0.0, 0.002]]]));
        let a_outer = geodesic_area(&outer).unwrap();
        let a_holed = geodesic_area(&with_hole).unwrap();
        assert!((a_holed / a_outer - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_non_polygon_rejected() {
        for (kind, coords) in [
            ("Point", json!([73.85, 18.52])),
            ("LineString", json!([[73.85, 18.52], [73.86, 18.53]])),
            ("Circle", json!([73.85, 18.52])),
        ] {
            let err = estimate_area(&geom(kind, coords)).unwrap_err();
            match err {
                PlannerError::InvalidGeometry(msg) => {
                    assert!(msg.contains("please draw a polygon"));
                    assert!(msg.contains(kind));
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let point_ring = geom("Polygon", json!([[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0]]]));
        assert!(matches!(geodesic_area(&point_ring), Err(PlannerError::InvalidGeometry(_))));

        let segment = geom("Polygon", json!([[[1.0, 1.0], [1.1, 1.0], [1.0, 1.0]]]));
        assert!(matches!(geodesic_area(&segment), Err(PlannerError::InvalidGeometry(_))));

        let empty = geom("Polygon", json!([]));
        assert!(matches!(geodesic_area(&empty), Err(PlannerError::InvalidGeometry(_))));

        let bad_lat = geom("Polygon", json!([[[0.0, 0.0], [1.0, 95.0], [1.0, 1.0]]]));
        assert!(matches!(geodesic_area(&bad_lat), Err(PlannerError::InvalidGeometry(_))));

        let bad_lon = geom(
            "Polygon",
            json!([[[1000.0, 18.52], [73.8501, 18.52], [73.8501, 18.53], [73.85, 18.52]]]),
        );
        assert!(matches!(geodesic_area(&bad_lon), Err(PlannerError::InvalidGeometry(_))));
    }

    #[test]
    fn test_collinear_ring_rejected() {
        let along_parallel = geom(
            "Polygon",
            json!([[[73.85, 18.52], [73.8501, 18.52], [73.8502, 18.52], [73.85, 18.52]]]),
        );
        match estimate_area(&along_parallel) {
            Err(PlannerError::InvalidGeometry(msg)) => assert!(msg.contains("please draw a polygon")),
            other => panic!("expected invalid geometry, got {other:?}"),
        }

        let diagonal = geom("Polygon", json!([[[0.0, 0.0], [0.25, 0.5], [0.5, 1.0], [0.0, 0.0]]]));
        assert!(matches!(geodesic_area(&diagonal), Err(PlannerError::InvalidGeometry(_))));

        let across_antimeridian = geom("Polygon", json!([[[179.999, 0.0], [-179.999, 0.0], [-179.998, 0.0]]]));
        assert!(matches!(geodesic_area(&across_antimeridian), Err(PlannerError::InvalidGeometry(_))));
    }

    #[test]
    fn test_thin_triangle_is_accepted() {
        let sliver = geom("Polygon", json!([[[73.85, 18.52], [73.8502, 18.52], [73.8501, 18.52001]]]));
        let area = geodesic_area(&sliver).unwrap();
        assert!(area > 0.0, "area = {area}");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&geom("Polygon", json!([]))), GeometryKind::Polygon);
        assert_eq!(classify(&geom("LineString", json!([]))), GeometryKind::LineString);
        assert_eq!(
            classify(&geom("Feature", json!(null))),
            GeometryKind::Other("Feature".to_string())
        );
    }
}
