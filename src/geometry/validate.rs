//! Boundary shape checks
//!
//! A shape that fails here is excluded from adjacency building. The checks
//! are structural: finite coordinates, at least three distinct vertices per
//! ring, non-zero enclosed area and rings that do not cross themselves.

use crate::error::GeometryError;
use crate::spatial::{collinear_overlap, crosses, line_rect, on_segment, BoxIndex};
use geo::{Area, BoundingRect, Line, LineString, MultiPolygon};

/// Relative area below which a ring is considered degenerate
const ZERO_AREA_RATIO: f64 = 1e-12;

pub fn validate_shape(shape: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if shape.0.is_empty() {
        return Err(GeometryError::Empty);
    }

    for polygon in &shape.0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            validate_ring(ring)?;
        }

        let area = polygon.unsigned_area();
        let extent = polygon
            .bounding_rect()
            .map(|r| r.width() * r.height())
            .unwrap_or(0.0);
        if !(area > extent * ZERO_AREA_RATIO) || extent == 0.0 {
            return Err(GeometryError::ZeroArea);
        }
    }

    Ok(())
}

fn validate_ring(ring: &LineString<f64>) -> Result<(), GeometryError> {
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    let segments = ring_segments(ring);
    if segments.len() < 3 {
        return Err(GeometryError::TooFewVertices {
            vertices: segments.len(),
        });
    }

    if !is_simple(&segments) {
        return Err(GeometryError::SelfIntersecting);
    }

    Ok(())
}

/// Segments of a closed ring with repeated consecutive vertices removed.
pub(crate) fn ring_segments(ring: &LineString<f64>) -> Vec<Line<f64>> {
    let mut vertices = ring.0.clone();
    vertices.dedup();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    let n = vertices.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect()
}

/// No two non-neighbouring segments of the ring touch or cross.
fn is_simple(segments: &[Line<f64>]) -> bool {
    let n = segments.len();
    let index = BoxIndex::new(segments.iter().map(line_rect).collect());

    for (i, segment) in segments.iter().enumerate() {
        for j in index.query(index.rect(i)) {
            if j <= i {
                continue;
            }
            // Consecutive segments share a vertex by construction
            if j == i + 1 || (i == 0 && j == n - 1) {
                if collinear_overlap(segment, &segments[j], 0.0) > 0.0
                    && folds_back(segment, &segments[j])
                {
                    return false;
                }
                continue;
            }
            if crosses(segment, &segments[j], 0.0)
                || collinear_overlap(segment, &segments[j], 0.0) > 0.0
                || touches(segment, &segments[j])
            {
                return false;
            }
        }
    }
    true
}

/// Neighbouring segments that double back over each other (a spike).
fn folds_back(a: &Line<f64>, b: &Line<f64>) -> bool {
    let da = a.end - a.start;
    let db = b.end - b.start;
    da.x * db.x + da.y * db.y < 0.0
}

/// An endpoint of either segment lies on the other.
fn touches(a: &Line<f64>, b: &Line<f64>) -> bool {
    on_segment(a.start, b) || on_segment(a.end, b) || on_segment(b.start, a) || on_segment(b.end, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Polygon;

    fn shape(coords: Vec<(f64, f64)>) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(LineString::from(coords), vec![])])
    }

    #[test]
    fn test_valid_square() {
        let square = shape(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(validate_shape(&square), Ok(()));
    }

    #[test]
    fn test_square_with_hole() {
        let outer = LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)]);
        let donut = MultiPolygon::new(vec![Polygon::new(outer, vec![hole])]);
        assert_eq!(validate_shape(&donut), Ok(()));
    }

    #[test]
    fn test_empty_shape() {
        assert_eq!(validate_shape(&MultiPolygon::new(vec![])), Err(GeometryError::Empty));
    }

    #[test]
    fn test_too_few_vertices() {
        let sliver = shape(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(
            validate_shape(&sliver),
            Err(GeometryError::TooFewVertices { vertices: 2 })
        );
    }

    #[test]
    fn test_collinear_ring_has_zero_area() {
        let flat = shape(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);
        assert!(matches!(
            validate_shape(&flat),
            Err(GeometryError::ZeroArea) | Err(GeometryError::SelfIntersecting)
        ));
    }

    #[test]
    fn test_bow_tie_is_self_intersecting() {
        let bow_tie = shape(vec![(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)]);
        assert_eq!(validate_shape(&bow_tie), Err(GeometryError::SelfIntersecting));
    }

    #[test]
    fn test_vertex_touching_own_side_is_self_intersecting() {
        // (2, 0) sits in the middle of the bottom side
        let pinched = shape(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (2.0, 0.0), (0.0, 4.0), (0.0, 0.0)]);
        assert_eq!(validate_shape(&pinched), Err(GeometryError::SelfIntersecting));
    }

    #[test]
    fn test_non_finite() {
        let bad = shape(vec![(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(validate_shape(&bad), Err(GeometryError::NonFinite));
    }

    #[test]
    fn test_ring_segments_drop_repeats() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(ring_segments(&ring).len(), 3);
    }
}
