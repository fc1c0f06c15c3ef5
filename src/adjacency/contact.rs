//! Exact contact test between two county boundaries

use crate::config::AdjacencyConfig;
use crate::county::CountyId;
use crate::error::GeometryError;
use crate::geometry::validate::ring_segments;
use crate::geometry::{validate_shape, CountyBoundary};
use crate::spatial::{
    collinear_overlap, crosses, expand, intersection, line_rect, piece_midpoints, BoxIndex,
};
use geo::{BoundingRect, Contains, Coord, EuclideanDistance, Line, MultiPolygon, Point, Rect};
use rustc_hash::FxHashMap;

/// How two boundaries meet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Disjoint,
    /// Boundaries meet, but share less than the minimum boundary length
    Corner,
    /// Boundaries run together for the given length
    SharedBoundary(f64),
    /// Interiors intersect
    Overlap,
}

impl Contact {
    pub fn is_adjacent(&self) -> bool {
        matches!(self, Contact::SharedBoundary(_) | Contact::Overlap)
    }
}

/// A validated boundary with its segments indexed for pair tests
#[derive(Debug)]
pub(crate) struct PreparedShape {
    pub id: CountyId,
    pub bbox: Rect<f64>,
    shape: MultiPolygon<f64>,
    segments: Vec<Line<f64>>,
    segment_index: BoxIndex,
    /// One vertex per polygon, for polygons nested without touching
    probes: Vec<Coord<f64>>,
}

impl PreparedShape {
    pub fn new(county: &CountyBoundary) -> Result<Self, GeometryError> {
        validate_shape(&county.shape)?;
        let bbox = county.shape.bounding_rect().ok_or(GeometryError::Empty)?;

        let mut segments = Vec::new();
        let mut probes = Vec::new();
        for polygon in &county.shape.0 {
            if let Some(first) = polygon.exterior().0.first() {
                probes.push(*first);
            }
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                segments.extend(ring_segments(ring));
            }
        }

        let segment_index = BoxIndex::new(segments.iter().map(line_rect).collect());

        Ok(Self {
            id: county.id,
            bbox,
            shape: county.shape.clone(),
            segments,
            segment_index,
            probes,
        })
    }

    /// Inside the shape and further than `tol` from its boundary.
    fn contains_beyond(&self, coord: Coord<f64>, tol: f64) -> bool {
        let point = Point::from(coord);
        if !self.shape.0.iter().any(|polygon| polygon.contains(&point)) {
            return false;
        }
        let around = expand(&Rect::new(coord, coord), tol);
        self.segment_index
            .query(&around)
            .into_iter()
            .all(|i| point.euclidean_distance(&self.segments[i]) > tol)
    }
}

/// Classify how `a` and `b` meet under the configured tolerances.
pub(crate) fn contact(a: &PreparedShape, b: &PreparedShape, config: &AdjacencyConfig) -> Contact {
    let tol = config.tolerance;
    let Some(window) = intersection(&expand(&a.bbox, tol), &expand(&b.bbox, tol)) else {
        return Contact::Disjoint;
    };

    let mut shared = 0.0;
    // Segment pairs (in a, in b) that come within tolerance of each other
    let mut near: Vec<(usize, usize)> = Vec::new();

    for i in a.segment_index.query(&window) {
        let s = &a.segments[i];
        for j in b.segment_index.query(&expand(&line_rect(s), tol)) {
            let t = &b.segments[j];
            if crosses(s, t, tol) {
                return Contact::Overlap;
            }
            shared += collinear_overlap(s, t, tol);
            near.push((i, j));
        }
    }

    if shared >= config.min_shared_boundary {
        return Contact::SharedBoundary(shared);
    }

    // Boundaries only touch: an overlap now means one boundary runs into the
    // other's interior from a touching point, or one polygon sits inside the
    // other without touching it
    if runs_inside(a, b, near.iter().copied(), tol)
        || runs_inside(b, a, near.iter().map(|&(i, j)| (j, i)), tol)
        || b.probes.iter().any(|&p| a.contains_beyond(p, tol))
        || a.probes.iter().any(|&p| b.contains_beyond(p, tol))
    {
        return Contact::Overlap;
    }

    if near.is_empty() {
        Contact::Disjoint
    } else {
        Contact::Corner
    }
}

/// True when a segment of `from` touching `into` has a piece lying in the
/// interior of `into`, further than `tol` from its boundary.
///
/// Pieces are cut at the vertices of `into` near the segment, so each piece
/// is either wholly inside, wholly outside or along the boundary.
fn runs_inside(
    from: &PreparedShape,
    into: &PreparedShape,
    pairs: impl Iterator<Item = (usize, usize)>,
    tol: f64,
) -> bool {
    let mut by_segment: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for (i, j) in pairs {
        by_segment.entry(i).or_default().push(j);
    }

    by_segment.iter().any(|(&i, others)| {
        let near: Vec<&Line<f64>> = others.iter().map(|&j| &into.segments[j]).collect();
        piece_midpoints(&from.segments[i], &near, tol)
            .into_iter()
            .any(|m| into.contains_beyond(m, tol))
    })
}
