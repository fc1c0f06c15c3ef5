//! Bounding-box index and segment predicates
//!
//! The index is used twice: to find candidate county pairs before exact
//! boundary tests, and to find candidate segment pairs inside those tests.

use geo::{coord, Coord, Line, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use std::fmt;

type BoxEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn corners(rect: &Rect<f64>) -> ([f64; 2], [f64; 2]) {
    let (min, max) = (rect.min(), rect.max());
    ([min.x, min.y], [max.x, max.y])
}

/// R-tree over bounding rectangles; item ids are their input positions
pub struct BoxIndex {
    tree: RTree<BoxEntry>,
    rects: Vec<Rect<f64>>,
}

impl BoxIndex {
    pub fn new(rects: Vec<Rect<f64>>) -> Self {
        let entries = rects
            .iter()
            .enumerate()
            .map(|(id, rect)| {
                let (lo, hi) = corners(rect);
                GeomWithData::new(Rectangle::from_corners(lo, hi), id)
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            rects,
        }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rect(&self, id: usize) -> &Rect<f64> {
        &self.rects[id]
    }

    /// Ids of items whose rectangle meets `query` (touching counts), ascending.
    pub fn query(&self, query: &Rect<f64>) -> Vec<usize> {
        let (lo, hi) = corners(query);
        let envelope = AABB::from_corners(lo, hi);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        hits.sort_unstable();
        hits
    }
}

impl fmt::Debug for BoxIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxIndex").field("len", &self.rects.len()).finish()
    }
}

/// Closed-rectangle intersection test (touching edges intersect).
pub fn rects_intersect(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}

/// Grow a rectangle by `by` on every side.
pub fn expand(rect: &Rect<f64>, by: f64) -> Rect<f64> {
    Rect::new(
        coord! { x: rect.min().x - by, y: rect.min().y - by },
        coord! { x: rect.max().x + by, y: rect.max().y + by },
    )
}

/// Overlap of two rectangles, if any.
pub fn intersection(a: &Rect<f64>, b: &Rect<f64>) -> Option<Rect<f64>> {
    if !rects_intersect(a, b) {
        return None;
    }
    Some(Rect::new(
        coord! { x: a.min().x.max(b.min().x), y: a.min().y.max(b.min().y) },
        coord! { x: a.max().x.min(b.max().x), y: a.max().y.min(b.max().y) },
    ))
}

pub fn line_rect(line: &Line<f64>) -> Rect<f64> {
    Rect::new(line.start, line.end)
}

fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

fn length(v: Coord<f64>) -> f64 {
    v.x.hypot(v.y)
}

/// Length of `s` that runs along `t` within `tolerance`.
///
/// Both endpoints of `t` must lie within `tolerance` of the line through `s`;
/// the result is the length of the projection of `t` clipped to `s`.
pub fn collinear_overlap(s: &Line<f64>, t: &Line<f64>, tolerance: f64) -> f64 {
    let d = s.end - s.start;
    let len = length(d);
    if len == 0.0 {
        return 0.0;
    }
    let dir = coord! { x: d.x / len, y: d.y / len };

    let r = t.start - s.start;
    let u = t.end - s.start;
    if cross(dir, r).abs() > tolerance || cross(dir, u).abs() > tolerance {
        return 0.0;
    }

    let (tr, tu) = (dot(dir, r), dot(dir, u));
    let lo = tr.min(tu).max(0.0);
    let hi = tr.max(tu).min(len);
    (hi - lo).max(0.0)
}

/// True when `s` and `t` cross at a single interior point, with every
/// endpoint more than `tolerance` away from the other segment's line.
pub fn crosses(s: &Line<f64>, t: &Line<f64>, tolerance: f64) -> bool {
    let ds = s.end - s.start;
    let dt = t.end - t.start;
    let (ls, lt) = (length(ds), length(dt));
    if ls == 0.0 || lt == 0.0 {
        return false;
    }

    let side_r = cross(ds, t.start - s.start) / ls;
    let side_u = cross(ds, t.end - s.start) / ls;
    let side_p = cross(dt, s.start - t.start) / lt;
    let side_q = cross(dt, s.end - t.start) / lt;

    let straddles = |a: f64, b: f64| a * b < 0.0 && a.abs() > tolerance && b.abs() > tolerance;
    straddles(side_r, side_u) && straddles(side_p, side_q)
}

/// True when `p` lies exactly on the closed segment `s`.
pub fn on_segment(p: Coord<f64>, s: &Line<f64>) -> bool {
    let d = s.end - s.start;
    let r = p - s.start;
    if cross(d, r) != 0.0 {
        return false;
    }
    let t = dot(d, r);
    t >= 0.0 && t <= dot(d, d)
}

/// Midpoints of the pieces left after cutting `s` at every endpoint of `cuts`
/// that lies within `tolerance` of it.
pub fn piece_midpoints(s: &Line<f64>, cuts: &[&Line<f64>], tolerance: f64) -> Vec<Coord<f64>> {
    let d = s.end - s.start;
    let len = length(d);
    if len == 0.0 {
        return Vec::new();
    }

    let mut params = vec![0.0, 1.0];
    for t in cuts {
        for p in [t.start, t.end] {
            let r = p - s.start;
            let param = dot(d, r) / (len * len);
            if param > 0.0 && param < 1.0 && (cross(d, r) / len).abs() <= tolerance {
                params.push(param);
            }
        }
    }
    params.sort_by(f64::total_cmp);
    params.dedup();

    params
        .windows(2)
        .map(|w| {
            let m = (w[0] + w[1]) / 2.0;
            coord! { x: s.start.x + d.x * m, y: s.start.y + d.y * m }
        })
        .collect()
}
