//! Synthetic county fixtures shared by the integration tests

#![allow(dead_code)]

use foodnet::{BoundaryRecord, CountyId};
use geo::{Coord, LineString, Polygon};

/// Identifier of cell `i` of a grid: state 01, counties 001, 002, ...
pub fn grid_id(i: usize) -> CountyId {
    CountyId::new(1, i as u32 + 1).unwrap()
}

/// Closed square ring with every side split into `steps` segments.
pub fn square_ring(x: f64, y: f64, size: f64, steps: usize) -> LineString<f64> {
    let steps = steps.max(1);
    let corners = [(x, y), (x + size, y), (x + size, y + size), (x, y + size)];
    let mut coords = Vec::with_capacity(4 * steps + 1);
    for k in 0..4 {
        let (x0, y0) = corners[k];
        let (x1, y1) = corners[(k + 1) % 4];
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            coords.push(Coord {
                x: x0 + (x1 - x0) * t,
                y: y0 + (y1 - y0) * t,
            });
        }
    }
    coords.push(Coord { x, y });
    LineString::new(coords)
}

pub fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
    Polygon::new(square_ring(x, y, size, 1), vec![])
}

/// `cols` x `rows` unit squares, row by row from the origin.
pub fn grid_records(cols: usize, rows: usize, steps: usize) -> Vec<BoundaryRecord> {
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .map(|(r, c)| {
            let i = r * cols + c;
            let shape = Polygon::new(square_ring(c as f64, r as f64, 1.0, steps), vec![]);
            BoundaryRecord::new(grid_id(i).to_string(), shape)
                .with_name(format!("County {}", i + 1))
                .with_land_area_m2(1_000_000.0)
        })
        .collect()
}

/// Edges of a `cols` x `rows` grid with rook adjacency
pub fn grid_edge_count(cols: usize, rows: usize) -> usize {
    rows * cols.saturating_sub(1) + cols * rows.saturating_sub(1)
}
