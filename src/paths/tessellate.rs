//! Polygon tessellation for path vertex buffers.

use crate::foundation::core::Point;
use crate::geometry::path::BezierPath;

/// Interleaved `x, y` vertex buffer of the flattened outline.
pub fn vertex_buffer(path: &BezierPath) -> Vec<f32> {
    path.flattened()
        .iter()
        .flat_map(|p| [p.x as f32, p.y as f32])
        .collect()
}

/// Triangle indices into the flattened outline of a closed path.
///
/// Ear clipping; falls back to a triangle fan when the outline is self-intersecting and no ear can
/// be found. Open paths have no fill and produce no indices.
pub fn triangulate(path: &BezierPath) -> Vec<u32> {
    if !path.closed {
        return Vec::new();
    }
    triangulate_polygon(&path.flattened())
}

/// Ear-clip a simple polygon given as an outline without a repeated closing point.
pub fn triangulate_polygon(points: &[Point]) -> Vec<u32> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let ccw = signed_area(points) > 0.0;
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity((n - 2) * 3);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let a = remaining[(i + m - 1) % m];
            let b = remaining[i];
            let c = remaining[(i + 1) % m];
            is_ear(points, &remaining, a, b, c, ccw)
        });
        let Some(i) = ear else {
            fan(&remaining, &mut out);
            return out;
        };
        let a = remaining[(i + m - 1) % m];
        let b = remaining[i];
        let c = remaining[(i + 1) % m];
        out.extend([a as u32, b as u32, c as u32]);
        remaining.remove(i);
    }
    out.extend(remaining.iter().map(|&i| i as u32));
    out
}

fn fan(remaining: &[usize], out: &mut Vec<u32>) {
    for w in 1..remaining.len() - 1 {
        out.extend([
            remaining[0] as u32,
            remaining[w] as u32,
            remaining[w + 1] as u32,
        ]);
    }
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum::<f64>()
        * 0.5
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn is_ear(points: &[Point], remaining: &[usize], a: usize, b: usize, c: usize, ccw: bool) -> bool {
    let (pa, pb, pc) = (points[a], points[b], points[c]);
    let turn = cross(pa, pb, pc);
    let convex = if ccw { turn > 0.0 } else { turn < 0.0 };
    if !convex {
        return false;
    }
    remaining
        .iter()
        .filter(|&&i| i != a && i != b && i != c)
        .all(|&i| !point_in_triangle(points[i], pa, pb, pc))
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
#[path = "../../tests/unit/paths/tessellate.rs"]
mod tests;
