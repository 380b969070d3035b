use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::quantize::nearly_equal;
use kurbo::{CubicBez, ParamCurve, Shape};

/// Line segments used per cubic when flattening for containment and tessellation.
pub const FLATTEN_STEPS: usize = 8;

/// Lottie-style bezier path.
///
/// Tangents are stored relative to their vertex (`vertex + out_tangent` is the first control
/// point of the segment leaving `vertex`).
#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct BezierPath {
    /// Anchor points.
    pub vertices: Vec<Point>,
    /// In tangents, one per vertex.
    pub in_tangents: Vec<Vec2>,
    /// Out tangents, one per vertex.
    pub out_tangents: Vec<Vec2>,
    /// Whether the last vertex connects back to the first.
    pub closed: bool,
}

impl BezierPath {
    /// Path made of straight segments through `points`.
    pub fn polygon(points: &[Point], closed: bool) -> Self {
        Self {
            vertices: points.to_vec(),
            in_tangents: vec![Vec2::ZERO; points.len()],
            out_tangents: vec![Vec2::ZERO; points.len()],
            closed,
        }
    }

    /// Closed axis-aligned rectangle centered on `center`, clockwise from the top-right corner.
    pub fn rect(center: Point, size: Vec2) -> Self {
        let hw = size.x * 0.5;
        let hh = size.y * 0.5;
        Self::polygon(
            &[
                Point::new(center.x + hw, center.y - hh),
                Point::new(center.x + hw, center.y + hh),
                Point::new(center.x - hw, center.y + hh),
                Point::new(center.x - hw, center.y - hh),
            ],
            true,
        )
    }

    /// Closed ellipse approximated with four cubics, starting at the top.
    pub fn ellipse(center: Point, size: Vec2) -> Self {
        // Standard circle-by-cubics constant.
        const KAPPA: f64 = 0.552_284_749_830_793_4;
        let rx = size.x * 0.5;
        let ry = size.y * 0.5;
        let cx = rx * KAPPA;
        let cy = ry * KAPPA;
        Self {
            vertices: vec![
                Point::new(center.x, center.y - ry),
                Point::new(center.x + rx, center.y),
                Point::new(center.x, center.y + ry),
                Point::new(center.x - rx, center.y),
            ],
            in_tangents: vec![
                Vec2::new(-cx, 0.0),
                Vec2::new(0.0, -cy),
                Vec2::new(cx, 0.0),
                Vec2::new(0.0, cy),
            ],
            out_tangents: vec![
                Vec2::new(cx, 0.0),
                Vec2::new(0.0, cy),
                Vec2::new(-cx, 0.0),
                Vec2::new(0.0, -cy),
            ],
            closed: true,
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// `true` when the path has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Tangent lists match the vertex list.
    pub fn is_well_formed(&self) -> bool {
        self.in_tangents.len() == self.vertices.len()
            && self.out_tangents.len() == self.vertices.len()
    }

    /// Same vertex count and closed flag.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.vertices.len() == other.vertices.len() && self.closed == other.closed
    }

    /// Per-vertex blend toward `other`. `None` when the topologies differ.
    pub fn interpolated(&self, other: &Self, t: f64) -> Option<Self> {
        if !self.is_compatible_with(other) || !self.is_well_formed() || !other.is_well_formed() {
            return None;
        }
        if t <= 0.0 {
            return Some(self.clone());
        }
        if t >= 1.0 {
            return Some(other.clone());
        }
        let lerp_pt = |a: Point, b: Point| a.lerp(b, t);
        let lerp_vec = |a: Vec2, b: Vec2| a.lerp(b, t);
        Some(Self {
            vertices: self
                .vertices
                .iter()
                .zip(&other.vertices)
                .map(|(a, b)| lerp_pt(*a, *b))
                .collect(),
            in_tangents: self
                .in_tangents
                .iter()
                .zip(&other.in_tangents)
                .map(|(a, b)| lerp_vec(*a, *b))
                .collect(),
            out_tangents: self
                .out_tangents
                .iter()
                .zip(&other.out_tangents)
                .map(|(a, b)| lerp_vec(*a, *b))
                .collect(),
            closed: self.closed,
        })
    }

    /// Map vertices and tangents through `m`.
    pub fn transformed(&self, m: Affine) -> Self {
        let linear = Affine::new({
            let c = m.as_coeffs();
            [c[0], c[1], c[2], c[3], 0.0, 0.0]
        });
        Self {
            vertices: self.vertices.iter().map(|p| m * *p).collect(),
            in_tangents: self
                .in_tangents
                .iter()
                .map(|v| (linear * v.to_point()).to_vec2())
                .collect(),
            out_tangents: self
                .out_tangents
                .iter()
                .map(|v| (linear * v.to_point()).to_vec2())
                .collect(),
            closed: self.closed,
        }
    }

    /// Cubic segments in order; closed paths include the closing segment.
    pub fn segments(&self) -> impl Iterator<Item = CubicBez> + '_ {
        let n = self.vertices.len();
        let count = match (n, self.closed) {
            (0, _) | (1, _) => 0,
            (_, true) => n,
            (_, false) => n - 1,
        };
        (0..count).map(move |i| {
            let j = (i + 1) % n;
            let p0 = self.vertices[i];
            let p3 = self.vertices[j];
            let p1 = p0 + self.out_tangents.get(i).copied().unwrap_or(Vec2::ZERO);
            let p2 = p3 + self.in_tangents.get(j).copied().unwrap_or(Vec2::ZERO);
            CubicBez::new(p0, p1, p2, p3)
        })
    }

    /// Convert to a kurbo [`BezPath`].
    pub fn to_bez_path(&self) -> BezPath {
        let mut out = BezPath::new();
        let Some(first) = self.vertices.first() else {
            return out;
        };
        out.move_to(*first);
        for seg in self.segments() {
            out.curve_to(seg.p1, seg.p2, seg.p3);
        }
        if self.closed {
            out.close_path();
        }
        out
    }

    /// Outline flattened with [`FLATTEN_STEPS`] lines per segment.
    ///
    /// The point count only depends on the topology, so compatible paths flatten to buffers of
    /// equal length.
    pub fn flattened(&self) -> Vec<Point> {
        let mut out = Vec::new();
        let Some(first) = self.vertices.first() else {
            return out;
        };
        out.push(*first);
        for seg in self.segments() {
            for step in 1..=FLATTEN_STEPS {
                out.push(seg.eval(step as f64 / FLATTEN_STEPS as f64));
            }
        }
        if self.closed && out.len() > 1 {
            // The closing segment ends on the first vertex again.
            out.pop();
        }
        out
    }

    /// Tight bounding box of the cubic outline. `None` for empty paths.
    pub fn bounding_box(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        if self.vertices.len() == 1 {
            return Some(Rect::from_points(self.vertices[0], self.vertices[0]));
        }
        Some(self.to_bez_path().bounding_box())
    }

    /// Signed shoelace area of the flattened outline, treating it as closed.
    pub fn flattened_area(&self) -> f64 {
        let poly = self.flattened();
        if poly.len() < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        let mut j = poly.len() - 1;
        for i in 0..poly.len() {
            twice += poly[j].x * poly[i].y - poly[i].x * poly[j].y;
            j = i;
        }
        twice * 0.5
    }

    /// `true` when the path can cover anything: closed, at least three vertices and a
    /// non-zero area.
    pub fn encloses_area(&self) -> bool {
        self.closed
            && self.vertices.len() >= 3
            && !nearly_equal(self.flattened_area(), 0.0)
    }

    /// Even-odd point-in-polygon test on the flattened outline. Open paths contain nothing.
    pub fn contains(&self, point: Point) -> bool {
        if !self.closed || self.vertices.len() < 2 {
            return false;
        }
        let poly = self.flattened();
        if poly.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = poly.len() - 1;
        for i in 0..poly.len() {
            let a = poly[i];
            let b = poly[j];
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
