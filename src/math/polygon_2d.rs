use super::{Point2, TOLERANCE};

/// An axis-aligned bounding box in 2D.
#[derive(Debug, Clone, Copy)]
pub struct Aabb2 {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb2 {
    /// Width of the box (x extent).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box (y extent).
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Computes the area-weighted centroid of a polygon.
///
/// Falls back to the vertex mean for degenerate (near-zero area) polygons.
/// Returns `None` for an empty vertex list.
#[must_use]
pub fn polygon_centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }

    let area = signed_area_2d(points);
    if area.abs() > TOLERANCE {
        let n = points.len();
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            let cross = points[i].x * points[j].y - points[j].x * points[i].y;
            cx += (points[i].x + points[j].x) * cross;
            cy += (points[i].y + points[j].y) * cross;
        }
        let f = 1.0 / (6.0 * area);
        return Some(Point2::new(cx * f, cy * f));
    }

    // Degenerate polygon: vertex mean.
    let mut sx = 0.0;
    let mut sy = 0.0;
    for pt in points {
        sx += pt.x;
        sy += pt.y;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / points.len() as f64;
    Some(Point2::new(sx * inv, sy * inv))
}

/// Computes the axis-aligned bounding box of a point set.
///
/// Returns `None` for an empty list.
#[must_use]
pub fn bounding_box_2d(points: &[Point2]) -> Option<Aabb2> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for pt in &points[1..] {
        min.x = min.x.min(pt.x);
        min.y = min.y.min(pt.y);
        max.x = max.x.max(pt.x);
        max.y = max.y.max(pt.y);
    }
    Some(Aabb2 { min, max })
}

/// Even-odd ray-cast point-in-polygon test.
///
/// The polygon is closed implicitly (last vertex connects to the first).
/// Points exactly on the boundary may classify either way.
#[must_use]
pub fn point_in_polygon_2d(p: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Total length of an open polyline.
#[must_use]
pub fn polyline_length_2d(points: &[Point2]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1] - w[0]).norm())
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&square());
        assert!((area - 16.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square();
        pts.reverse();
        let area = signed_area_2d(&pts);
        assert!((area + 16.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[Point2::new(1.0, 1.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn centroid_square() {
        let c = polygon_centroid(&square()).unwrap();
        approx::assert_relative_eq!(c.x, 2.0);
        approx::assert_relative_eq!(c.y, 2.0);
    }

    #[test]
    fn centroid_l_shape() {
        // L-shape: 4x4 square minus the upper-right 2x2 quadrant.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let c = polygon_centroid(&pts).unwrap();
        // Area 12; centroid pulled towards the filled lower-left.
        assert!(c.x < 2.0 && c.y < 2.0, "centroid ({}, {})", c.x, c.y);
    }

    #[test]
    fn centroid_degenerate_falls_back_to_mean() {
        let pts = vec![Point2::new(1.0, 1.0), Point2::new(3.0, 1.0)];
        let c = polygon_centroid(&pts).unwrap();
        assert!((c.x - 2.0).abs() < TOLERANCE);
        assert!((c.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn bounding_box_basic() {
        let bb = bounding_box_2d(&square()).unwrap();
        approx::assert_relative_eq!(bb.width(), 4.0);
        approx::assert_relative_eq!(bb.height(), 4.0);
        approx::assert_relative_eq!(bb.center().x, 2.0);
    }

    #[test]
    fn bounding_box_empty() {
        assert!(bounding_box_2d(&[]).is_none());
    }

    #[test]
    fn point_in_polygon_square() {
        let sq = square();
        assert!(point_in_polygon_2d(&Point2::new(2.0, 2.0), &sq));
        assert!(!point_in_polygon_2d(&Point2::new(5.0, 2.0), &sq));
        assert!(!point_in_polygon_2d(&Point2::new(-1.0, -1.0), &sq));
    }

    #[test]
    fn point_in_polygon_concave() {
        // L-shape: the notch is outside.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        assert!(point_in_polygon_2d(&Point2::new(1.0, 3.0), &pts));
        assert!(!point_in_polygon_2d(&Point2::new(3.0, 3.0), &pts));
    }

    #[test]
    fn polyline_length_basic() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 4.0),
        ];
        assert!((polyline_length_2d(&pts) - 7.0).abs() < TOLERANCE);
    }
}
