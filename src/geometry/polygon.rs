use serde::{Deserialize, Serialize};

const BOUNDARY_EPS: f64 = 1e-9;

/// Simple polygon given by a single ring of pixel coordinates.
///
/// A closing vertex equal to the first one is dropped at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(mut vertices: Vec<(f64, f64)>) -> Self {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Self { vertices }
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Whether `(x, y)` lies strictly inside the polygon.
    ///
    /// Points on an edge or vertex are outside. Fewer than three vertices never
    /// contain anything.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.vertices.len() < 3 || self.on_boundary(x, y) {
            return false;
        }

        // Even-odd ray cast towards +x.
        let mut inside = false;
        for ((xi, yi), (xj, yj)) in self.edges() {
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
        }
        inside
    }

    fn on_boundary(&self, x: f64, y: f64) -> bool {
        self.edges().any(|((x1, y1), (x2, y2))| {
            let cross = (x2 - x1) * (y - y1) - (y2 - y1) * (x - x1);
            cross.abs() <= BOUNDARY_EPS
                && x >= x1.min(x2) - BOUNDARY_EPS
                && x <= x1.max(x2) + BOUNDARY_EPS
                && y >= y1.min(y2) - BOUNDARY_EPS
                && y <= y1.max(y2) + BOUNDARY_EPS
        })
    }

    fn edges(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
    }

    #[test]
    fn test_closing_vertex_dropped() {
        assert_eq!(square().vertices().len(), 4);
    }

    #[test]
    fn test_contains_interior() {
        assert!(square().contains(5.0, 5.0));
        assert!(square().contains(0.1, 9.9));
    }

    #[test]
    fn test_outside_and_boundary() {
        let poly = square();
        assert!(!poly.contains(15.0, 5.0));
        assert!(!poly.contains(-0.1, 5.0));
        assert!(!poly.contains(10.0, 5.0));
        assert!(!poly.contains(0.0, 0.0));
    }

    #[test]
    fn test_concave_polygon() {
        // L-shape with the notch at the top right.
        let poly = Polygon::new(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (5.0, 5.0),
            (5.0, 10.0),
            (0.0, 10.0),
        ]);
        assert!(poly.contains(2.0, 8.0));
        assert!(poly.contains(8.0, 2.0));
        assert!(!poly.contains(8.0, 8.0));
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = Polygon::new(vec![(0.0, 0.0), (10.0, 10.0)]);
        assert!(!line.contains(5.0, 5.0));
    }
}
