//! Target layout generation: square lattice over a bounded region with
//! axis-aligned rectangular obstacles carved out.

use crate::types::Position;

/// Axis-aligned rectangular region `[x_min, x_max] × [y_min, y_max]`.
///
/// Used both for the lattice bounds and for obstacle rejection regions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Returns true if `p` lies inside the rectangle, borders included.
    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Generates a square lattice of candidate target positions covering `bounds`.
///
/// Points are laid out row by row starting at `(x_min, y_min)` with the given
/// spacing; the last row/column is the largest multiple of `spacing` that
/// still fits in the bounds. Returns an empty vector for non-positive spacing.
pub fn generate_lattice(bounds: &Rect, spacing: f64) -> Vec<Position> {
    if spacing <= 0.0 || bounds.width() < 0.0 || bounds.height() < 0.0 {
        return Vec::new();
    }

    // small slack so a bound that is an exact multiple of spacing is kept
    let eps = spacing * 1e-9;
    let nx = ((bounds.width() + eps) / spacing).floor() as usize + 1;
    let ny = ((bounds.height() + eps) / spacing).floor() as usize + 1;

    let mut points = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            points.push(Position::new(
                bounds.x_min + i as f64 * spacing,
                bounds.y_min + j as f64 * spacing,
            ));
        }
    }
    points
}

/// Drops every point that falls inside any obstacle rectangle.
pub fn reject_collisions(points: Vec<Position>, obstacles: &[Rect]) -> Vec<Position> {
    points
        .into_iter()
        .filter(|p| !obstacles.iter().any(|o| o.contains(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_covers_bounds() {
        let pts = generate_lattice(&Rect::new(0.0, 10.0, 0.0, 5.0), 5.0);
        assert_eq!(pts.len(), 3 * 2);
        assert_eq!(pts[0], Position::new(0.0, 0.0));
        assert_eq!(pts[5], Position::new(10.0, 5.0));
    }

    #[test]
    fn lattice_truncates_partial_cells() {
        let pts = generate_lattice(&Rect::new(0.0, 12.0, 0.0, 0.0), 5.5);
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 5.5, 11.0]);
    }

    #[test]
    fn lattice_rejects_bad_spacing() {
        assert!(generate_lattice(&Rect::new(0.0, 1.0, 0.0, 1.0), 0.0).is_empty());
    }

    #[test]
    fn obstacles_remove_interior_and_border_points() {
        let pts = generate_lattice(&Rect::new(0.0, 10.0, 0.0, 10.0), 5.0);
        let kept = reject_collisions(pts, &[Rect::new(0.0, 5.0, 0.0, 5.0)]);
        // (0,0), (5,0), (0,5), (5,5) fall in the obstacle
        assert_eq!(kept.len(), 9 - 4);
        assert!(kept.iter().all(|p| p.x > 5.0 || p.y > 5.0));
    }
}
