// THEORY:
// The `canvas` module answers the geometry question: given a token count, a cell
// size and a shape, how big is the grid and the pixel canvas it lives on? It is
// pure arithmetic — no token ever reaches this module, only the count.
//
// Key architectural principles:
// 1.  **Shape as a Closed Enum**: The boundary rule is parsed once from its tag
//     into `Shape` and dispatched as an enum. Unrecognized tags take the plain
//     `Grid` fallback (ceil(sqrt(n)) columns), which differs from `Square` in
//     that rows are not forced equal to columns.
// 2.  **Grid vs Boundary**: For `Circle` the cols/rows pair only indexes the
//     grid; the visible boundary is the center/radius pair, enforced later by
//     the validity filter. `Spiral` names the intended traversal — its geometry
//     is rectangular.
// 3.  **Defensive Center/Radius**: Shapes without a meaningful center still get
//     the geometric midpoint and half the minor dimension, so downstream code
//     can read the fields unconditionally.

use serde::{Deserialize, Serialize};

/// The boundary rule defining which grid cells belong to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Square,
    Rectangle,
    Tall,
    Circle,
    Spiral,
    Triangle,
    /// Fallback for unrecognized tags: a plain ceil(sqrt(n))-column grid.
    Grid,
}

impl Shape {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "square" => Shape::Square,
            "rectangle" => Shape::Rectangle,
            "tall" => Shape::Tall,
            "circle" => Shape::Circle,
            "spiral" => Shape::Spiral,
            "triangle" => Shape::Triangle,
            _ => Shape::Grid,
        }
    }
}

/// Grid and pixel extents for one layout pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasInfo {
    /// Canvas width in pixels (before any export scaling).
    pub width: u32,
    /// Canvas height in pixels (before any export scaling).
    pub height: u32,
    /// Grid width in cells.
    pub cols: u32,
    /// Grid height in cells.
    pub rows: u32,
    /// Horizontal center in pixels; geometric for circles, midpoint otherwise.
    pub center_x: f64,
    /// Vertical center in pixels; geometric for circles, midpoint otherwise.
    pub center_y: f64,
    /// Boundary radius for circles; half the minor dimension otherwise.
    pub radius: f64,
}

/// Computes the canvas geometry for `n_tokens` cells of side `pixel_size` under
/// the given shape. Zero tokens yield an all-zero CanvasInfo.
pub fn canvas_size(n_tokens: usize, pixel_size: u32, shape: Shape) -> CanvasInfo {
    if n_tokens == 0 {
        return CanvasInfo::default();
    }

    let n = n_tokens as f64;
    let p = pixel_size;
    let mut center: Option<(f64, f64)> = None;
    let mut radius: Option<f64> = None;

    let (cols, rows, width, height) = match shape {
        Shape::Square => {
            let side = n.sqrt().ceil() as u32;
            (side, side, side * p, side * p)
        }
        Shape::Rectangle => {
            let cols = (n * 2.0).sqrt().ceil() as u32;
            let rows = n_tokens.div_ceil(cols as usize) as u32;
            (cols, rows, cols * p, rows * p)
        }
        Shape::Tall => {
            let rows = (n * 2.0).sqrt().ceil() as u32;
            let cols = n_tokens.div_ceil(rows as usize) as u32;
            (cols, rows, cols * p, rows * p)
        }
        Shape::Circle => {
            let r = ((n / std::f64::consts::PI).sqrt().ceil() as u32) * p;
            radius = Some(r as f64);
            let extent = 2 * r + p;
            center = Some((extent as f64 / 2.0, extent as f64 / 2.0));
            // cols/rows only index the grid; the boundary is the circle itself.
            let cols = n.sqrt().ceil() as u32;
            let rows = n_tokens.div_ceil(cols as usize) as u32;
            (cols, rows, extent, extent)
        }
        Shape::Spiral => {
            let cols = n.sqrt().ceil() as u32;
            let rows = n_tokens.div_ceil(cols as usize) as u32;
            let (width, height) = (cols * p, rows * p);
            center = Some((width as f64 / 2.0, height as f64 / 2.0));
            (cols, rows, width, height)
        }
        Shape::Triangle => {
            // Smallest side whose triangular number holds every token.
            let mut side: u64 = 1;
            while side * (side + 1) / 2 < n_tokens as u64 {
                side += 1;
            }
            let side = side as u32;
            (side, side, side * p, side * p)
        }
        Shape::Grid => {
            let cols = n.sqrt().ceil() as u32;
            let rows = n_tokens.div_ceil(cols as usize) as u32;
            (cols, rows, cols * p, rows * p)
        }
    };

    CanvasInfo {
        width,
        height,
        cols,
        rows,
        center_x: center.map_or(width as f64 / 2.0, |c| c.0),
        center_y: center.map_or(height as f64 / 2.0, |c| c.1),
        radius: radius.unwrap_or_else(|| width.min(height) as f64 / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tokens_yield_an_all_zero_canvas() {
        for shape in [
            Shape::Square,
            Shape::Rectangle,
            Shape::Tall,
            Shape::Circle,
            Shape::Spiral,
            Shape::Triangle,
            Shape::Grid,
        ] {
            assert_eq!(canvas_size(0, 10, shape), CanvasInfo::default());
        }
    }

    #[test]
    fn square_forces_equal_sides() {
        let info = canvas_size(9, 10, Shape::Square);
        assert_eq!((info.cols, info.rows), (3, 3));
        assert_eq!((info.width, info.height), (30, 30));

        // 10 tokens need a 4x4 square even though the last row is short.
        let info = canvas_size(10, 10, Shape::Square);
        assert_eq!((info.cols, info.rows), (4, 4));
    }

    #[test]
    fn rectangle_and_tall_are_transposes() {
        let wide = canvas_size(50, 10, Shape::Rectangle);
        let tall = canvas_size(50, 10, Shape::Tall);
        assert_eq!((wide.cols, wide.rows), (tall.rows, tall.cols));
        assert!(wide.cols as usize * wide.rows as usize >= 50);
        assert!(tall.cols as usize * tall.rows as usize >= 50);
    }

    #[test]
    fn triangle_picks_the_smallest_triangular_side() {
        // 3+2+1 = 6 >= 5, while a side of 2 only holds 3 cells.
        let info = canvas_size(5, 10, Shape::Triangle);
        assert_eq!((info.cols, info.rows), (3, 3));
        assert_eq!((info.width, info.height), (30, 30));
    }

    #[test]
    fn circle_geometry_centers_the_boundary() {
        let info = canvas_size(100, 10, Shape::Circle);
        // radius = ceil(sqrt(100/pi)) * 10 = 60, extent = 2*60 + 10 = 130.
        assert_eq!(info.radius, 60.0);
        assert_eq!((info.width, info.height), (130, 130));
        assert_eq!((info.center_x, info.center_y), (65.0, 65.0));
        assert!(info.cols as usize * info.rows as usize >= 100);
    }

    #[test]
    fn grid_fallback_differs_from_square() {
        let grid = canvas_size(10, 10, Shape::Grid);
        assert_eq!((grid.cols, grid.rows), (4, 3));
    }

    #[test]
    fn every_rectangular_shape_holds_all_tokens() {
        for shape in [Shape::Square, Shape::Rectangle, Shape::Tall, Shape::Grid] {
            for n in [1usize, 2, 7, 100, 1234] {
                let info = canvas_size(n, 5, shape);
                assert!(
                    info.cols as usize * info.rows as usize >= n,
                    "{shape:?} with {n} tokens"
                );
            }
        }
    }

    #[test]
    fn unknown_shape_tags_fall_back_to_grid() {
        assert_eq!(Shape::from_tag("hexagon"), Shape::Grid);
        assert_eq!(Shape::from_tag("circle"), Shape::Circle);
    }
}
