// THEORY:
// The `layout` module maps the linear token sequence onto grid cells. It is the
// bridge between the one-dimensional world of the tokenizer and the
// two-dimensional world of the canvas, and it owns both halves of that mapping:
// the traversal pattern (which cell does token i land on?) and the validity
// filter (is that cell inside the active shape's boundary?).
//
// Key architectural principles:
// 1.  **Collision-Free by Construction**: Every pattern except `Random` assigns
//     each token a unique (row, col) through arithmetic or an explicit grid walk;
//     there is no post-hoc dedup. `Random` shuffles the complete cell list once,
//     so it is O(cells) with no retry loop, and tokens beyond the cell count are
//     dropped.
// 2.  **Grid Walks Emit in Scan Order**: The spiral and diagonal patterns fill an
//     index grid first and then emit positions in row-major scan order.
//     Downstream consumers key positions by (row, col), so emission order is not
//     observable.
// 3.  **Filter After Placement**: Positions are generated boundary-blind with
//     `valid = true` and the shape boundary is applied afterwards by
//     `is_valid_position`. An already-invalid position stays invalid.

use crate::core_modules::canvas::{CanvasInfo, Shape};
use crate::core_modules::tokenizer::Token;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// The traversal order mapping the token sequence onto grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    RowMajor,
    ColumnMajor,
    SpiralIn,
    SpiralOut,
    Zigzag,
    ZigzagCol,
    Diagonal,
    Random,
}

impl Pattern {
    /// Unknown tags fall back to row-major.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "column-major" => Pattern::ColumnMajor,
            "spiral-in" => Pattern::SpiralIn,
            "spiral-out" => Pattern::SpiralOut,
            "zigzag" => Pattern::Zigzag,
            "zigzag-col" => Pattern::ZigzagCol,
            "diagonal" => Pattern::Diagonal,
            "random" => Pattern::Random,
            _ => Pattern::RowMajor,
        }
    }
}

/// One token occurrence placed on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPosition {
    pub token: Token,
    pub row: u32,
    pub col: u32,
    /// Canvas x in pixels: col * pixel_size (pre-scale).
    pub x: u32,
    /// Canvas y in pixels: row * pixel_size (pre-scale).
    pub y: u32,
    /// True from the generator; overwritten by the validity filter.
    pub valid: bool,
}

fn position(token: &Token, row: usize, col: usize, pixel_size: u32) -> PixelPosition {
    PixelPosition {
        token: token.clone(),
        row: row as u32,
        col: col as u32,
        x: col as u32 * pixel_size,
        y: row as u32 * pixel_size,
        valid: true,
    }
}

/// Emits the positions recorded in an index grid in row-major scan order.
fn emit_grid(
    grid: &[Option<usize>],
    tokens: &[Token],
    cols: usize,
    pixel_size: u32,
) -> Vec<PixelPosition> {
    let mut positions = Vec::with_capacity(tokens.len());
    for (cell, slot) in grid.iter().enumerate() {
        if let Some(idx) = slot {
            positions.push(position(&tokens[*idx], cell / cols, cell % cols, pixel_size));
        }
    }
    positions
}

/// Places every token on a grid cell according to `pattern`. All positions start
/// `valid = true`; the shape boundary is applied afterwards.
pub fn generate_positions(
    tokens: &[Token],
    canvas: &CanvasInfo,
    pattern: Pattern,
    pixel_size: u32,
) -> Vec<PixelPosition> {
    let cols = canvas.cols as usize;
    let rows = canvas.rows as usize;
    if tokens.is_empty() || cols == 0 || rows == 0 {
        return Vec::new();
    }

    match pattern {
        Pattern::RowMajor => tokens
            .iter()
            .enumerate()
            .map(|(i, token)| position(token, i / cols, i % cols, pixel_size))
            .collect(),
        Pattern::ColumnMajor => tokens
            .iter()
            .enumerate()
            .map(|(i, token)| position(token, i % rows, i / rows, pixel_size))
            .collect(),
        Pattern::Zigzag => tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let row = i / cols;
                let col = i % cols;
                let col = if row % 2 == 0 { col } else { cols - 1 - col };
                position(token, row, col, pixel_size)
            })
            .collect(),
        Pattern::ZigzagCol => tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let col = i / rows;
                let row = i % rows;
                let row = if col % 2 == 0 { row } else { rows - 1 - row };
                position(token, row, col, pixel_size)
            })
            .collect(),
        Pattern::SpiralIn => spiral_in_positions(tokens, cols, rows, pixel_size),
        Pattern::SpiralOut => spiral_out_positions(tokens, cols, rows, pixel_size),
        Pattern::Diagonal => diagonal_positions(tokens, cols, rows, pixel_size),
        Pattern::Random => random_positions(tokens, cols, rows, pixel_size),
    }
}

/// Classic inward rectangular spiral: sweep right, down, left, up, shrinking the
/// active sub-rectangle at every boundary hit.
fn spiral_in_positions(
    tokens: &[Token],
    cols: usize,
    rows: usize,
    pixel_size: u32,
) -> Vec<PixelPosition> {
    let mut grid: Vec<Option<usize>> = vec![None; cols * rows];
    let (mut r, mut c) = (0i64, 0i64);
    let (mut min_r, mut max_r) = (0i64, rows as i64 - 1);
    let (mut min_c, mut max_c) = (0i64, cols as i64 - 1);
    let mut direction = 0u8; // 0 right, 1 down, 2 left, 3 up

    for idx in 0..tokens.len().min(cols * rows) {
        if (0..rows as i64).contains(&r) && (0..cols as i64).contains(&c) {
            grid[r as usize * cols + c as usize] = Some(idx);
        }
        match direction {
            0 => {
                if c >= max_c {
                    direction = 1;
                    min_r += 1;
                    r += 1;
                } else {
                    c += 1;
                }
            }
            1 => {
                if r >= max_r {
                    direction = 2;
                    max_c -= 1;
                    c -= 1;
                } else {
                    r += 1;
                }
            }
            2 => {
                if c <= min_c {
                    direction = 3;
                    max_r -= 1;
                    r -= 1;
                } else {
                    c -= 1;
                }
            }
            _ => {
                if r <= min_r {
                    direction = 0;
                    min_c += 1;
                    c += 1;
                } else {
                    r -= 1;
                }
            }
        }
    }
    emit_grid(&grid, tokens, cols, pixel_size)
}

/// Outward spiral from the grid center in expanding square rings, clipping moves
/// that fall outside the grid.
fn spiral_out_positions(
    tokens: &[Token],
    cols: usize,
    rows: usize,
    pixel_size: u32,
) -> Vec<PixelPosition> {
    let cells = cols * rows;
    let mut grid: Vec<Option<usize>> = vec![None; cells];
    let (mut r, mut c) = ((rows / 2) as i64, (cols / 2) as i64);
    let mut step = 1usize;
    let mut step_count = 0usize;
    let mut direction = 0u8; // 0 right, 1 up, 2 left, 3 down
    let mut idx = 0usize;
    let target = tokens.len().min(cells);

    if idx < target && (0..rows as i64).contains(&r) && (0..cols as i64).contains(&c) {
        grid[r as usize * cols + c as usize] = Some(idx);
        idx += 1;
    }
    while idx < target {
        match direction {
            0 => c += 1,
            1 => r -= 1,
            2 => c -= 1,
            _ => r += 1,
        }
        step_count += 1;
        if (0..rows as i64).contains(&r) && (0..cols as i64).contains(&c) {
            grid[r as usize * cols + c as usize] = Some(idx);
            idx += 1;
        }
        if step_count >= step {
            step_count = 0;
            direction = (direction + 1) % 4;
            // The ring widens after every second turn.
            if direction == 0 || direction == 2 {
                step += 1;
            }
        }
    }
    emit_grid(&grid, tokens, cols, pixel_size)
}

/// Fills anti-diagonals (row + col constant) in increasing diagonal order, then
/// by increasing row within each diagonal.
fn diagonal_positions(
    tokens: &[Token],
    cols: usize,
    rows: usize,
    pixel_size: u32,
) -> Vec<PixelPosition> {
    let mut grid: Vec<Option<usize>> = vec![None; cols * rows];
    let mut idx = 0usize;
    'outer: for s in 0..rows + cols - 1 {
        for row in 0..rows {
            if idx >= tokens.len() {
                break 'outer;
            }
            if s < row {
                continue;
            }
            let col = s - row;
            if col < cols {
                grid[row * cols + col] = Some(idx);
                idx += 1;
            }
        }
    }
    emit_grid(&grid, tokens, cols, pixel_size)
}

/// Shuffles the complete cell list once and assigns tokens in shuffled order.
/// Tokens beyond the cell count are dropped.
fn random_positions(
    tokens: &[Token],
    cols: usize,
    rows: usize,
    pixel_size: u32,
) -> Vec<PixelPosition> {
    let mut cells: Vec<(usize, usize)> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .collect();
    cells.shuffle(&mut rand::thread_rng());
    tokens
        .iter()
        .zip(cells)
        .map(|(token, (r, c))| position(token, r, c, pixel_size))
        .collect()
}

/// Applies the active shape's boundary rule to one position. Circle membership
/// is tested at the cell center; triangle keeps the lower-left half including
/// the diagonal; every other shape is a plain bounds check.
pub fn is_valid_position(
    pos: &PixelPosition,
    canvas: &CanvasInfo,
    shape: Shape,
    pixel_size: u32,
) -> bool {
    if !pos.valid {
        return false;
    }
    match shape {
        Shape::Circle => {
            let dx = pos.x as f64 + pixel_size as f64 / 2.0 - canvas.center_x;
            let dy = pos.y as f64 + pixel_size as f64 / 2.0 - canvas.center_y;
            (dx * dx + dy * dy).sqrt() <= canvas.radius
        }
        Shape::Triangle => pos.col <= pos.row,
        _ => pos.row < canvas.rows && pos.col < canvas.cols,
    }
}
