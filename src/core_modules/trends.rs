// THEORY:
// The `trend_detector` is the engine of the run-analysis layer. It scans the
// colored grid for maximal straight runs of similar-colored cells ("trends") so
// the renderer can highlight structure a viewer would otherwise miss.
//
// Key architectural principles & algorithm steps:
// 1.  **Scan-Line Enumeration**: For each direction the grid is covered by
//     maximal straight scan lines — every full row, every full column, or the
//     four diagonal families (descending anchored at column 0, descending
//     anchored at row 0, ascending ending at the last column, ascending anchored
//     along row 0). Together the families visit every diagonal at least once.
// 2.  **Run Walking**: Within one scan line, cells with no resolved color are
//     skipped — they neither break nor extend a run. A colored cell either
//     extends the current run (distance to the previous kept color within the
//     threshold) or closes it and starts a new one. Closed runs are reported
//     only at the configured minimum length, and an open run is flushed at the
//     end of the line, so a maximal run is never split.
// 3.  **Stateless Detection**: `detect_trends` reads an immutable position→color
//     map and returns a fresh trend list; nothing is cached between calls.
// 4.  **Order-Free Union**: The dispatcher unions the enabled directions' runs.
//     Scan lines of different directions are disjoint read-only views over the
//     same map, so directions can run on parallel workers and be merged in any
//     order; trend identity, not ordering, is the observable contract. Any
//     parallel failure degrades to sequential per-direction scans with an
//     identical result set.

use crate::core_modules::color::color::{color_distance, max_color_distance, HexColor};
use crate::core_modules::layout::PixelPosition;
use crate::core_modules::palette::ColorMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One (row, col) grid address.
pub type Cell = (u32, u32);
/// An ordered run of adjacent, color-similar cells along one scan direction.
pub type Trend = Vec<Cell>;
/// Resolved display color per valid cell.
pub type PositionColorMap = HashMap<Cell, HexColor>;

/// One scan direction for trend detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Horizontal,
    Vertical,
    Diagonal,
}

/// Which scan directions the dispatcher runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendDirections {
    pub horizontal: bool,
    pub vertical: bool,
    pub diagonal: bool,
}

impl Default for TrendDirections {
    fn default() -> Self {
        Self {
            horizontal: true,
            vertical: true,
            diagonal: true,
        }
    }
}

impl TrendDirections {
    pub fn enabled(&self) -> Vec<TrendDirection> {
        let mut directions = Vec::with_capacity(3);
        if self.horizontal {
            directions.push(TrendDirection::Horizontal);
        }
        if self.vertical {
            directions.push(TrendDirection::Vertical);
        }
        if self.diagonal {
            directions.push(TrendDirection::Diagonal);
        }
        directions
    }
}

/// Builds the (row, col) → display color mapping from the validity-filtered
/// positions. Invalid positions are excluded; a token missing from both maps
/// leaves its cell colorless.
pub fn build_position_color_map(
    positions: &[PixelPosition],
    display_map: &ColorMap,
    color_map: &ColorMap,
) -> PositionColorMap {
    let mut map = PositionColorMap::with_capacity(positions.len());
    for p in positions {
        if !p.valid {
            continue;
        }
        if let Some(color) = display_map.get(&p.token).or_else(|| color_map.get(&p.token)) {
            map.insert((p.row, p.col), color.clone());
        }
    }
    map
}

pub mod trend_detector {
    use super::*;
    use crate::worker_pool;

    /// Grids below this many cells always scan sequentially.
    const PARALLEL_TRENDS_MIN_CELLS: u64 = 100_000;
    /// At most one worker per direction.
    const MAX_TREND_WORKERS: usize = 3;

    /// Scans every line of one direction and returns the maximal runs of at
    /// least `min_length` cells whose consecutive colors stay within
    /// `similarity_pct` of the maximum RGB distance.
    pub fn detect_trends(
        cols: u32,
        rows: u32,
        direction: TrendDirection,
        position_color_map: &PositionColorMap,
        min_length: usize,
        similarity_pct: f64,
    ) -> Vec<Trend> {
        let thresh = (similarity_pct / 100.0) * max_color_distance();
        let mut trends = Vec::new();

        match direction {
            TrendDirection::Horizontal => {
                for row in 0..rows {
                    scan_line(
                        (0..cols).map(|col| (row, col)),
                        position_color_map,
                        thresh,
                        min_length,
                        &mut trends,
                    );
                }
            }
            TrendDirection::Vertical => {
                for col in 0..cols {
                    scan_line(
                        (0..rows).map(|row| (row, col)),
                        position_color_map,
                        thresh,
                        min_length,
                        &mut trends,
                    );
                }
            }
            TrendDirection::Diagonal => {
                // Descending diagonals anchored at column 0.
                for start_row in 0..rows {
                    let len = (rows - start_row).min(cols);
                    scan_line(
                        (0..len).map(|o| (start_row + o, o)),
                        position_color_map,
                        thresh,
                        min_length,
                        &mut trends,
                    );
                }
                // Descending diagonals anchored at row 0 (column 0 already covered).
                for start_col in 1..cols {
                    let len = rows.min(cols - start_col);
                    scan_line(
                        (0..len).map(|o| (o, start_col + o)),
                        position_color_map,
                        thresh,
                        min_length,
                        &mut trends,
                    );
                }
                // Ascending diagonals ending at the last column.
                for start_row in 0..rows {
                    let len = (rows - start_row).min(cols);
                    scan_line(
                        (0..len).map(|o| (start_row + o, cols - 1 - o)),
                        position_color_map,
                        thresh,
                        min_length,
                        &mut trends,
                    );
                }
                // Ascending diagonals anchored along row 0.
                for start_col in (0..cols.saturating_sub(1)).rev() {
                    let len = rows.min(start_col + 1);
                    scan_line(
                        (0..len).map(|o| (o, start_col - o)),
                        position_color_map,
                        thresh,
                        min_length,
                        &mut trends,
                    );
                }
            }
        }
        trends
    }

    /// Walks one scan line, extending or closing the current run cell by cell.
    fn scan_line(
        cells: impl Iterator<Item = Cell>,
        map: &PositionColorMap,
        thresh: f64,
        min_length: usize,
        out: &mut Vec<Trend>,
    ) {
        let mut current: Trend = Vec::new();
        let mut last_color: Option<&HexColor> = None;
        for cell in cells {
            let Some(color) = map.get(&cell) else {
                // Colorless cells neither break nor extend a run.
                continue;
            };
            match last_color {
                None => {
                    current.push(cell);
                    last_color = Some(color);
                }
                Some(previous) => {
                    if color_distance(color, previous) <= thresh {
                        current.push(cell);
                    } else {
                        if current.len() >= min_length {
                            out.push(std::mem::take(&mut current));
                        } else {
                            current.clear();
                        }
                        current.push(cell);
                    }
                    last_color = Some(color);
                }
            }
        }
        if current.len() >= min_length {
            out.push(current);
        }
    }

    /// Direction dispatcher: runs the enabled directions and unions their runs.
    /// Large grids with more than one enabled direction scan on parallel
    /// workers, one per direction, over the shared immutable map; any failure
    /// degrades to sequential scans with the same result set.
    pub fn detect_all_trends(
        cols: u32,
        rows: u32,
        position_color_map: Arc<PositionColorMap>,
        min_length: usize,
        similarity_pct: f64,
        directions: TrendDirections,
    ) -> Vec<Trend> {
        let enabled = directions.enabled();
        if enabled.is_empty() {
            return Vec::new();
        }

        let cell_count = cols as u64 * rows as u64;
        if cell_count >= PARALLEL_TRENDS_MIN_CELLS && enabled.len() > 1 {
            let inputs: Vec<(TrendDirection, Arc<PositionColorMap>)> = enabled
                .iter()
                .map(|&d| (d, Arc::clone(&position_color_map)))
                .collect();
            let workers = enabled.len().min(MAX_TREND_WORKERS);
            let outcome = worker_pool::dispatch_ordered(
                workers,
                inputs,
                move |(direction, map): &(TrendDirection, Arc<PositionColorMap>)| {
                    detect_trends(cols, rows, *direction, map, min_length, similarity_pct)
                },
            );
            match outcome {
                Some(results) => return results.into_iter().flatten().collect(),
                None => {
                    log::warn!("parallel trend detection unavailable; scanning sequentially");
                }
            }
        }

        enabled
            .iter()
            .flat_map(|&direction| {
                detect_trends(
                    cols,
                    rows,
                    direction,
                    &position_color_map,
                    min_length,
                    similarity_pct,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::trend_detector::{detect_all_trends, detect_trends};
    use super::*;
    use crate::core_modules::palette::{hash_string, hash_to_color};

    fn uniform_row(cols: u32, color: &str) -> PositionColorMap {
        (0..cols).map(|c| ((0, c), color.to_string())).collect()
    }

    #[test]
    fn a_uniform_row_is_one_maximal_trend() {
        let map = uniform_row(5, "#646464");
        let trends = detect_trends(5, 1, TrendDirection::Horizontal, &map, 3, 0.0);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0], vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
    }

    #[test]
    fn runs_below_min_length_are_never_reported() {
        let mut map = uniform_row(2, "#646464");
        map.insert((0, 2), "#ff0000".to_string());
        map.insert((0, 3), "#ff0000".to_string());
        let trends = detect_trends(4, 1, TrendDirection::Horizontal, &map, 3, 0.0);
        assert!(trends.is_empty());
        for trend in detect_trends(4, 1, TrendDirection::Horizontal, &map, 2, 0.0) {
            assert!(trend.len() >= 2);
        }
    }

    #[test]
    fn a_color_break_closes_the_run() {
        let mut map = uniform_row(3, "#646464");
        map.insert((0, 3), "#ff0000".to_string());
        map.insert((0, 4), "#ff0000".to_string());
        map.insert((0, 5), "#ff0000".to_string());
        let trends = detect_trends(6, 1, TrendDirection::Horizontal, &map, 3, 0.0);
        assert_eq!(trends.len(), 2);
        assert!(trends.contains(&vec![(0, 0), (0, 1), (0, 2)]));
        assert!(trends.contains(&vec![(0, 3), (0, 4), (0, 5)]));
    }

    #[test]
    fn colorless_cells_bridge_a_run_without_extending_it() {
        let mut map = PositionColorMap::new();
        for col in [0u32, 1, 3, 4] {
            map.insert((0, col), "#646464".to_string());
        }
        let trends = detect_trends(5, 1, TrendDirection::Horizontal, &map, 4, 0.0);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0], vec![(0, 0), (0, 1), (0, 3), (0, 4)]);
    }

    #[test]
    fn vertical_scans_walk_columns() {
        let map: PositionColorMap = (0..4).map(|r| ((r, 1), "#646464".to_string())).collect();
        let trends = detect_trends(3, 4, TrendDirection::Vertical, &map, 3, 0.0);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0], vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn diagonal_scans_cover_both_orientations() {
        // A descending run on the main diagonal and a disjoint ascending run on
        // the (3,0)..(0,3) anti-diagonal of a 4x4 grid.
        let mut map = PositionColorMap::new();
        for i in 0..3u32 {
            map.insert((i, i), "#646464".to_string());
        }
        for i in 0..4u32 {
            map.insert((3 - i, i), "#a03cc8".to_string());
        }
        let trends = detect_trends(4, 4, TrendDirection::Diagonal, &map, 3, 0.0);
        assert!(trends.contains(&vec![(0, 0), (1, 1), (2, 2)]));
        assert!(trends.contains(&vec![(0, 3), (1, 2), (2, 1), (3, 0)]));
    }

    #[test]
    fn consecutive_similar_pairs_extend_one_run() {
        // Each neighbor is within the threshold of the previous kept color.
        let mut map = PositionColorMap::new();
        map.insert((0, 0), "#505050".to_string());
        map.insert((0, 1), "#5a5a5a".to_string());
        map.insert((0, 2), "#646464".to_string());
        let thresh_pct = 100.0 * 18.0 / max_color_distance();
        let trends = detect_trends(3, 1, TrendDirection::Horizontal, &map, 3, thresh_pct);
        assert_eq!(trends.len(), 1);
    }

    #[test]
    fn dispatcher_unions_enabled_directions() {
        let mut map = PositionColorMap::new();
        for i in 0..3u32 {
            map.insert((0, i), "#646464".to_string());
            map.insert((i, 0), "#646464".to_string());
        }
        let map = Arc::new(map);
        let all = detect_all_trends(3, 3, Arc::clone(&map), 3, 0.0, TrendDirections::default());
        assert!(all.contains(&vec![(0, 0), (0, 1), (0, 2)]));
        assert!(all.contains(&vec![(0, 0), (1, 0), (2, 0)]));

        let none = detect_all_trends(
            3,
            3,
            map,
            3,
            0.0,
            TrendDirections {
                horizontal: false,
                vertical: false,
                diagonal: false,
            },
        );
        assert!(none.is_empty());
    }

    #[test]
    fn parallel_dispatch_matches_sequential_scans() {
        // 400 x 300 = 120k cells, above the parallel threshold. Colors come from
        // the deterministic hash so both paths see the same map.
        let (cols, rows) = (400u32, 300u32);
        let mut map = PositionColorMap::new();
        for row in 0..rows {
            for col in 0..cols {
                let color = hash_to_color(hash_string(&format!("{}", (row + col) % 7)));
                map.insert((row, col), color);
            }
        }
        let map = Arc::new(map);
        let directions = TrendDirections::default();

        let parallel = detect_all_trends(cols, rows, Arc::clone(&map), 3, 20.0, directions);
        let mut sequential: Vec<Trend> = directions
            .enabled()
            .iter()
            .flat_map(|&d| detect_trends(cols, rows, d, &map, 3, 20.0))
            .collect();
        let mut parallel = parallel;
        parallel.sort();
        sequential.sort();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn position_color_map_skips_invalid_positions() {
        let positions = vec![
            PixelPosition {
                token: "a".to_string(),
                row: 0,
                col: 0,
                x: 0,
                y: 0,
                valid: true,
            },
            PixelPosition {
                token: "a".to_string(),
                row: 0,
                col: 1,
                x: 10,
                y: 0,
                valid: false,
            },
        ];
        let mut colors = ColorMap::new();
        colors.insert("a".to_string(), "#646464".to_string());
        let display = ColorMap::new();
        let map = build_position_color_map(&positions, &display, &colors);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&(0, 0)], "#646464");
    }

    #[test]
    fn display_colors_win_over_raw_token_colors() {
        let positions = vec![PixelPosition {
            token: "a".to_string(),
            row: 0,
            col: 0,
            x: 0,
            y: 0,
            valid: true,
        }];
        let mut colors = ColorMap::new();
        colors.insert("a".to_string(), "#646464".to_string());
        let mut display = ColorMap::new();
        display.insert("a".to_string(), "#4b4b4b".to_string());
        let map = build_position_color_map(&positions, &display, &colors);
        assert_eq!(map[&(0, 0)], "#4b4b4b");
    }
}
