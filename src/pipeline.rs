// THEORY:
// The `pipeline` module is the final, top-level API for the entire mosaic
// engine. It encapsulates the full stack — tokenization, color assignment,
// similarity emphasis, canvas geometry, pattern layout, validity filtering and
// trend detection — behind a single, easy-to-use interface that a front-end or
// export worker can drive with one call per document.

use crate::core_modules::canvas::{self, CanvasInfo, Shape};
use crate::core_modules::emphasis;
use crate::core_modules::layout::{self, Pattern, PixelPosition};
use crate::core_modules::palette::{self, ColorMap, ColorMode};
use crate::core_modules::render::{self, TrendHighlight};
use crate::core_modules::tokenizer::{self, TokenizeMode};
use crate::core_modules::trends::{
    build_position_color_map, trend_detector, Cell, PositionColorMap, Trend, TrendDirections,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Configuration for the MosaicPipeline, allowing for tunable behavior. Every
/// field mirrors a knob the interactive front-end persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicConfig {
    pub tokenize_mode: TokenizeMode,
    pub custom_separator: String,
    pub color_mode: ColorMode,
    /// Side of one grid cell in canvas pixels.
    pub pixel_size: u32,
    pub shape: Shape,
    pub pattern: Pattern,
    pub emphasize_similarity: bool,
    /// Similarity threshold for emphasis, in percent of the max RGB distance.
    pub similarity_threshold: f64,
    pub highlight_trends: bool,
    pub trend_directions: TrendDirections,
    /// Minimum cells per reported trend.
    pub trend_min_length: usize,
    /// Trend similarity threshold, in percent of the max RGB distance.
    pub trend_similarity: f64,
    /// Highlight overlay opacity, in percent.
    pub trend_opacity: f64,
    /// Highlight overlay color as `#rrggbb`.
    pub highlight_color: String,
    /// Uniform scale applied when rendering to an image, clamped to [1, 512].
    pub export_scale: f64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            tokenize_mode: TokenizeMode::Words,
            custom_separator: ",".to_string(),
            color_mode: ColorMode::Standard,
            pixel_size: 10,
            shape: Shape::Square,
            pattern: Pattern::RowMajor,
            emphasize_similarity: false,
            similarity_threshold: 50.0,
            highlight_trends: false,
            trend_directions: TrendDirections::default(),
            trend_min_length: 3,
            trend_similarity: 30.0,
            trend_opacity: 50.0,
            highlight_color: "#ffff00".to_string(),
            export_scale: 4.0,
        }
    }
}

/// The complete result of one pass over a document.
#[derive(Debug, Clone)]
pub struct MosaicFrame {
    pub token_count: usize,
    pub canvas: CanvasInfo,
    /// Every token occurrence with its grid cell and validity flag.
    pub positions: Vec<PixelPosition>,
    /// Display colors after the emphasis pass (a copy when emphasis is off).
    pub display_map: ColorMap,
    /// Resolved color per valid cell; shared with trend workers.
    pub position_colors: Arc<PositionColorMap>,
    /// Detected trends; empty when trend highlighting is off.
    pub trends: Vec<Trend>,
    /// Union of all trend cells, ready for the renderer's overlay.
    pub trend_cells: HashSet<Cell>,
}

/// The main, top-level struct for the mosaic engine. Owns the long-lived
/// token→color accumulator so random-mode colors stay stable across passes
/// until explicitly cleared.
pub struct MosaicPipeline {
    config: MosaicConfig,
    token_colors: ColorMap,
}

impl MosaicPipeline {
    pub fn new(config: MosaicConfig) -> Self {
        Self {
            config,
            token_colors: ColorMap::new(),
        }
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Replaces the configuration. The color accumulator is kept; callers that
    /// change the color mode usually want `clear_colors` as well.
    pub fn set_config(&mut self, config: MosaicConfig) {
        self.config = config;
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.token_colors
    }

    /// Merge point for imported mappings and other external color edits.
    pub fn color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.token_colors
    }

    /// Drops every assigned color so the next pass re-rolls random-mode colors.
    pub fn clear_colors(&mut self) {
        self.token_colors.clear();
    }

    /// Runs the full pass over one document and returns everything the
    /// renderer and export layers consume.
    pub fn process(&mut self, text: &str) -> MosaicFrame {
        // Stage 1: Tokenization
        let tokens = tokenizer::tokenize(
            text,
            self.config.tokenize_mode,
            &self.config.custom_separator,
        );

        // Stage 2: Color Assignment (bulk fill; existing entries are kept)
        palette::fill_color_map(&tokens, self.config.color_mode, &mut self.token_colors);

        // Stage 3: Similarity Emphasis
        let display_map = emphasis::emphasize_similar_colors(
            &self.token_colors,
            self.config.similarity_threshold,
            self.config.emphasize_similarity,
        );

        // Stage 4: Geometry, Layout & Validity
        let canvas = canvas::canvas_size(tokens.len(), self.config.pixel_size, self.config.shape);
        let mut positions = layout::generate_positions(
            &tokens,
            &canvas,
            self.config.pattern,
            self.config.pixel_size,
        );
        for p in positions.iter_mut() {
            p.valid = layout::is_valid_position(p, &canvas, self.config.shape, self.config.pixel_size);
        }

        // Stage 5: Position Colors & Trend Detection
        let position_colors = Arc::new(build_position_color_map(
            &positions,
            &display_map,
            &self.token_colors,
        ));
        let trends = if self.config.highlight_trends {
            trend_detector::detect_all_trends(
                canvas.cols,
                canvas.rows,
                Arc::clone(&position_colors),
                self.config.trend_min_length,
                self.config.trend_similarity,
                self.config.trend_directions,
            )
        } else {
            Vec::new()
        };
        let trend_cells: HashSet<Cell> = trends.iter().flatten().copied().collect();

        MosaicFrame {
            token_count: tokens.len(),
            canvas,
            positions,
            display_map,
            position_colors,
            trends,
            trend_cells,
        }
    }

    /// Renders a processed frame to an RGB image using the configured export
    /// scale (clamped to the output-dimension cap) and trend overlay.
    pub fn render(&self, frame: &MosaicFrame) -> image::RgbImage {
        let scale =
            render::clamp_export_scale(&frame.canvas, self.config.export_scale.clamp(1.0, 512.0));
        let highlight = if self.config.highlight_trends {
            Some(TrendHighlight {
                cells: &frame.trend_cells,
                color: &self.config.highlight_color,
                opacity: (self.config.trend_opacity / 100.0).clamp(0.0, 1.0),
            })
        } else {
            None
        };
        render::draw_canvas(
            &frame.positions,
            &frame.canvas,
            &frame.display_map,
            &self.token_colors,
            self.config.pixel_size,
            highlight,
            scale,
        )
    }
}
