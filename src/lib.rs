// THEORY:
// This file is the main entry point for the `token_mosaic` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (front-ends, export workers,
// alternative renderers).
//
// The primary goal is to export the `MosaicPipeline` and its associated data
// structures (`MosaicConfig`, `MosaicFrame`, etc.) as the clean, high-level
// interface for the entire engine. The individual stages live in
// `core_modules` and remain directly accessible for callers that only need one
// piece — tokenization, say, or trend detection over an existing grid.

pub mod core_modules;
pub mod pipeline;
pub mod worker_pool;

// Re-export key data structures for the public API.
pub use crate::core_modules::canvas::{canvas_size, CanvasInfo, Shape};
pub use crate::core_modules::layout::{generate_positions, is_valid_position, Pattern, PixelPosition};
pub use crate::core_modules::palette::{
    fill_color_map, get_or_assign_color, ColorMap, ColorMode,
};
pub use crate::core_modules::tokenizer::{tokenize, Token, TokenizeMode};
pub use crate::core_modules::trends::{
    build_position_color_map, trend_detector, Cell, PositionColorMap, Trend, TrendDirection,
    TrendDirections,
};
pub use crate::pipeline::{MosaicConfig, MosaicFrame, MosaicPipeline};
