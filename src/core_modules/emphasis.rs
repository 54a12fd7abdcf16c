// THEORY:
// The `emphasis` module is a stateless pass that exaggerates color clusters: it
// groups tokens whose assigned colors are close in RGB space and repaints every
// member of a group with the group's average, so clusters read as solid regions
// on the canvas instead of a speckle of near-identical hues.
//
// Key architectural principles:
// 1.  **Coarse Binning, Not Exact Clustering**: The similarity threshold is
//     converted to an axis-aligned 3-D bin edge (`thresh_dist / sqrt(3)`), and
//     every color is quantized into its bin by integer division per channel. One
//     pass, linear time, stable on maps with millions of distinct tokens.
// 2.  **Documented Approximation**: Bin edges are axis-aligned, so two colors on
//     opposite sides of an edge can differ by more than the nominal threshold and
//     land in different bins. That is the accepted cost of linear-time behavior,
//     not a defect.
// 3.  **Display Map, Not Source Map**: The input map is never mutated; the output
//     is a separate display map so the raw token colors stay available for export
//     and for re-running with a different threshold.

use crate::core_modules::color::color::{max_color_distance, rgb_to_hex, Rgb};
use crate::core_modules::palette::ColorMap;
use std::collections::HashMap;

struct Bin {
    tokens: Vec<String>,
    total_red: u64,
    total_green: u64,
    total_blue: u64,
}

/// Builds the display color map. Disabled or with a non-positive threshold this
/// is a plain copy; otherwise every token's display color becomes the mean RGB
/// of its similarity bin. Tokens whose stored color fails to parse are dropped
/// from the display map (the renderer treats them as colorless).
pub fn emphasize_similar_colors(
    color_map: &ColorMap,
    threshold_pct: f64,
    enabled: bool,
) -> ColorMap {
    if !enabled || threshold_pct <= 0.0 {
        return color_map.clone();
    }

    let thresh_dist = (threshold_pct / 100.0) * max_color_distance();
    let step = ((thresh_dist / 3.0_f64.sqrt()) as u32).max(1);

    let mut bins: HashMap<(u32, u32, u32), Bin> = HashMap::new();
    for (token, hex) in color_map {
        let Some(rgb) = Rgb::from_hex(hex) else {
            continue;
        };
        let key = (
            (rgb.red as u32 / step).min(255),
            (rgb.green as u32 / step).min(255),
            (rgb.blue as u32 / step).min(255),
        );
        let bin = bins.entry(key).or_insert_with(|| Bin {
            tokens: Vec::new(),
            total_red: 0,
            total_green: 0,
            total_blue: 0,
        });
        bin.tokens.push(token.clone());
        bin.total_red += rgb.red as u64;
        bin.total_green += rgb.green as u64;
        bin.total_blue += rgb.blue as u64;
    }

    let mut display = ColorMap::with_capacity(color_map.len());
    for bin in bins.into_values() {
        let count = bin.tokens.len() as f64;
        let average = rgb_to_hex(
            bin.total_red as f64 / count,
            bin.total_green as f64 / count,
            bin.total_blue as f64 / count,
        );
        for token in bin.tokens {
            display.insert(token, average.clone());
        }
    }
    display
}
