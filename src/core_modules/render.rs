// THEORY:
// The `render` module is the CPU reference renderer: it turns the validity-
// filtered positions and their resolved colors into an RGB image, one square
// block per cell. Accelerated fill backends can replace it behind the same
// inputs; this path is the semantic baseline they are measured against.
//
// Key architectural principles:
// 1.  **Exact Block Bounds**: Block edges are computed independently per cell
//     from (row, col) and the scale factor, so adjacent scaled blocks tile with
//     no gaps or seam lines regardless of rounding.
// 2.  **Graceful Color Handling**: A position whose token has no resolved color
//     is left unpainted; a malformed hex color paints mid-gray instead of
//     failing the whole image.
// 3.  **Highlight as a Blend**: Trend cells are not repainted — the highlight
//     color is alpha-blended over the cell's own color, so the underlying
//     palette stays readable through the overlay.

use crate::core_modules::canvas::CanvasInfo;
use crate::core_modules::color::color::Rgb;
use crate::core_modules::layout::PixelPosition;
use crate::core_modules::palette::ColorMap;
use crate::core_modules::trends::Cell;
use image::{ImageEncoder, RgbImage};
use std::collections::HashSet;
use std::path::Path;

/// Output images are clamped so neither side exceeds this many pixels.
pub const MAX_EXPORT_DIM: f64 = 32_768.0;

/// Trend-highlight overlay settings for one render pass.
pub struct TrendHighlight<'a> {
    /// Every cell belonging to at least one detected trend.
    pub cells: &'a HashSet<Cell>,
    /// Overlay color as `#rrggbb`.
    pub color: &'a str,
    /// Blend factor in [0, 1]; 0 leaves cells untouched.
    pub opacity: f64,
}

fn rgb_or_gray(hex: &str) -> Rgb {
    Rgb::from_hex(hex).unwrap_or(Rgb {
        red: 128,
        green: 128,
        blue: 128,
    })
}

fn blend(base: u8, overlay: u8, opacity: f64) -> u8 {
    (base as f64 * (1.0 - opacity) + overlay as f64 * opacity) as u8
}

/// Reduces `scale` just enough that the scaled canvas fits inside
/// `MAX_EXPORT_DIM` on both sides. A canvas already in bounds keeps its scale.
pub fn clamp_export_scale(canvas: &CanvasInfo, scale: f64) -> f64 {
    let out_w = canvas.width as f64 * scale;
    let out_h = canvas.height as f64 * scale;
    if out_w <= MAX_EXPORT_DIM && out_h <= MAX_EXPORT_DIM {
        return scale;
    }
    scale * (MAX_EXPORT_DIM / out_w).min(MAX_EXPORT_DIM / out_h)
}

/// Fills a white canvas with one block per valid, colored position. Display
/// colors win over raw token colors; trend cells are blended with the highlight
/// overlay when one is given.
pub fn draw_canvas(
    positions: &[PixelPosition],
    canvas: &CanvasInfo,
    display_map: &ColorMap,
    color_map: &ColorMap,
    pixel_size: u32,
    highlight: Option<TrendHighlight<'_>>,
    scale: f64,
) -> RgbImage {
    let width = ((canvas.width as f64 * scale) as u32).max(1);
    let height = ((canvas.height as f64 * scale) as u32).max(1);
    let mut image = RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));

    let overlay = highlight.as_ref().map(|h| rgb_or_gray(h.color));

    for p in positions {
        if !p.valid {
            continue;
        }
        let Some(hex) = display_map.get(&p.token).or_else(|| color_map.get(&p.token)) else {
            continue;
        };
        let mut rgb = rgb_or_gray(hex);
        if let (Some(h), Some(overlay)) = (highlight.as_ref(), overlay) {
            if h.cells.contains(&(p.row, p.col)) {
                rgb = Rgb {
                    red: blend(rgb.red, overlay.red, h.opacity),
                    green: blend(rgb.green, overlay.green, h.opacity),
                    blue: blend(rgb.blue, overlay.blue, h.opacity),
                };
            }
        }

        let x0 = (p.col as f64 * pixel_size as f64 * scale) as u32;
        let y0 = (p.row as f64 * pixel_size as f64 * scale) as u32;
        if x0 >= width || y0 >= height {
            continue;
        }
        let x1 = ((p.col + 1) as f64 * pixel_size as f64 * scale) as u32;
        let y1 = ((p.row + 1) as f64 * pixel_size as f64 * scale) as u32;
        let x1 = x1.clamp(x0 + 1, width);
        let y1 = y1.clamp(y0 + 1, height);

        let pixel = image::Rgb([rgb.red, rgb.green, rgb.blue]);
        for py in y0..y1 {
            for px in x0..x1 {
                image.put_pixel(px, py, pixel);
            }
        }
    }
    image
}

/// Encodes the image as PNG at `path`.
pub fn save_png(path: &Path, image: &RgbImage) -> Result<(), image::ImageError> {
    let output = std::fs::File::create(path)?;
    let encoder = image::codecs::png::PngEncoder::new(output);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
