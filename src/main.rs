// Example runner for the `token_mosaic` library: reads a text file, runs the
// full pipeline with the default configuration (plus trend highlighting), and
// writes the mosaic as a PNG. Optionally also writes the token→color mapping
// as JSON so a later run can reproduce the same palette.

use anyhow::{Context, Result};
use std::path::Path;
use token_mosaic::core_modules::{mapping, render};
use token_mosaic::{MosaicConfig, MosaicPipeline};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: token_mosaic <input.txt> [output.png] [mapping.json]");
        std::process::exit(2);
    };
    let output = args.next().unwrap_or_else(|| "mosaic.png".to_string());
    let mapping_path = args.next();

    let text =
        std::fs::read_to_string(&input).with_context(|| format!("reading input file {input}"))?;

    let mut pipeline = MosaicPipeline::new(MosaicConfig {
        highlight_trends: true,
        ..MosaicConfig::default()
    });
    let frame = pipeline.process(&text);
    println!(
        "{} tokens -> {} x {} grid, {} trends",
        frame.token_count,
        frame.canvas.cols,
        frame.canvas.rows,
        frame.trends.len()
    );

    let image = pipeline.render(&frame);
    render::save_png(Path::new(&output), &image)
        .with_context(|| format!("writing image to {output}"))?;
    println!("saved {output}");

    if let Some(path) = mapping_path {
        let json = mapping::export_color_map(pipeline.color_map())
            .context("serializing color mapping")?;
        std::fs::write(&path, json).with_context(|| format!("writing mapping to {path}"))?;
        println!("saved {path}");
    }

    Ok(())
}
