use std::path::PathBuf;

use clap::Parser;
use planar::{Polygonizer, PolygonizerOptions};

mod common;

/// Finds the polygons formed by the paths of an SVG file.
#[derive(Parser)]
struct Args {
    input: PathBuf,
    output: PathBuf,

    /// Assume the paths already meet only at their endpoints.
    #[arg(long)]
    noded: bool,
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let input = std::fs::read_to_string(&args.input)?;
    let tree = usvg::Tree::from_str(&input, &usvg::Options::default())?;
    let lines = common::svg_to_polylines(&tree);

    let mut polygonizer = Polygonizer::new(PolygonizerOptions {
        node_input: !args.noded,
    });
    for l in &lines {
        polygonizer.add_line(&l.points);
    }
    let result = polygonizer.result()?;

    let env = planar::Envelope::from_coords(lines.iter().flat_map(|l| &l.points));
    let mut document = common::document(&env);
    for (i, poly) in result.polygons.iter().enumerate() {
        let shade = 64 + (i * 37) % 160;
        let fill = format!("rgb({shade}, {shade}, 255)");
        document = document.add(common::polygon_path(poly, &fill));
    }
    for line in &result.dangles {
        document = document.add(common::line_path(line, "red"));
    }
    for line in &result.cut_edges {
        document = document.add(common::line_path(line, "orange"));
    }
    for line in &result.invalid_rings {
        document = document.add(common::line_path(line, "purple"));
    }
    svg::save(&args.output, &document)?;
    println!(
        "{} polygons, {} dangles, {} cut edges, {} invalid rings",
        result.polygons.len(),
        result.dangles.len(),
        result.cut_edges.len(),
        result.invalid_rings.len()
    );

    Ok(())
}
