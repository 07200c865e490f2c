use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use planar::{overlay, BooleanOp, Envelope, FillRule, Geometry, OverlayOptions, PrecisionModel};

mod common;

#[derive(Copy, Clone, Debug)]
struct Op(BooleanOp);

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Op(BooleanOp::Union)),
            "intersection" => Ok(Op(BooleanOp::Intersection)),
            "difference" => Ok(Op(BooleanOp::Difference)),
            "xor" => Ok(Op(BooleanOp::Xor)),
            _ => Err(format!("unknown op {s}")),
        }
    }
}

/// Combines the closed paths of two SVG files.
#[derive(Parser)]
struct Args {
    input_a: PathBuf,
    input_b: PathBuf,
    output: PathBuf,

    #[arg(long)]
    op: Op,

    #[arg(long)]
    non_zero: bool,

    /// Round the result to a grid with this many cells per unit.
    #[arg(long)]
    scale: Option<f64>,
}

fn read(path: &PathBuf) -> anyhow::Result<Geometry> {
    let input = std::fs::read_to_string(path)?;
    let tree = usvg::Tree::from_str(&input, &usvg::Options::default())?;
    let lines = common::svg_to_polylines(&tree)
        .into_iter()
        .map(|mut l| {
            // Every path counts as closed.
            if !l.closed {
                l.points.push(l.points[0]);
            }
            Geometry::LineString(l.points)
        })
        .collect();
    Ok(Geometry::Collection(lines))
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let a = read(&args.input_a)?;
    let b = read(&args.input_b)?;

    let options = OverlayOptions {
        fill_rule: if args.non_zero {
            FillRule::NonZero
        } else {
            FillRule::EvenOdd
        },
        precision: match args.scale {
            Some(scale) => PrecisionModel::fixed(scale)?,
            None => PrecisionModel::Floating,
        },
    };
    let polys = overlay(&a, &b, args.op.0, &options)?;

    let mut env = Envelope::null();
    env.merge(&a.envelope());
    env.merge(&b.envelope());
    let mut document = common::document(&env);
    for poly in &polys {
        document = document.add(common::polygon_path(poly, "black"));
    }
    svg::save(&args.output, &document)?;
    println!("wrote {} polygons", polys.len());

    Ok(())
}
