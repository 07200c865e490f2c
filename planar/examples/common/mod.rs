// Each demo uses a different subset of these.
#![allow(dead_code)]

use kurbo::DEFAULT_ACCURACY;
use planar::{Coord, Envelope, Polygon};

/// A flattened subpath, and whether it was explicitly closed.
pub struct Polyline {
    pub points: Vec<Coord>,
    pub closed: bool,
}

pub fn svg_to_polylines(tree: &usvg::Tree) -> Vec<Polyline> {
    let mut ret = Vec::new();

    fn pt(p: usvg::tiny_skia_path::Point) -> kurbo::Point {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }

    fn finish(points: &mut Vec<Coord>, closed: bool, ret: &mut Vec<Polyline>) {
        if points.len() > 1 {
            ret.push(Polyline {
                points: std::mem::take(points),
                closed,
            });
        }
        points.clear();
    }

    fn add_group(group: &usvg::Group, ret: &mut Vec<Polyline>) {
        for child in group.children() {
            match child {
                usvg::Node::Group(group) => add_group(group, ret),
                usvg::Node::Path(path) => {
                    let kurbo_els = path.data().segments().map(|seg| match seg {
                        usvg::tiny_skia_path::PathSegment::MoveTo(p) => {
                            kurbo::PathEl::MoveTo(pt(p))
                        }
                        usvg::tiny_skia_path::PathSegment::LineTo(p) => {
                            kurbo::PathEl::LineTo(pt(p))
                        }
                        usvg::tiny_skia_path::PathSegment::QuadTo(p0, p1) => {
                            kurbo::PathEl::QuadTo(pt(p0), pt(p1))
                        }
                        usvg::tiny_skia_path::PathSegment::CubicTo(p0, p1, p2) => {
                            kurbo::PathEl::CurveTo(pt(p0), pt(p1), pt(p2))
                        }
                        usvg::tiny_skia_path::PathSegment::Close => kurbo::PathEl::ClosePath,
                    });

                    let mut points = Vec::<Coord>::new();
                    kurbo::flatten(kurbo_els, DEFAULT_ACCURACY, |el| match el {
                        kurbo::PathEl::MoveTo(p) => {
                            finish(&mut points, false, ret);
                            points.push(Coord::new(p.x, p.y));
                        }
                        kurbo::PathEl::LineTo(p) => {
                            points.push(Coord::new(p.x, p.y));
                        }
                        kurbo::PathEl::ClosePath => {
                            let p = points.first().copied();
                            if let Some(p) = p {
                                points.push(p);
                            }
                            finish(&mut points, true, ret);
                            if let Some(p) = p {
                                points.push(p);
                            }
                        }
                        kurbo::PathEl::QuadTo(..) | kurbo::PathEl::CurveTo(..) => unreachable!(),
                    });
                    finish(&mut points, false, ret);
                }
                _ => {}
            }
        }
    }

    add_group(tree.root(), &mut ret);
    ret
}

/// Starts a document whose view box fits `env`, with some padding.
pub fn document(env: &Envelope) -> svg::Document {
    let pad = 1.0 + 0.05 * env.width().max(env.height());
    svg::Document::new().set(
        "viewBox",
        (
            env.min_x - pad,
            env.min_y - pad,
            env.width() + 2.0 * pad,
            env.height() + 2.0 * pad,
        ),
    )
}

fn ring_data(data: svg::node::element::path::Data, ring: &[Coord]) -> svg::node::element::path::Data {
    let mut pts = ring.iter();
    let Some(p) = pts.next() else {
        return data;
    };
    let mut data = data.move_to((p.x, p.y));
    for p in pts {
        data = data.line_to((p.x, p.y));
    }
    data.close()
}

pub fn polygon_path(poly: &Polygon, fill: &str) -> svg::node::element::Path {
    let mut data = ring_data(svg::node::element::path::Data::new(), &poly.shell);
    for h in &poly.holes {
        data = ring_data(data, h);
    }
    svg::node::element::Path::new()
        .set("d", data)
        .set("fill", fill)
        .set("fill-rule", "evenodd")
}

pub fn line_path(line: &[Coord], stroke: &str) -> svg::node::element::Path {
    let mut data = svg::node::element::path::Data::new();
    let mut pts = line.iter();
    if let Some(p) = pts.next() {
        data = data.move_to((p.x, p.y));
        for p in pts {
            data = data.line_to((p.x, p.y));
        }
    }
    svg::node::element::Path::new()
        .set("d", data)
        .set("fill", "none")
        .set("stroke", stroke)
        .set("stroke-width", "0.5")
}
