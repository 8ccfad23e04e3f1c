use kleplate_core::Polygon;

use crate::{Drawing, fmt_fixed};

const DECIMALS: usize = 3;
const STROKE: &str = r##"fill="none" stroke="#000" stroke-width="0.1""##;

fn num(v: f64) -> String {
    fmt_fixed(v, DECIMALS)
}

/// Path data for a set of closed rings, one `M … Z` subpath each.
fn path_data<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> String {
    let mut d = String::new();
    for polygon in polygons {
        for (i, p) in polygon.points().iter().enumerate() {
            if !d.is_empty() {
                d.push(' ');
            }
            d.push_str(if i == 0 { "M " } else { "L " });
            d.push_str(&num(p.x));
            d.push(' ');
            d.push_str(&num(p.y));
        }
        d.push_str(" Z");
    }
    d
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Y-down SVG whose viewBox is the padded drawing frame, sized in millimetres.
#[must_use]
pub fn to_svg(drawing: &Drawing) -> String {
    let frame = drawing.frame();
    let width = num(frame.width());
    let height = num(frame.height());

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}mm\" height=\"{height}mm\" viewBox=\"{} {} {width} {height}\">\n",
        num(frame.min.x),
        num(frame.min.y),
    ));
    out.push_str(&format!(
        "  <path id=\"outline\" d=\"{}\" {STROKE}/>\n",
        path_data([&drawing.outline])
    ));
    if !drawing.cutouts.is_empty() {
        out.push_str(&format!(
            "  <path id=\"cutouts\" d=\"{}\" {STROKE}/>\n",
            path_data(&drawing.cutouts)
        ));
    }
    for layer in drawing.layers.iter().filter(|l| !l.polygons.is_empty()) {
        out.push_str(&format!("  <g id=\"{}\">\n", escape_attr(&layer.name)));
        for polygon in &layer.polygons {
            out.push_str(&format!(
                "    <path d=\"{}\" {STROKE}/>\n",
                path_data([polygon])
            ));
        }
        out.push_str("  </g>\n");
    }
    out.push_str("</svg>\n");
    out
}
