use kleplate_core::Vec2;

use crate::{Drawing, fmt_fixed};

const DECIMALS: usize = 4;

fn push_pair(out: &mut String, code: i32, value: impl AsRef<str>) {
    out.push_str(&code.to_string());
    out.push('\n');
    out.push_str(value.as_ref());
    out.push('\n');
}

fn push_pair_f64(out: &mut String, code: i32, value: f64) {
    push_pair(out, code, fmt_fixed(value, DECIMALS));
}

/// Point in DXF space: Y grows upwards.
fn push_point(out: &mut String, x_code: i32, p: Vec2) {
    push_pair_f64(out, x_code, p.x);
    push_pair_f64(out, x_code + 10, -p.y);
}

/// Minimal ASCII DXF (millimetres) with one `LINE` per polygon edge.
#[must_use]
pub fn to_dxf(drawing: &Drawing) -> String {
    let frame = drawing.frame();
    let layers = drawing.layered();
    let mut out = String::new();

    push_pair(&mut out, 0, "SECTION");
    push_pair(&mut out, 2, "HEADER");
    push_pair(&mut out, 9, "$INSUNITS");
    push_pair(&mut out, 70, "4"); // millimeters
    // Flipping Y swaps which corner is the minimum.
    push_pair(&mut out, 9, "$EXTMIN");
    push_point(&mut out, 10, Vec2::new(frame.min.x, frame.max.y));
    push_pair(&mut out, 9, "$EXTMAX");
    push_point(&mut out, 10, Vec2::new(frame.max.x, frame.min.y));
    push_pair(&mut out, 0, "ENDSEC");

    push_pair(&mut out, 0, "SECTION");
    push_pair(&mut out, 2, "TABLES");
    push_pair(&mut out, 0, "TABLE");
    push_pair(&mut out, 2, "LAYER");
    push_pair(&mut out, 70, layers.len().to_string());
    for (name, _) in &layers {
        push_pair(&mut out, 0, "LAYER");
        push_pair(&mut out, 2, name);
        push_pair(&mut out, 70, "0");
        push_pair(&mut out, 62, "7");
        push_pair(&mut out, 6, "CONTINUOUS");
    }
    push_pair(&mut out, 0, "ENDTAB");
    push_pair(&mut out, 0, "ENDSEC");

    push_pair(&mut out, 0, "SECTION");
    push_pair(&mut out, 2, "ENTITIES");
    for (name, polygons) in &layers {
        for polygon in polygons {
            for (a, b) in polygon.edges() {
                push_pair(&mut out, 0, "LINE");
                push_pair(&mut out, 8, name);
                push_point(&mut out, 10, a);
                push_point(&mut out, 11, b);
            }
        }
    }
    push_pair(&mut out, 0, "ENDSEC");
    push_pair(&mut out, 0, "EOF");
    out
}
