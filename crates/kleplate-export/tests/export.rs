use kleplate_core::{Polygon, Vec2};
use kleplate_export::{Drawing, ExportFormat, export_file, render};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::new(vec![
        Vec2::new(x0, y0),
        Vec2::new(x1, y0),
        Vec2::new(x1, y1),
        Vec2::new(x0, y1),
    ])
    .unwrap()
}

fn sample() -> Drawing {
    Drawing::new(rect(0.0, 0.0, 40.0, 20.0))
        .with_cutouts(vec![rect(3.0, 3.0, 17.0, 17.0), rect(22.0, 3.0, 36.0, 17.0)])
}

/// Pairs of (group code, value) from DXF text.
fn dxf_pairs(text: &str) -> Vec<(i32, String)> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .chunks(2)
        .map(|c| (c[0].trim().parse().unwrap(), c[1].to_string()))
        .collect()
}

#[test]
fn output_is_byte_identical_across_runs() {
    for format in [ExportFormat::Svg, ExportFormat::Dxf] {
        let a = render(&sample(), format).unwrap();
        let b = render(&sample(), format).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn svg_frame_is_padded_and_sized_in_mm() {
    let svg = render(&sample(), ExportFormat::Svg).unwrap();
    assert!(
        svg.contains(r#"width="44.000mm" height="24.000mm" viewBox="-2.000 -2.000 44.000 24.000""#),
        "{svg}"
    );
    assert!(svg.contains(
        r#"<path id="outline" d="M 0.000 0.000 L 40.000 0.000 L 40.000 20.000 L 0.000 20.000 Z""#
    ));
    let cutouts = svg.lines().find(|l| l.contains(r#"id="cutouts""#)).unwrap();
    assert_eq!(cutouts.matches('Z').count(), 2);
}

#[test]
fn svg_writes_extra_layers_as_groups() {
    let drawing = Drawing::new(rect(0.0, 0.0, 10.0, 10.0))
        .with_layer("CASE_INNER", vec![rect(1.0, 1.0, 9.0, 9.0)]);
    let svg = render(&drawing, ExportFormat::Svg).unwrap();
    assert!(svg.contains(r#"<g id="CASE_INNER">"#));
    assert!(!svg.contains(r#"id="cutouts""#));
}

#[test]
fn dxf_flips_y_and_tags_layers() {
    let dxf = render(&sample(), ExportFormat::Dxf).unwrap();
    let pairs = dxf_pairs(&dxf);

    let insunits = pairs.iter().position(|(c, v)| *c == 9 && v == "$INSUNITS").unwrap();
    assert_eq!(pairs[insunits + 1], (70, "4".to_string()));

    let extmin = pairs.iter().position(|(c, v)| *c == 9 && v == "$EXTMIN").unwrap();
    assert_eq!(pairs[extmin + 1], (10, "-2.0000".to_string()));
    assert_eq!(pairs[extmin + 2], (20, "-22.0000".to_string()));
    let extmax = pairs.iter().position(|(c, v)| *c == 9 && v == "$EXTMAX").unwrap();
    assert_eq!(pairs[extmax + 1], (10, "42.0000".to_string()));
    assert_eq!(pairs[extmax + 2], (20, "2.0000".to_string()));

    let layer_names: Vec<&str> = pairs
        .windows(2)
        .filter(|w| w[0] == (0, "LAYER".to_string()) && w[1].0 == 2)
        .map(|w| w[1].1.as_str())
        .collect();
    assert_eq!(layer_names, vec!["OUTLINE", "CUTOUTS"]);

    let lines = pairs.iter().filter(|(c, v)| *c == 0 && v == "LINE").count();
    assert_eq!(lines, 12);

    // Second outline edge runs (40, 0) -> (40, 20), i.e. down to y = -20 in DXF space.
    let edge = pairs
        .iter()
        .enumerate()
        .filter(|(_, (c, v))| *c == 0 && v == "LINE")
        .nth(1)
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(pairs[edge + 1], (8, "OUTLINE".to_string()));
    assert_eq!(pairs[edge + 2], (10, "40.0000".to_string()));
    assert_eq!(pairs[edge + 3], (20, "0.0000".to_string()));
    assert_eq!(pairs[edge + 5], (21, "-20.0000".to_string()));
    assert_eq!(pairs.last().unwrap(), &(0, "EOF".to_string()));
}

#[test]
fn export_file_names_and_renders() {
    let file = export_file(&sample(), ExportFormat::Dxf, "switch-plate_", "corne.json").unwrap();
    assert_eq!(file.filename, "switch-plate_corne.dxf");
    assert_eq!(file.format, ExportFormat::Dxf);
    assert!(file.text.starts_with("0\nSECTION\n"));

    let json = serde_json::to_value(&file).unwrap();
    assert_eq!(json["format"], "dxf");
}
