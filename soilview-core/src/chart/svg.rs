use std::fmt::Write;

use super::{Anchor, Chart, Mark};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn anchor(a: Anchor) -> &'static str {
    match a {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn write_mark(out: &mut String, mark: &Mark) -> std::fmt::Result {
    match mark {
        Mark::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => writeln!(
            out,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" fill="{}"/>"#,
            fill.hex()
        ),
        Mark::Polyline {
            points,
            stroke,
            stroke_width,
        } => {
            let coords = points
                .iter()
                .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(
                out,
                r#"<polyline points="{coords}" fill="none" stroke="{}" stroke-width="{stroke_width}"/>"#,
                stroke.hex()
            )
        }
        Mark::Line { from, to, stroke } => writeln!(
            out,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            stroke.hex()
        ),
        Mark::Circle {
            center,
            radius,
            fill,
        } => writeln!(
            out,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{radius}" fill="{}"/>"#,
            center.x,
            center.y,
            fill.hex()
        ),
        Mark::Text {
            at,
            text,
            anchor: a,
            size,
            rotate,
        } => {
            let transform = rotate
                .map(|deg| format!(r#" transform="rotate({deg} {:.2} {:.2})""#, at.x, at.y))
                .unwrap_or_default();
            writeln!(
                out,
                r#"<text x="{:.2}" y="{:.2}" font-size="{size}" text-anchor="{}"{transform}>{}</text>"#,
                at.x,
                at.y,
                anchor(*a),
                escape(text)
            )
        }
    }
}

fn write_group(out: &mut String, class: &str, marks: &[Mark]) -> std::fmt::Result {
    writeln!(out, r#"<g class="{class}">"#)?;
    for mark in marks {
        write_mark(out, mark)?;
    }
    writeln!(out, "</g>")
}

fn write_chart(out: &mut String, chart: &Chart) -> std::fmt::Result {
    let dims = chart.dimensions;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"#,
        dims.width, dims.height, dims.width, dims.height
    )?;
    writeln!(out, "<title>{}</title>", escape(&chart.title))?;
    writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        dims.margin.left, dims.margin.top
    )?;
    write_group(out, "plot", &chart.plot)?;
    write_group(out, "axes", &chart.axes)?;
    write_group(out, "legend", &chart.legend)?;
    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")
}

pub(super) fn render(chart: &Chart) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_chart(&mut out, chart);
    out
}
