//! Lowering of a small subset of SVG elements into path command streams.
//!
//! Supported elements: `<path>`, `<circle>`, `<ellipse>`, `<rect>` (with
//! optional corner radii), `<line>`, `<polyline>` and `<polygon>`. Container
//! and metadata elements contribute no geometry and are skipped, as are
//! shape elements whose radii or dimensions cannot produce a closed region.

use crate::parser::{self, ParseError, Source};
use crate::{Positioning, SvgCommand, SvgPath};

/// Parse an XML fragment, appending the geometry of every recognized child
/// element to `path`.
///
/// Each element is independent: a path element whose data begins with a
/// relative move-to is rewritten to start with an absolute one, so that it
/// cannot chain onto the previous element's endpoint.
pub fn append_document(path: &mut SvgPath, src: &str) -> Result<(), ParseError> {
    let mut rest = src;

    while let Some(open) = rest.find('<') {
        rest = &rest[open + 1..];

        if let Some(stripped) = rest.strip_prefix("!--") {
            match stripped.find("-->") {
                Some(end) => {
                    rest = &stripped[end + 3..];
                    continue;
                }
                None => return Err(ParseError::UnexpectedEnd),
            }
        }

        if rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('!') {
            match rest.find('>') {
                Some(end) => {
                    rest = &rest[end + 1..];
                    continue;
                }
                None => return Err(ParseError::UnexpectedEnd),
            }
        }

        let name_end = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-' && c != ':')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        let after_name = &rest[name_end..];

        let tag_end = find_tag_end(after_name).ok_or(ParseError::UnexpectedEnd)?;
        let attrs = &after_name[..tag_end];

        match name {
            "path" => append_path_element(path, attrs)?,
            "circle" => append_circle(path, attrs)?,
            "ellipse" => append_ellipse(path, attrs)?,
            "rect" => append_rect(path, attrs)?,
            "line" => append_line(path, attrs)?,
            "polyline" => append_poly(path, attrs, false)?,
            "polygon" => append_poly(path, attrs, true)?,
            _ => {}
        }

        rest = &after_name[tag_end + 1..];
    }

    Ok(())
}

/// Index of the closing `>` of a tag, ignoring `>` inside quoted attribute
/// values.
fn find_tag_end(src: &str) -> Option<usize> {
    let mut quote = None;

    for (i, c) in src.char_indices() {
        match (quote, c) {
            (None, '>') => return Some(i),
            (None, '"') | (None, '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }

    None
}

/// Look up one attribute value in the raw attribute region of a tag.
fn attribute<'l>(attrs: &'l str, name: &str) -> Result<Option<&'l str>, ParseError> {
    let malformed = || ParseError::MalformedAttribute {
        name: name.to_string(),
    };

    let mut rest = attrs;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('/') {
            return Ok(None);
        }

        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start();

        if !rest.starts_with('=') {
            // Attribute without a value (or a stray token); skip it.
            if key == name {
                return Err(malformed());
            }
            continue;
        }
        rest = rest[1..].trim_start();

        let quote = match rest.chars().next() {
            Some(q @ '"') | Some(q @ '\'') => q,
            _ => return Err(malformed()),
        };
        rest = &rest[1..];

        let value_end = match rest.find(quote) {
            Some(i) => i,
            None => return Err(malformed()),
        };
        let value = &rest[..value_end];
        rest = &rest[value_end + 1..];

        if key == name {
            return Ok(Some(value));
        }
    }
}

fn number_attribute(attrs: &str, name: &str, default: f32) -> Result<f32, ParseError> {
    match attribute(attrs, name)? {
        Some(value) => value
            .trim()
            .trim_end_matches("px")
            .parse::<f32>()
            .map_err(|_| ParseError::MalformedAttribute {
                name: name.to_string(),
            }),
        None => Ok(default),
    }
}

fn append_path_element(path: &mut SvgPath, attrs: &str) -> Result<(), ParseError> {
    let d = match attribute(attrs, "d")? {
        Some(d) => d,
        None => return Ok(()),
    };

    let first = path.num_commands();
    parser::parse_source(path, &mut Source::new(d))?;
    path.make_move_to_absolute(first);

    Ok(())
}

fn append_circle(path: &mut SvgPath, attrs: &str) -> Result<(), ParseError> {
    let cx = number_attribute(attrs, "cx", 0.0)?;
    let cy = number_attribute(attrs, "cy", 0.0)?;
    let r = number_attribute(attrs, "r", 0.0)?;

    append_ellipse_commands(path, cx, cy, r, r)
}

fn append_ellipse(path: &mut SvgPath, attrs: &str) -> Result<(), ParseError> {
    let cx = number_attribute(attrs, "cx", 0.0)?;
    let cy = number_attribute(attrs, "cy", 0.0)?;
    let rx = number_attribute(attrs, "rx", 0.0)?;
    let ry = number_attribute(attrs, "ry", 0.0)?;

    append_ellipse_commands(path, cx, cy, rx, ry)
}

// Two semicircular arcs; see the parser's packed arc operand layout.
fn append_ellipse_commands(
    path: &mut SvgPath,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
) -> Result<(), ParseError> {
    if rx <= 0.0 || ry <= 0.0 {
        log::debug!("skipping ellipse with non-positive radii {}x{}", rx, ry);
        return Ok(());
    }

    path.push(SvgCommand::MoveTo(Positioning::Absolute), &[cx + rx, cy])?;
    path.push(
        SvgCommand::ArcTo(Positioning::Absolute),
        &[rx, ry, 0.0, 0.0, 1.0, cx - rx, cy],
    )?;
    path.push(
        SvgCommand::ArcTo(Positioning::Absolute),
        &[rx, ry, 0.0, 0.0, 1.0, cx + rx, cy],
    )?;
    path.push(SvgCommand::Close, &[])?;

    Ok(())
}

fn append_rect(path: &mut SvgPath, attrs: &str) -> Result<(), ParseError> {
    let x = number_attribute(attrs, "x", 0.0)?;
    let y = number_attribute(attrs, "y", 0.0)?;
    let w = number_attribute(attrs, "width", 0.0)?;
    let h = number_attribute(attrs, "height", 0.0)?;

    if w <= 0.0 || h <= 0.0 {
        log::debug!("skipping rect with non-positive size {}x{}", w, h);
        return Ok(());
    }

    // Per SVG, a missing corner radius defaults to the other one.
    let rx_attr = attribute(attrs, "rx")?.is_some();
    let ry_attr = attribute(attrs, "ry")?.is_some();
    let mut rx = number_attribute(attrs, "rx", 0.0)?;
    let mut ry = number_attribute(attrs, "ry", 0.0)?;
    if rx_attr && !ry_attr {
        ry = rx;
    }
    if ry_attr && !rx_attr {
        rx = ry;
    }
    rx = rx.min(w / 2.0);
    ry = ry.min(h / 2.0);

    let abs = Positioning::Absolute;

    if rx <= 0.0 || ry <= 0.0 {
        path.push(SvgCommand::MoveTo(abs), &[x, y])?;
        path.push(SvgCommand::LineTo(abs), &[x + w, y])?;
        path.push(SvgCommand::LineTo(abs), &[x + w, y + h])?;
        path.push(SvgCommand::LineTo(abs), &[x, y + h])?;
        path.push(SvgCommand::Close, &[])?;
        return Ok(());
    }

    let arc = |to_x: f32, to_y: f32| [rx, ry, 0.0, 0.0, 1.0, to_x, to_y];

    path.push(SvgCommand::MoveTo(abs), &[x + rx, y])?;
    path.push(SvgCommand::LineTo(abs), &[x + w - rx, y])?;
    path.push(SvgCommand::ArcTo(abs), &arc(x + w, y + ry))?;
    path.push(SvgCommand::LineTo(abs), &[x + w, y + h - ry])?;
    path.push(SvgCommand::ArcTo(abs), &arc(x + w - rx, y + h))?;
    path.push(SvgCommand::LineTo(abs), &[x + rx, y + h])?;
    path.push(SvgCommand::ArcTo(abs), &arc(x, y + h - ry))?;
    path.push(SvgCommand::LineTo(abs), &[x, y + ry])?;
    path.push(SvgCommand::ArcTo(abs), &arc(x + rx, y))?;
    path.push(SvgCommand::Close, &[])?;

    Ok(())
}

fn append_line(path: &mut SvgPath, attrs: &str) -> Result<(), ParseError> {
    let x1 = number_attribute(attrs, "x1", 0.0)?;
    let y1 = number_attribute(attrs, "y1", 0.0)?;
    let x2 = number_attribute(attrs, "x2", 0.0)?;
    let y2 = number_attribute(attrs, "y2", 0.0)?;

    path.push(SvgCommand::MoveTo(Positioning::Absolute), &[x1, y1])?;
    path.push(SvgCommand::LineTo(Positioning::Absolute), &[x2, y2])?;

    Ok(())
}

fn append_poly(path: &mut SvgPath, attrs: &str, close: bool) -> Result<(), ParseError> {
    let malformed = || ParseError::MalformedAttribute {
        name: "points".to_string(),
    };

    let points = match attribute(attrs, "points")? {
        Some(points) => points,
        None => return Ok(()),
    };

    let mut values = points
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());

    let mut pairs = Vec::new();
    while let Some(x) = values.next() {
        let y = values.next().ok_or_else(malformed)?;
        let x = x.parse::<f32>().map_err(|_| malformed())?;
        let y = y.parse::<f32>().map_err(|_| malformed())?;
        pairs.push([x, y]);
    }

    if pairs.len() < 2 {
        log::debug!("skipping poly element with {} point(s)", pairs.len());
        return Ok(());
    }

    path.push(SvgCommand::MoveTo(Positioning::Absolute), &pairs[0])?;
    for pair in &pairs[1..] {
        path.push(SvgCommand::LineTo(Positioning::Absolute), pair)?;
    }
    if close {
        path.push(SvgCommand::Close, &[])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_lowering() {
        let mut path = SvgPath::new();
        append_document(&mut path, r#"<circle cx="12" cy="12" r="10"/>"#).unwrap();

        assert_eq!(
            path.commands(),
            &[
                SvgCommand::MoveTo(Positioning::Absolute),
                SvgCommand::ArcTo(Positioning::Absolute),
                SvgCommand::ArcTo(Positioning::Absolute),
                SvgCommand::Close,
            ]
        );
        // First move-to lands on the right-most point of the circle.
        assert_eq!(&path.data()[..2], &[22.0, 12.0]);
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut path = SvgPath::new();
        append_document(
            &mut path,
            r#"<circle cx="1" cy="1" r="0"/>
               <rect width="0" height="10"/>
               <ellipse cx="0" cy="0" rx="4" ry="-1"/>"#,
        )
        .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn rect_lowering() {
        let mut path = SvgPath::new();
        append_document(&mut path, r#"<rect x="1" y="2" width="3" height="4"/>"#).unwrap();

        assert_eq!(
            path.commands(),
            &[
                SvgCommand::MoveTo(Positioning::Absolute),
                SvgCommand::LineTo(Positioning::Absolute),
                SvgCommand::LineTo(Positioning::Absolute),
                SvgCommand::LineTo(Positioning::Absolute),
                SvgCommand::Close,
            ]
        );
        assert_eq!(path.data(), &[1.0, 2.0, 4.0, 2.0, 4.0, 6.0, 1.0, 6.0]);
    }

    #[test]
    fn rounded_rect_lowering() {
        let mut path = SvgPath::new();
        append_document(
            &mut path,
            r#"<rect x="0" y="0" width="10" height="10" rx="2"/>"#,
        )
        .unwrap();

        use SvgCommand::{ArcTo, Close, LineTo, MoveTo};
        use Positioning::Absolute as A;
        assert_eq!(
            path.commands(),
            &[
                MoveTo(A),
                LineTo(A),
                ArcTo(A),
                LineTo(A),
                ArcTo(A),
                LineTo(A),
                ArcTo(A),
                LineTo(A),
                ArcTo(A),
                Close,
            ]
        );
    }

    #[test]
    fn polygon_lowering() {
        let mut path = SvgPath::new();
        append_document(&mut path, r#"<polygon points="0,0 10 0,10,10"/>"#).unwrap();

        assert_eq!(
            path.commands(),
            &[
                SvgCommand::MoveTo(Positioning::Absolute),
                SvgCommand::LineTo(Positioning::Absolute),
                SvgCommand::LineTo(Positioning::Absolute),
                SvgCommand::Close,
            ]
        );
    }

    #[test]
    fn odd_point_count_is_malformed() {
        let mut path = SvgPath::new();
        assert!(matches!(
            append_document(&mut path, r#"<polyline points="0 0 1"/>"#),
            Err(ParseError::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn leading_relative_move_to_is_made_absolute() {
        let mut path = SvgPath::new();
        append_document(
            &mut path,
            r#"<path d="M 10 10 L 20 20"/><path d="m 1 1 l 2 2"/>"#,
        )
        .unwrap();

        assert_eq!(
            path.commands()[2],
            SvgCommand::MoveTo(Positioning::Absolute)
        );
        // Only the leading move-to is rewritten.
        assert_eq!(path.commands()[3], SvgCommand::LineTo(Positioning::Relative));
    }

    #[test]
    fn containers_and_unknown_elements_are_skipped() {
        let mut path = SvgPath::new();
        append_document(
            &mut path,
            r#"<?xml version="1.0"?>
               <!-- icon -->
               <svg viewBox="0 0 24 24">
                 <title>star</title>
                 <line x1="0" y1="0" x2="4" y2="4"/>
               </svg>"#,
        )
        .unwrap();

        assert_eq!(
            path.commands(),
            &[
                SvgCommand::MoveTo(Positioning::Absolute),
                SvgCommand::LineTo(Positioning::Absolute),
            ]
        );
    }

    #[test]
    fn malformed_attribute_fails() {
        let mut path = SvgPath::new();
        assert!(matches!(
            append_document(&mut path, r#"<circle cx="abc" cy="0" r="5"/>"#),
            Err(ParseError::MalformedAttribute { .. })
        ));
        assert!(matches!(
            append_document(&mut path, r#"<rect width="3" height=4/>"#),
            Err(ParseError::MalformedAttribute { .. })
        ));
    }
}
