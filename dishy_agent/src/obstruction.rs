//! Obstruction map rendering: SNR grid -> SVG with compass lettering.

use thiserror::Error;

pub const DEFAULT_OBSTRUCTED_COLOR: &str = "FFED524A";
pub const DEFAULT_UNOBSTRUCTED_COLOR: &str = "FF3E80E0";

#[derive(Debug, Error, PartialEq)]
pub enum ObstructionError {
    #[error("invalid SNR map data: zero-length")]
    Empty,
    #[error("invalid color '{0}'")]
    Color(String),
}

#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub obstructed: (u8, u8, u8),
    pub unobstructed: (u8, u8, u8),
    pub upscale: usize,
    pub font: String,
    pub font_size: u32,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            obstructed: (0xED, 0x52, 0x4A),
            unobstructed: (0x3E, 0x80, 0xE0),
            upscale: 4,
            font: "Arial".into(),
            font_size: 24,
        }
    }
}

/// Parse `AARRGGBB` or `RRGGBB`; alpha is ignored.
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8), ObstructionError> {
    let v = u32::from_str_radix(hex, 16).map_err(|_| ObstructionError::Color(hex.into()))?;
    Ok((((v >> 16) & 255) as u8, ((v >> 8) & 255) as u8, (v & 255) as u8))
}

fn blend(point: f64, obstructed: u8, unobstructed: u8) -> u8 {
    (point * unobstructed as f64 + (1.0 - point) * obstructed as f64).round() as u8
}

pub fn render_svg(snr: &[Vec<f64>], opts: &SvgOptions) -> Result<String, ObstructionError> {
    let Some(first) = snr.first() else {
        return Err(ObstructionError::Empty);
    };
    if first.is_empty() {
        return Err(ObstructionError::Empty);
    }

    let up = opts.upscale.max(1);
    let width = first.len() * up;
    let height = snr.len() * up;
    let fs = opts.font_size as f64;

    let mut out = String::with_capacity(snr.len() * first.len() * 96);
    out.push_str(&format!(
        "<svg width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    ));
    out.push_str(&format!(
        "<style>text {{ font-family: {}; font-size: {}px; color: #FFFFFF; }}</style>\n",
        opts.font, opts.font_size
    ));

    for (y, row) in snr.iter().enumerate() {
        for (x, &point) in row.iter().enumerate() {
            let fill = if point >= 0.0 {
                let p = point.min(1.0);
                let (o, u) = (opts.obstructed, opts.unobstructed);
                format!(
                    "rgb({},{},{})",
                    blend(p, o.0, u.0),
                    blend(p, o.1, u.1),
                    blend(p, o.2, u.2)
                )
            } else {
                "none".to_string()
            };
            out.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{up}\" height=\"{up}\" fill=\"{fill}\" shape-rendering=\"crispEdges\"/>\n",
                x * up,
                y * up
            ));
        }
    }

    let w = width as f64;
    let h = height as f64;
    for (label, tx, ty) in [
        ("N", w / 2.0, fs),
        ("S", w / 2.0, h - fs / 2.0),
        ("W", fs / 2.0, h / 2.0),
        ("E", w - fs / 2.0, h / 2.0),
    ] {
        out.push_str(&format!(
            "<text x=\"{tx}\" y=\"{ty}\" text-anchor=\"middle\" fill=\"white\">{label}</text>\n"
        ));
    }
    out.push_str("</svg>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_is_rejected() {
        let opts = SvgOptions::default();
        assert_eq!(render_svg(&[], &opts), Err(ObstructionError::Empty));
        assert_eq!(render_svg(&[vec![]], &opts), Err(ObstructionError::Empty));
    }

    #[test]
    fn colors_interpolate_and_clamp() {
        let opts = SvgOptions::default();
        let svg = render_svg(&[vec![0.0, 1.0, 2.5, -1.0]], &opts).unwrap();
        assert!(svg.starts_with(r#"<svg width="16" height="4""#));
        assert!(svg.contains(r#"x="0" y="0" width="4" height="4" fill="rgb(237,82,74)""#));
        // values above 1.0 clamp to the unobstructed colour
        assert_eq!(svg.matches("fill=\"rgb(62,128,224)\"").count(), 2);
        assert!(svg.contains(r#"x="12" y="0" width="4" height="4" fill="none""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn compass_letters_are_placed() {
        let svg = render_svg(&vec![vec![1.0; 10]; 10], &SvgOptions::default()).unwrap();
        assert!(svg.contains(r#"<text x="20" y="24" text-anchor="middle" fill="white">N</text>"#));
        assert!(svg.contains(r#"<text x="28" y="20" text-anchor="middle" fill="white">E</text>"#));
    }

    #[test]
    fn one_element_per_line() {
        let svg = render_svg(&[vec![0.0, 0.5, -1.0], vec![1.0, 1.0, 1.0]], &SvgOptions::default()).unwrap();
        let lines: Vec<&str> = svg.lines().collect();
        assert_eq!(lines.len(), 2 + 6 + 4 + 1);
        assert!(lines[0].starts_with(r#"<svg width="12" height="8""#));
        assert_eq!(lines.iter().filter(|l| l.starts_with("<rect ")).count(), 6);
        assert!(lines[4].contains(r#"fill="none""#));
        assert_eq!(lines.last(), Some(&"</svg>"));
    }

    #[test]
    fn hex_colors_ignore_alpha() {
        assert_eq!(
            hex_to_rgb(DEFAULT_OBSTRUCTED_COLOR).unwrap(),
            SvgOptions::default().obstructed
        );
        assert_eq!(
            hex_to_rgb(DEFAULT_UNOBSTRUCTED_COLOR).unwrap(),
            SvgOptions::default().unobstructed
        );
        assert!(hex_to_rgb("zz").is_err());
    }
}
