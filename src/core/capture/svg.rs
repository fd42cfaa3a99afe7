//! SVG helpers shared by the synthetic and placeholder renderers

use crate::domain::{FolioError, Result};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Opening tag of the root `<svg>` element, attributes and self-closing slash captured
static SVG_ROOT: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)<svg\b([^>]*?)(/?)>"));

/// Escape text for use in SVG content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\n' && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Turn renderer SVG markup into a standalone document
///
/// Adds the XML declaration and SVG namespace when missing and paints
/// `background` behind the chart, which is otherwise transparent.
pub fn normalize_svg(markup: &str, background: &str) -> Result<String> {
    let root = SVG_ROOT
        .as_ref()
        .map_err(|e| FolioError::Render(format!("SVG pattern error: {e}")))?;

    let markup = markup.trim();
    let caps = root
        .captures(markup)
        .ok_or_else(|| FolioError::Render("Markup has no <svg> root".to_string()))?;
    let (Some(tag), Some(attrs), Some(self_closing)) = (caps.get(0), caps.get(1), caps.get(2))
    else {
        return Err(FolioError::Render("Malformed <svg> root".to_string()));
    };

    let mut attrs = attrs.as_str().to_string();
    if !attrs.contains("xmlns=") {
        attrs.push_str(&format!(r#" xmlns="{SVG_NS}""#));
    }

    let background_rect = format!(
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        escape_xml(background)
    );

    let mut out = String::with_capacity(markup.len() + 128);
    if !markup.starts_with("<?xml") {
        out.push_str(XML_DECL);
    }
    out.push_str(&markup[..tag.start()]);
    out.push_str("<svg");
    out.push_str(&attrs);
    out.push('>');
    out.push_str(&background_rect);
    if self_closing.as_str().is_empty() {
        out.push_str(&markup[tag.end()..]);
    } else {
        out.push_str("</svg>");
        out.push_str(&markup[tag.end()..]);
    }

    Ok(out)
}

/// Minimal SVG document builder
pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32, background: &str) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0, 0, width, height, background, None);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn rect(&mut self, x: u32, y: u32, w: u32, h: u32, fill: &str, stroke: Option<&str>) {
        let stroke = stroke
            .map(|s| format!(r#" stroke="{}""#, escape_xml(s)))
            .unwrap_or_default();
        let _ = write!(
            self.body,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{}"{stroke}/>"#,
            escape_xml(fill)
        );
    }

    /// Text anchored at (x, y); `anchor` is `start`, `middle` or `end`
    pub fn text(&mut self, x: u32, y: u32, size: u32, anchor: &str, weight: &str, content: &str) {
        let _ = write!(
            self.body,
            r##"<text x="{x}" y="{y}" font-family="Helvetica, Arial, sans-serif" font-size="{size}" font-weight="{weight}" text-anchor="{anchor}" fill="#333333">{}</text>"##,
            escape_xml(content)
        );
    }

    pub fn finish(self) -> String {
        format!(
            r#"{XML_DECL}<svg xmlns="{SVG_NS}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

/// Format a metric value: integers without decimals, others with up to two
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Shorten `text` to `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"A & B <"c">"#), "A &amp; B &lt;&quot;c&quot;&gt;");
    }

    #[test]
    fn test_normalize_adds_namespace_and_background() {
        let out = normalize_svg(r#"<svg width="10" height="10"><g/></svg>"#, "#fafafa").unwrap();
        assert!(out.starts_with("<?xml"));
        assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(out.contains(r##"<rect width="100%" height="100%" fill="#fafafa"/><g/>"##));
    }

    #[test]
    fn test_normalize_keeps_existing_namespace() {
        let input = r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
        let out = normalize_svg(input, "#fff").unwrap();
        assert_eq!(out.matches("xmlns=").count(), 1);
    }

    #[test]
    fn test_normalize_self_closing_root() {
        let out = normalize_svg("<svg/>", "#fff").unwrap();
        assert!(out.ends_with(r##"<rect width="100%" height="100%" fill="#fff"/></svg>"##));
    }

    #[test]
    fn test_root_pattern_is_shared_across_calls() {
        assert!(SVG_ROOT.is_ok());
        let first = normalize_svg("<svg width=\"10\"></svg>", "#fff").unwrap();
        let second = normalize_svg("<svg width=\"10\"></svg>", "#fff").unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(
            SVG_ROOT.as_ref().unwrap(),
            SVG_ROOT.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_normalize_rejects_non_svg() {
        assert!(normalize_svg("<div></div>", "#fff").is_err());
    }

    #[test_case(12.0, "12" ; "integer")]
    #[test_case(0.5, "0.5" ; "one decimal")]
    #[test_case(3.14159, "3.14" ; "rounded")]
    #[test_case(-2.0, "-2" ; "negative")]
    fn test_format_value(value: f64, expected: &str) {
        assert_eq!(format_value(value), expected);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long category label", 10), "a very ...");
    }

    #[test]
    fn test_canvas_finish_is_standalone() {
        let mut canvas = SvgCanvas::new(100, 50, "#ffffff");
        canvas.text(50, 25, 12, "middle", "normal", "Hi & bye");
        let svg = canvas.finish();
        assert!(svg.contains(r#"width="100" height="50""#));
        assert!(svg.contains("Hi &amp; bye"));
        assert!(svg.ends_with("</svg>"));
    }
}
