//! Last-resort image: the widget title and a notice

use super::svg::{truncate, SvgCanvas};
use crate::adapters::traits::RenderedImage;
use crate::domain::Widget;

pub const PLACEHOLDER_NOTICE: &str = "No chart image available";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;

pub fn render(widget: &Widget) -> RenderedImage {
    let mut canvas = SvgCanvas::new(WIDTH, HEIGHT, widget.background());
    canvas.rect(8, 8, WIDTH - 16, HEIGHT - 16, "none", Some("#c8ced8"));

    let title = if widget.title.trim().is_empty() {
        widget.id.to_string()
    } else {
        truncate(&widget.title, 60)
    };
    canvas.text(WIDTH / 2, HEIGHT / 2 - 12, 24, "middle", "bold", &title);
    canvas.text(
        WIDTH / 2,
        HEIGHT / 2 + 24,
        16,
        "middle",
        "normal",
        PLACEHOLDER_NOTICE,
    );

    RenderedImage::svg(canvas.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartKind, ImageFormat, WidgetId};

    #[test]
    fn test_placeholder_carries_title_and_notice() {
        let widget = Widget::new(WidgetId::new("w-3").unwrap(), "Chronic absence", ChartKind::Bar);
        let image = render(&widget);
        let svg = String::from_utf8(image.bytes).unwrap();

        assert_eq!(image.format, ImageFormat::Svg);
        assert!(svg.contains("Chronic absence"));
        assert!(svg.contains(PLACEHOLDER_NOTICE));
    }

    #[test]
    fn test_blank_title_uses_widget_id() {
        let widget = Widget::new(WidgetId::new("w-3").unwrap(), "  ", ChartKind::Bar);
        let svg = String::from_utf8(render(&widget).bytes).unwrap();
        assert!(svg.contains(">w-3<"));
    }
}
