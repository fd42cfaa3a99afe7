//! Synthetic images for widgets without a chart surface
//!
//! Metric tiles and breakdown cards are plain markup in the dashboard, so
//! there is nothing to rasterize. These renderers rebuild an image from the
//! widget's numeric data instead.

use super::svg::{format_value, truncate, SvgCanvas};
use crate::domain::{ChartKind, Widget};

const WAVE_GRID_SUB_KIND: &str = "wave_grid";

const TITLE_HEIGHT: u32 = 48;
const PADDING: u32 = 16;

const GRID_LABEL_WIDTH: u32 = 220;
const GRID_CELL_WIDTH: u32 = 110;
const GRID_ROW_HEIGHT: u32 = 32;

const TILE_COLUMNS: u32 = 3;
const TILE_WIDTH: u32 = 240;
const TILE_HEIGHT: u32 = 110;
const MAX_TILES: usize = 12;

/// Render a synthetic SVG for `widget`
///
/// Returns `None` when neither layout fits; the caller then falls back to an
/// offscreen render.
pub fn render(widget: &Widget) -> Option<String> {
    if !widget.has_numeric_data() {
        return None;
    }

    if is_wave_breakdown(widget) {
        if let Some(svg) = wave_grid(widget) {
            return Some(svg);
        }
    }

    metric_layout(widget)
}

fn is_wave_breakdown(widget: &Widget) -> bool {
    widget.kind == ChartKind::WaveBreakdown
        || widget.sub_kind.as_deref() == Some(WAVE_GRID_SUB_KIND)
}

/// Category rows by wave columns
///
/// Each series is one wave; categories are the union of point labels in
/// first-seen order.
fn wave_grid(widget: &Widget) -> Option<String> {
    let waves: Vec<_> = widget.series.iter().filter(|s| !s.points.is_empty()).collect();
    if waves.len() < 2 {
        return None;
    }

    let mut categories: Vec<&str> = Vec::new();
    for point in waves.iter().flat_map(|s| s.points.iter()) {
        if !categories.contains(&point.label.as_str()) {
            categories.push(&point.label);
        }
    }

    let width = 2 * PADDING + GRID_LABEL_WIDTH + GRID_CELL_WIDTH * waves.len() as u32;
    let height = TITLE_HEIGHT + PADDING + GRID_ROW_HEIGHT * (categories.len() as u32 + 1);
    let mut canvas = SvgCanvas::new(width, height, widget.background());

    canvas.text(PADDING, 32, 20, "start", "bold", &truncate(&widget.title, 80));

    let header_y = TITLE_HEIGHT;
    canvas.rect(
        PADDING,
        header_y,
        width - 2 * PADDING,
        GRID_ROW_HEIGHT,
        "#eef1f5",
        None,
    );
    for (col, wave) in waves.iter().enumerate() {
        let x = PADDING + GRID_LABEL_WIDTH + GRID_CELL_WIDTH * col as u32 + GRID_CELL_WIDTH / 2;
        canvas.text(x, header_y + 21, 13, "middle", "bold", &truncate(&wave.name, 14));
    }

    for (row, category) in categories.iter().enumerate() {
        let y = header_y + GRID_ROW_HEIGHT * (row as u32 + 1);
        if row % 2 == 1 {
            canvas.rect(
                PADDING,
                y,
                width - 2 * PADDING,
                GRID_ROW_HEIGHT,
                "#f8f9fb",
                None,
            );
        }
        canvas.text(PADDING + 8, y + 21, 13, "start", "normal", &truncate(category, 30));

        for (col, wave) in waves.iter().enumerate() {
            let value = wave
                .points
                .iter()
                .find(|p| p.label == *category)
                .and_then(|p| p.value)
                .filter(|v| v.is_finite());
            let x = PADDING + GRID_LABEL_WIDTH + GRID_CELL_WIDTH * col as u32 + GRID_CELL_WIDTH / 2;
            let text = value.map(format_value).unwrap_or_else(|| "-".to_string());
            canvas.text(x, y + 21, 13, "middle", "normal", &text);
        }
    }

    Some(canvas.finish())
}

/// Tiles of value + label, three per row
fn metric_layout(widget: &Widget) -> Option<String> {
    let tiles: Vec<(String, f64)> = widget
        .series
        .iter()
        .flat_map(|series| {
            series.points.iter().filter_map(move |p| {
                let value = p.value.filter(|v| v.is_finite())?;
                let label = if widget.series.len() > 1 && !series.name.is_empty() {
                    format!("{} ({})", p.label, series.name)
                } else {
                    p.label.clone()
                };
                Some((label, value))
            })
        })
        .take(MAX_TILES)
        .collect();

    if tiles.is_empty() {
        return None;
    }

    let columns = (tiles.len() as u32).min(TILE_COLUMNS);
    let rows = (tiles.len() as u32).div_ceil(TILE_COLUMNS);
    let width = 2 * PADDING + TILE_WIDTH * columns;
    let height = TITLE_HEIGHT + PADDING + TILE_HEIGHT * rows;
    let mut canvas = SvgCanvas::new(width, height, widget.background());

    canvas.text(PADDING, 32, 20, "start", "bold", &truncate(&widget.title, 60));

    for (i, (label, value)) in tiles.iter().enumerate() {
        let col = i as u32 % TILE_COLUMNS;
        let row = i as u32 / TILE_COLUMNS;
        let x = PADDING + TILE_WIDTH * col;
        let y = TITLE_HEIGHT + TILE_HEIGHT * row;

        canvas.rect(x + 4, y + 4, TILE_WIDTH - 8, TILE_HEIGHT - 8, "#f4f6f9", Some("#d9dee6"));
        canvas.text(x + TILE_WIDTH / 2, y + 56, 32, "middle", "bold", &format_value(*value));
        canvas.text(x + TILE_WIDTH / 2, y + 84, 13, "middle", "normal", &truncate(label, 32));
    }

    Some(canvas.finish())
}
