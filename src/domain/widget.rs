//! Widget domain model
//!
//! A widget is one visual element of a dashboard: a chart, a map, a table or a
//! metric card. Widgets are read-only input to the export pipeline.

use super::ids::WidgetId;
use serde::{Deserialize, Serialize};

/// Closed set of widget kinds
///
/// Kinds unknown to this build deserialize as [`ChartKind::Unknown`] and are
/// exported through the generic capture path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
    Doughnut,
    Scatter,
    Radar,
    Heatmap,
    Table,
    /// Geographic map (markers, regions)
    Map,
    /// Geographic map shaded by value
    Choropleth,
    /// Single or multi-value metric tile
    Metric,
    /// Text/number card
    Card,
    /// Category x wave breakdown card
    WaveBreakdown,
    #[serde(other)]
    Unknown,
}

impl ChartKind {
    /// Whether the kind is drawn on a geographic surface
    pub fn is_geographic(self) -> bool {
        matches!(self, ChartKind::Map | ChartKind::Choropleth)
    }
}

/// One point of a data series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Category label (x axis, slice name, region)
    pub label: String,

    /// Numeric value; `None` for missing data
    #[serde(default)]
    pub value: Option<f64>,
}

impl DataPoint {
    /// Creates a point with a value
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
        }
    }
}

/// A named data series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Series name (for wave breakdowns, the wave)
    pub name: String,

    /// Points in display order
    #[serde(default)]
    pub points: Vec<DataPoint>,
}

impl Series {
    /// Creates a series from points
    pub fn new(name: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// A dashboard widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,

    pub title: String,

    pub kind: ChartKind,

    /// Renderer-specific variant (e.g. "stacked", "wave_grid")
    #[serde(default)]
    pub sub_kind: Option<String>,

    #[serde(default = "default_visible")]
    pub visible: bool,

    #[serde(default)]
    pub series: Vec<Series>,

    /// CSS color used behind the chart, e.g. `#ffffff`
    #[serde(default)]
    pub background_color: Option<String>,

    /// Section of the dashboard that owns the widget
    #[serde(default)]
    pub section: Option<String>,
}

impl Widget {
    /// Creates a visible widget with no data
    pub fn new(id: WidgetId, title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            sub_kind: None,
            visible: true,
            series: Vec::new(),
            background_color: None,
            section: None,
        }
    }

    /// Sets the data series
    pub fn with_series(mut self, series: Vec<Series>) -> Self {
        self.series = series;
        self
    }

    /// Sets the sub-kind
    pub fn with_sub_kind(mut self, sub_kind: impl Into<String>) -> Self {
        self.sub_kind = Some(sub_kind.into());
        self
    }

    /// Sets the visibility flag
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Background color, white when unset
    pub fn background(&self) -> &str {
        self.background_color.as_deref().unwrap_or("#ffffff")
    }

    /// Whether any series carries at least one numeric value
    pub fn has_numeric_data(&self) -> bool {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .any(|p| p.value.is_some_and(f64::is_finite))
    }
}

fn default_visible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(kind: ChartKind) -> Widget {
        Widget::new(WidgetId::new("w-1").unwrap(), "Attendance", kind)
    }

    #[test]
    fn test_unknown_kind_deserializes() {
        let kind: ChartKind = serde_json::from_str("\"sankey\"").unwrap();
        assert_eq!(kind, ChartKind::Unknown);
    }

    #[test]
    fn test_kind_snake_case() {
        let kind: ChartKind = serde_json::from_str("\"wave_breakdown\"").unwrap();
        assert_eq!(kind, ChartKind::WaveBreakdown);
    }

    #[test]
    fn test_geographic_kinds() {
        assert!(ChartKind::Map.is_geographic());
        assert!(ChartKind::Choropleth.is_geographic());
        assert!(!ChartKind::Bar.is_geographic());
    }

    #[test]
    fn test_widget_defaults_from_json() {
        let json = r#"{"id": "w-9", "title": "Enrollment", "kind": "bar"}"#;
        let widget: Widget = serde_json::from_str(json).unwrap();
        assert!(widget.visible);
        assert!(widget.series.is_empty());
        assert_eq!(widget.background(), "#ffffff");
    }

    #[test]
    fn test_has_numeric_data() {
        let empty = widget(ChartKind::Metric);
        assert!(!empty.has_numeric_data());

        let missing = widget(ChartKind::Metric).with_series(vec![Series::new(
            "total",
            vec![DataPoint {
                label: "a".to_string(),
                value: None,
            }],
        )]);
        assert!(!missing.has_numeric_data());

        let filled = widget(ChartKind::Metric)
            .with_series(vec![Series::new("total", vec![DataPoint::new("a", 3.0)])]);
        assert!(filled.has_numeric_data());
    }
}
