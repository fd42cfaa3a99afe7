//! How each widget kind is captured

use crate::domain::ChartKind;

/// Capture profile of a widget kind
///
/// Decides which strategies of the chain apply to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureProfile {
    /// Charts drawn on a canvas or SVG surface
    Plotted,
    /// Maps; legend and frame live on the enclosing card
    Geographic,
    /// Tables, captured from their container only
    Tabular,
    /// Metric tiles and cards with no chart surface
    Synthesized,
}

impl CaptureProfile {
    pub fn uses_card(self) -> bool {
        matches!(self, CaptureProfile::Geographic)
    }

    pub fn has_surface(self) -> bool {
        matches!(self, CaptureProfile::Plotted | CaptureProfile::Geographic)
    }

    pub fn synthesizes(self) -> bool {
        matches!(self, CaptureProfile::Synthesized)
    }
}

impl From<ChartKind> for CaptureProfile {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Bar
            | ChartKind::Line
            | ChartKind::Area
            | ChartKind::Pie
            | ChartKind::Doughnut
            | ChartKind::Scatter
            | ChartKind::Radar
            | ChartKind::Heatmap
            | ChartKind::Unknown => CaptureProfile::Plotted,
            ChartKind::Map | ChartKind::Choropleth => CaptureProfile::Geographic,
            ChartKind::Table => CaptureProfile::Tabular,
            ChartKind::Metric | ChartKind::Card | ChartKind::WaveBreakdown => {
                CaptureProfile::Synthesized
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ChartKind::Bar, CaptureProfile::Plotted)]
    #[test_case(ChartKind::Unknown, CaptureProfile::Plotted)]
    #[test_case(ChartKind::Choropleth, CaptureProfile::Geographic)]
    #[test_case(ChartKind::Table, CaptureProfile::Tabular)]
    #[test_case(ChartKind::WaveBreakdown, CaptureProfile::Synthesized)]
    fn test_profile_for_kind(kind: ChartKind, expected: CaptureProfile) {
        assert_eq!(CaptureProfile::from(kind), expected);
    }

    #[test]
    fn test_geographic_profile_agrees_with_kind() {
        for kind in [ChartKind::Map, ChartKind::Choropleth, ChartKind::Bar] {
            assert_eq!(CaptureProfile::from(kind).uses_card(), kind.is_geographic());
        }
    }

    #[test]
    fn test_only_synthesized_kinds_lack_surface() {
        assert!(!CaptureProfile::Synthesized.has_surface());
        assert!(!CaptureProfile::Tabular.has_surface());
        assert!(CaptureProfile::Geographic.has_surface());
    }
}
