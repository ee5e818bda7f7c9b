//! Colour policy for map markers, links and chart series.
//!
//! Projectors ask a [`StylePalette`] for every colour; a view restyles by
//! taking a different palette.

use serde::Serialize;

use crate::map::MarkerCategory;
use crate::types::OutbreakStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkStyle {
    pub color: String,
    /// Dash pattern in pixels; empty for a solid line.
    pub dash: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StylePalette {
    pub origin: String,
    pub destination: String,
    pub vaccination: String,
    pub outbreak_active: String,
    pub outbreak_controlled: String,
    pub outbreak_eradicated: String,
    pub link: LinkStyle,
    pub alert_link: LinkStyle,
    /// Cycled through for chart series and pie segments.
    pub series: Vec<String>,
}

impl Default for StylePalette {
    fn default() -> Self {
        Self {
            origin: "#3949ab".into(),
            destination: "#00acc1".into(),
            vaccination: "#2e7d32".into(),
            outbreak_active: "#d32f2f".into(),
            outbreak_controlled: "#ff8f00".into(),
            outbreak_eradicated: "#2e7d32".into(),
            link: LinkStyle {
                color: "#3949ab".into(),
                dash: Vec::new(),
            },
            alert_link: LinkStyle {
                color: "#d32f2f".into(),
                dash: vec![5, 5],
            },
            series: [
                "#2E7D32", "#4CAF50", "#81C784", "#1B5E20", "#FFC107", "#FF8F00", "#2196F3",
                "#0D47A1", "#F44336", "#B71C1C",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl StylePalette {
    pub fn marker_color(&self, category: MarkerCategory, status: Option<OutbreakStatus>) -> &str {
        match category {
            MarkerCategory::Origin => &self.origin,
            MarkerCategory::Destination => &self.destination,
            MarkerCategory::Vaccination => &self.vaccination,
            MarkerCategory::Outbreak => match status {
                Some(OutbreakStatus::Active) => &self.outbreak_active,
                Some(OutbreakStatus::Controlled) => &self.outbreak_controlled,
                Some(OutbreakStatus::Eradicated) | None => &self.outbreak_eradicated,
            },
        }
    }

    pub fn link_style(&self, alert: bool) -> &LinkStyle {
        if alert {
            &self.alert_link
        } else {
            &self.link
        }
    }

    pub fn series_color(&self, index: usize) -> &str {
        if self.series.is_empty() {
            return "#888888";
        }
        &self.series[index % self.series.len()]
    }
}
