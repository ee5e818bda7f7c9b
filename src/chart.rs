//! Chart descriptions built from aggregated groups.
//!
//! A [`ChartSpec`] carries everything the chart renderer needs: kind, title,
//! the category key, one entry per value series and the data rows. An empty
//! filtered set yields a spec with no rows, which renderers show as "no data".

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::aggregate::{DualGroup, Group};
use crate::style::StylePalette;
use crate::util::share;

/// Pie segments at or below this share of the total get no text label.
pub const PIE_LABEL_THRESHOLD: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Pie,
    Bar,
    StackedBar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesKey {
    pub key: String,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub name: String,
    /// One value per series, in series order.
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub name_key: String,
    pub series: Vec<SeriesKey>,
    pub rows: Vec<ChartRow>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl ChartSpec {
    /// Single-series chart keyed `name` / `value`.
    pub fn from_groups(
        kind: ChartKind,
        title: &str,
        groups: &[Group<String>],
        palette: &StylePalette,
    ) -> Self {
        Self::multi(
            kind,
            title,
            &[("value", "value")],
            groups
                .iter()
                .map(|g| ChartRow {
                    name: g.key.clone(),
                    values: vec![g.value],
                })
                .collect(),
            palette,
        )
    }

    /// Two-series chart from dual totals, e.g. imports and exports per country.
    pub fn from_dual(
        kind: ChartKind,
        title: &str,
        keys: [(&str, &str); 2],
        groups: &[DualGroup<String>],
        palette: &StylePalette,
    ) -> Self {
        Self::multi(
            kind,
            title,
            &keys,
            groups
                .iter()
                .map(|g| ChartRow {
                    name: g.key.clone(),
                    values: vec![g.first, g.second],
                })
                .collect(),
            palette,
        )
    }

    /// `keys` are `(data key, legend label)` pairs matching the order of each row's values.
    pub fn multi(
        kind: ChartKind,
        title: &str,
        keys: &[(&str, &str)],
        rows: Vec<ChartRow>,
        palette: &StylePalette,
    ) -> Self {
        let series = keys
            .iter()
            .enumerate()
            .map(|(i, (key, label))| SeriesKey {
                key: key.to_string(),
                label: label.to_string(),
                color: palette.series_color(i).to_string(),
            })
            .collect();
        Self {
            kind,
            title: title.to_string(),
            name_key: "name".to_string(),
            series,
            rows,
            x_label: None,
            y_label: None,
        }
    }

    pub fn with_name_key(mut self, key: &str) -> Self {
        self.name_key = key.to_string();
        self
    }

    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x_label = Some(x.to_string());
        self.y_label = Some(y.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of one series over all rows.
    pub fn total(&self, series: usize) -> u64 {
        self.rows.iter().filter_map(|r| r.values.get(series)).sum()
    }

    /// Text label per pie segment of the first series; `None` where the
    /// segment's share does not exceed [`PIE_LABEL_THRESHOLD`] or the total is zero.
    pub fn pie_labels(&self) -> Vec<Option<String>> {
        let total = self.total(0);
        self.rows
            .iter()
            .map(|row| {
                let value = row.values.first().copied().unwrap_or(0);
                match share(value, total) {
                    Some(s) if s > PIE_LABEL_THRESHOLD => Some(format!("{}: {}", row.name, value)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Colour of each pie segment, cycling through the palette.
    pub fn segment_colors(&self, palette: &StylePalette) -> Vec<String> {
        (0..self.rows.len()).map(|i| palette.series_color(i).to_string()).collect()
    }

    /// Row objects keyed by `name_key` and the series keys, the shape chart
    /// libraries consume directly.
    pub fn data(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                obj.insert(self.name_key.clone(), Value::String(row.name.clone()));
                for (key, value) in self.series.iter().zip(&row.values) {
                    obj.insert(key.key.clone(), json!(value));
                }
                Value::Object(obj)
            })
            .collect()
    }

    /// Declarative description for the chart renderer.
    pub fn payload(&self) -> Value {
        json!({
            "type": self.kind,
            "title": self.title,
            "nameKey": self.name_key,
            "dataKeys": self.series,
            "data": self.data(),
            "xAxisLabel": self.x_label,
            "yAxisLabel": self.y_label,
        })
    }
}
