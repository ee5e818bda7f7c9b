//! Generic filterable report view.
//!
//! The three report pages differ only in their record type, filter fields,
//! columns, marker rule, charts and detail panel. Those live in a
//! [`ReportSchema`] descriptor; [`ReportView`] owns the per-view state (tab,
//! selection, filters, page) and derives everything else on demand.

use chrono::FixedOffset;
use serde::Serialize;
use std::fmt::Debug;

use crate::chart::ChartSpec;
use crate::config::AppConfig;
use crate::error::FilterError;
use crate::filter::{apply, Criteria};
use crate::map::{MapLayer, Marker};
use crate::style::StylePalette;
use crate::table::{paginate, Column, Pager, TablePage};
use crate::types::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Table,
    Map,
    Chart,
}

impl Tab {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "t" | "table" | "tabla" => Some(Self::Table),
            "m" | "map" | "mapa" => Some(Self::Map),
            "c" | "chart" | "graficos" | "gráficos" => Some(Self::Chart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

impl DetailRow {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetailSection {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<DetailRow>,
    /// Header row first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub table: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

impl DetailSection {
    pub fn text(heading: &str, text: &str) -> Self {
        Self {
            heading: heading.to_string(),
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn rows(heading: &str, rows: Vec<DetailRow>) -> Self {
        Self {
            heading: heading.to_string(),
            rows,
            ..Self::default()
        }
    }
}

/// Everything shown in the side panel for one selected record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPanel {
    pub title: String,
    pub rows: Vec<DetailRow>,
    pub sections: Vec<DetailSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

/// Choices offered for one filter field, as `(value, label)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub field: &'static str,
    pub values: Vec<(String, String)>,
}

/// Describes one report page.
pub trait ReportSchema {
    type Record: Record + Debug;
    type Filter: Criteria<Self::Record> + Clone + Debug;
    type Summary: Serialize + Debug;

    const TITLE: &'static str;
    const MAP_TITLE: &'static str;

    fn new_filter(config: &AppConfig) -> Self::Filter;

    fn columns() -> Vec<Column<Self::Record>>;

    fn markers(records: &[&Self::Record], palette: &StylePalette) -> Vec<Marker>;

    /// `offset` decides which calendar day a timestamp belongs to.
    fn charts(
        records: &[&Self::Record],
        palette: &StylePalette,
        offset: FixedOffset,
    ) -> Vec<ChartSpec>;

    fn detail(record: &Self::Record, palette: &StylePalette, offset: FixedOffset) -> DetailPanel;

    fn summarize(records: &[&Self::Record], filter: &Self::Filter) -> Self::Summary;

    /// Option lists for the select-style filters, over the full dataset.
    fn filter_options(records: &[Self::Record]) -> Vec<FilterOptions>;
}

pub struct ReportView<'a, S: ReportSchema> {
    records: &'a [S::Record],
    filter: S::Filter,
    tab: Tab,
    selection: Option<String>,
    pager: Pager,
    columns: Vec<Column<S::Record>>,
    palette: StylePalette,
    offset: FixedOffset,
}

impl<'a, S: ReportSchema> ReportView<'a, S> {
    pub fn new(records: &'a [S::Record], config: &AppConfig) -> Self {
        log::debug!("Mounting view {}", S::TITLE);
        Self {
            records,
            filter: S::new_filter(config),
            tab: Tab::default(),
            selection: None,
            pager: Pager::new(config.page_size),
            columns: S::columns(),
            palette: StylePalette::default(),
            offset: config.utc_offset,
        }
    }

    pub fn with_palette(mut self, palette: StylePalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn title(&self) -> &'static str {
        S::TITLE
    }

    pub fn records(&self) -> &'a [S::Record] {
        self.records
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        log::debug!("{}: tab {:?}", S::TITLE, tab);
        self.tab = tab;
    }

    pub fn filter(&self) -> &S::Filter {
        &self.filter
    }

    /// Changes one filter field. Tab and selection are left alone; the page is
    /// pulled back inside the new result set.
    pub fn set_filter(&mut self, field: &str, value: &str) -> Result<(), FilterError> {
        self.filter.set(field, value)?;
        log::debug!("{}: filter {field}={value:?}", S::TITLE);
        self.pager.reconcile(self.filtered().len());
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.filter.reset();
        self.pager.reconcile(self.filtered().len());
    }

    pub fn filtered(&self) -> Vec<&'a S::Record> {
        apply(self.records, &self.filter)
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn next_page(&mut self) -> bool {
        let len = self.filtered().len();
        self.pager.next(len)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    pub fn table_page(&self) -> TablePage<'a, S::Record> {
        paginate(&self.filtered(), &self.columns, &self.pager, self.offset)
    }

    pub fn map_layer(&self) -> MapLayer {
        MapLayer::new(S::MAP_TITLE, S::markers(&self.filtered(), &self.palette), &self.palette)
    }

    pub fn charts(&self) -> Vec<ChartSpec> {
        S::charts(&self.filtered(), &self.palette, self.offset)
    }

    pub fn summary(&self) -> S::Summary {
        S::summarize(&self.filtered(), &self.filter)
    }

    pub fn filter_options(&self) -> Vec<FilterOptions> {
        S::filter_options(self.records)
    }

    /// Selects a record by id. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> bool {
        if self.records.iter().any(|r| r.id() == id) {
            self.selection = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Row click on the current table page (0-based).
    pub fn click_row(&mut self, index: usize) -> bool {
        let id = self.table_page().row_click(index).map(|r| r.id().to_string());
        match id {
            Some(id) => self.select(&id),
            None => false,
        }
    }

    pub fn click_marker(&mut self, marker_id: &str) -> bool {
        let record_id = self.map_layer().marker(marker_id).map(|m| m.record_id.clone());
        match record_id {
            Some(id) => self.select(&id),
            None => false,
        }
    }

    pub fn close_detail(&mut self) {
        self.selection = None;
    }

    pub fn selected(&self) -> Option<&'a S::Record> {
        let id = self.selection.as_deref()?;
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn detail(&self) -> Option<DetailPanel> {
        self.selected().map(|r| S::detail(r, &self.palette, self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::movement::MovementSchema;
    use crate::outbreak::OutbreakSchema;

    fn movements() -> ReportView<'static, MovementSchema> {
        let data = fixtures::embedded().unwrap();
        ReportView::new(&data.movements, &AppConfig::default())
    }

    #[test]
    fn initial_state() {
        let view = movements();
        assert_eq!(view.tab(), Tab::Table);
        assert!(view.selected().is_none());
        assert!(view.filter().is_unconstrained());
        assert_eq!(view.filtered().len(), 5);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn filter_change_keeps_tab_and_selection() {
        let mut view = movements();
        view.select_tab(Tab::Chart);
        assert!(view.select("2"));
        view.set_filter("type", "import").unwrap();
        assert_eq!(view.tab(), Tab::Chart);
        assert_eq!(view.selected().map(|m| m.id.as_str()), Some("2"));
        assert_eq!(view.filtered().len(), 3);
    }

    #[test]
    fn reset_restores_everything_but_keeps_tab_and_selection() {
        let mut view = movements();
        view.select_tab(Tab::Map);
        view.select("5");
        view.set_filter("country", "Perú").unwrap();
        view.set_filter("hasAlert", "true").unwrap();
        assert!(view.filtered().is_empty());
        view.reset_filters();
        assert_eq!(view.filtered().len(), 5);
        assert_eq!(view.tab(), Tab::Map);
        assert!(view.detail().is_some());
    }

    #[test]
    fn rejected_filter_changes_nothing() {
        let mut view = movements();
        view.set_filter("dateStart", "2025-04-20").unwrap();
        let before = view.filtered().len();
        assert!(view.set_filter("dateStart", "not a date").is_err());
        assert_eq!(view.filtered().len(), before);
    }

    #[test]
    fn selection_via_row_and_marker() {
        let mut view = movements();
        assert!(view.click_row(4));
        assert_eq!(view.selected().map(|m| m.id.as_str()), Some("5"));
        view.close_detail();
        assert!(view.detail().is_none());
        assert!(view.click_marker("destination-3"));
        assert_eq!(view.selected().map(|m| m.id.as_str()), Some("3"));
        assert!(!view.click_marker("nowhere"));
        assert!(!view.select("99"));
        assert_eq!(view.selected().map(|m| m.id.as_str()), Some("3"));
    }

    #[test]
    fn page_is_reconciled_when_filters_shrink_the_set() {
        let data = fixtures::embedded().unwrap();
        let config = AppConfig {
            page_size: 2,
            ..AppConfig::default()
        };
        let mut view: ReportView<MovementSchema> = ReportView::new(&data.movements, &config);
        assert!(view.next_page());
        assert!(view.next_page());
        assert!(!view.next_page());
        assert_eq!(view.page(), 3);
        view.set_filter("type", "export").unwrap();
        assert_eq!(view.page(), 1);
        assert_eq!(view.table_page().rows.len(), 2);
        assert!(!view.prev_page());
    }

    #[test]
    fn views_do_not_share_state() {
        let data = fixtures::embedded().unwrap();
        let config = AppConfig::default();
        let mut a: ReportView<OutbreakSchema> = ReportView::new(&data.outbreaks, &config);
        let b: ReportView<OutbreakSchema> = ReportView::new(&data.outbreaks, &config);
        a.set_filter("status", "active").unwrap();
        assert_eq!(a.filtered().len(), 2);
        assert_eq!(b.filtered().len(), 4);
    }

    #[test]
    fn tab_parsing() {
        assert_eq!(Tab::parse("Mapa"), Some(Tab::Map));
        assert_eq!(Tab::parse("c"), Some(Tab::Chart));
        assert_eq!(Tab::parse("x"), None);
    }
}
