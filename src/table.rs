//! Paginated tabular view over any record type.
//!
//! Columns pull a [`CellValue`] out of a record either by field name or through
//! a derivation function, and the page window is tracked by [`Pager`].

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::ops::Range;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::types::Record;
use crate::util::format_date;

/// Placeholder shown for absent values.
pub const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Date(DateTime<Utc>),
    Missing,
}

impl CellValue {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub fn opt_text(s: Option<&str>) -> Self {
        s.map_or(Self::Missing, Self::text)
    }
}

pub type Formatter = fn(&CellValue) -> String;

pub enum Accessor<R> {
    /// Resolved through [`Record::field`].
    Field(&'static str),
    Derive(fn(&R) -> CellValue),
}

pub struct Column<R> {
    pub header: &'static str,
    pub accessor: Accessor<R>,
    pub format: Option<Formatter>,
}

impl<R: Record> Column<R> {
    pub fn field(header: &'static str, name: &'static str) -> Self {
        Self {
            header,
            accessor: Accessor::Field(name),
            format: None,
        }
    }

    pub fn derived(header: &'static str, derive: fn(&R) -> CellValue) -> Self {
        Self {
            header,
            accessor: Accessor::Derive(derive),
            format: None,
        }
    }

    pub fn with_format(mut self, format: Formatter) -> Self {
        self.format = Some(format);
        self
    }

    pub fn value(&self, record: &R) -> CellValue {
        match &self.accessor {
            Accessor::Field(name) => record.field(name),
            Accessor::Derive(derive) => derive(record),
        }
    }

    /// Formatted cell; dates land on the calendar of `offset`.
    pub fn render(&self, record: &R, offset: FixedOffset) -> String {
        format_cell(&self.value(record), self.format, offset)
    }
}

/// Missing values always render as [`MISSING`]; otherwise an explicit formatter
/// wins, then booleans, then dates, then the raw value.
pub fn format_cell(value: &CellValue, format: Option<Formatter>, offset: FixedOffset) -> String {
    if *value == CellValue::Missing {
        return MISSING.to_string();
    }
    if let Some(f) = format {
        return f(value);
    }
    match value {
        CellValue::Bool(true) => "Sí".to_string(),
        CellValue::Bool(false) => "No".to_string(),
        CellValue::Date(d) => format_date(d, offset),
        CellValue::Text(s) => s.clone(),
        CellValue::Int(n) => n.to_string(),
        CellValue::Missing => MISSING.to_string(),
    }
}

/// 1-based page cursor. Out-of-range moves are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    fn last_page(&self, len: usize) -> usize {
        self.total_pages(len).max(1)
    }

    /// Returns whether the page moved.
    pub fn next(&mut self, len: usize) -> bool {
        if self.page < self.total_pages(len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Pulls the page back inside the data after the row count changed.
    pub fn reconcile(&mut self, len: usize) {
        let last = self.last_page(len);
        if self.page > last {
            log::debug!("Page {} past last page {last}, clamping", self.page);
            self.page = last;
        }
    }

    pub fn window(&self, len: usize) -> Range<usize> {
        let page = self.page.min(self.last_page(len));
        let start = ((page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }
}

#[derive(Debug)]
pub struct TableRow<'a, R> {
    pub record: &'a R,
    pub cells: Vec<String>,
}

/// One rendered page: formatted cells plus the records behind them.
#[derive(Debug)]
pub struct TablePage<'a, R> {
    pub headers: Vec<&'static str>,
    pub rows: Vec<TableRow<'a, R>>,
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

impl<'a, R> TablePage<'a, R> {
    /// The full record behind a clicked row (0-based within the page).
    pub fn row_click(&self, index: usize) -> Option<&'a R> {
        self.rows.get(index).map(|row| row.record)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header followed by the cell rows, ready for `tabled` or `csv`.
    pub fn string_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.headers.iter().map(|h| h.to_string()).collect());
        out.extend(self.rows.iter().map(|r| r.cells.clone()));
        out
    }
}

pub fn paginate<'a, R: Record>(
    records: &[&'a R],
    columns: &[Column<R>],
    pager: &Pager,
    offset: FixedOffset,
) -> TablePage<'a, R> {
    let window = pager.window(records.len());
    let rows = records[window]
        .iter()
        .map(|&record| TableRow {
            record,
            cells: columns.iter().map(|c| c.render(record, offset)).collect(),
        })
        .collect();
    TablePage {
        headers: columns.iter().map(|c| c.header).collect(),
        rows,
        page: pager.page().min(pager.last_page(records.len())),
        total_pages: pager.total_pages(records.len()),
        total_rows: records.len(),
    }
}
