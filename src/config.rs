//! Runtime configuration.
//!
//! Every setting has a default; environment variables override them. Values that
//! fail to parse are logged and ignored.

use chrono::{FixedOffset, Offset, Utc};
use num_format::Locale;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Fixture file to load instead of the embedded one
    pub fixture_path: Option<PathBuf>,
    /// Rows per table page
    pub page_size: usize,
    /// Offset used to decide start/end of day for date filters
    pub utc_offset: FixedOffset,
    /// Directory exports are written to
    pub export_dir: PathBuf,
    /// Locale for thousands separators
    pub locale: Locale,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fixture_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            utc_offset: utc(),
            export_dir: PathBuf::from("."),
            locale: Locale::es,
        }
    }
}

impl AppConfig {
    /// Reads `GANADO_FIXTURES`, `GANADO_PAGE_SIZE`, `GANADO_UTC_OFFSET` and
    /// `GANADO_EXPORT_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(path) = lookup("GANADO_FIXTURES").filter(|s| !s.trim().is_empty()) {
            cfg.fixture_path = Some(PathBuf::from(path.trim()));
        }

        if let Some(raw) = lookup("GANADO_PAGE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => cfg.page_size = n,
                _ => log::warn!("Ignoring GANADO_PAGE_SIZE={raw:?}; using {}", cfg.page_size),
            }
        }

        if let Some(raw) = lookup("GANADO_UTC_OFFSET") {
            match parse_offset_hours(&raw) {
                Some(offset) => cfg.utc_offset = offset,
                None => log::warn!("Ignoring GANADO_UTC_OFFSET={raw:?}; using UTC"),
            }
        }

        if let Some(dir) = lookup("GANADO_EXPORT_DIR").filter(|s| !s.trim().is_empty()) {
            cfg.export_dir = PathBuf::from(dir.trim());
        }

        cfg
    }
}

/// Whole-hour offsets such as `-5`, `+1` or `0`.
pub fn parse_offset_hours(raw: &str) -> Option<FixedOffset> {
    let hours: i32 = raw.trim().parse().ok()?;
    if !(-23..=23).contains(&hours) {
        return None;
    }
    FixedOffset::east_opt(hours * 3600)
}

fn utc() -> FixedOffset {
    Utc.fix()
}
