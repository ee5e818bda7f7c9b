//! Reporting core for livestock movements, disease outbreaks and vaccination
//! campaigns: filtering, aggregation, pagination and the map, chart and table
//! descriptions handed to a renderer.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod map;
pub mod movement;
pub mod nav;
pub mod outbreak;
pub mod output;
pub mod style;
pub mod summary;
pub mod table;
pub mod types;
pub mod util;
pub mod vaccination;
pub mod view;
