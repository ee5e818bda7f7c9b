//! Livestock import/export movements.

use chrono::FixedOffset;

use crate::aggregate::{group_dual, group_sum, DualGroup, Group};
use crate::chart::{ChartKind, ChartSpec};
use crate::config::AppConfig;
use crate::filter::MovementFilter;
use crate::map::{project_movements, Marker};
use crate::style::StylePalette;
use crate::summary::{summarize_movements, MovementSummary};
use crate::table::{CellValue, Column, MISSING};
use crate::types::{Direction, Movement};
use crate::util::{distinct, format_date};
use crate::view::{DetailPanel, DetailRow, DetailSection, FilterOptions, ReportSchema};

pub struct MovementSchema;

fn direction_label(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => {
            Direction::parse(s).map_or_else(|| s.clone(), |d| d.label().to_string())
        }
        _ => MISSING.to_string(),
    }
}

fn alert_mark(value: &CellValue) -> String {
    match value {
        CellValue::Bool(true) => "⚠️".to_string(),
        _ => "✓".to_string(),
    }
}

/// Imports and exports per country, first-seen order.
pub fn by_country(records: &[&Movement]) -> Vec<DualGroup<String>> {
    group_dual(
        records,
        |m| m.country.clone(),
        |m| m.direction == Direction::Import,
        |m| u64::from(m.animal_count),
    )
}

pub fn by_purpose(records: &[&Movement]) -> Vec<Group<String>> {
    group_sum(records, |m| m.purpose.clone(), |m| u64::from(m.animal_count))
}

impl ReportSchema for MovementSchema {
    type Record = Movement;
    type Filter = MovementFilter;
    type Summary = MovementSummary;

    const TITLE: &'static str = "Movimiento de Ganado";
    const MAP_TITLE: &'static str = "Mapa de Movimientos de Ganado";

    fn new_filter(config: &AppConfig) -> MovementFilter {
        MovementFilter::with_offset(config.utc_offset)
    }

    fn columns() -> Vec<Column<Movement>> {
        vec![
            Column::field("Fecha", "dateOfMovement"),
            Column::field("Tipo", "type").with_format(direction_label),
            Column::field("País", "country"),
            Column::field("Cantidad", "animalCount"),
            Column::field("Tipo Animal", "animalType"),
            Column::field("Propósito", "purpose"),
            Column::field("Alerta", "hasAlert").with_format(alert_mark),
        ]
    }

    fn markers(records: &[&Movement], palette: &StylePalette) -> Vec<Marker> {
        project_movements(records, palette)
    }

    fn charts(
        records: &[&Movement],
        palette: &StylePalette,
        _offset: FixedOffset,
    ) -> Vec<ChartSpec> {
        let countries = by_country(records);
        let totals: Vec<Group<String>> = countries
            .iter()
            .map(|g| Group {
                key: g.key.clone(),
                value: g.total(),
            })
            .collect();
        vec![
            ChartSpec::from_groups(
                ChartKind::Pie,
                "Movimientos por País (Total Animales)",
                &totals,
                palette,
            ),
            ChartSpec::from_dual(
                ChartKind::StackedBar,
                "Importaciones vs Exportaciones por País",
                [("imports", "Importaciones"), ("exports", "Exportaciones")],
                &countries,
                palette,
            )
            .with_axes("País", "Animales"),
            ChartSpec::from_groups(
                ChartKind::Pie,
                "Animales por Propósito",
                &by_purpose(records),
                palette,
            ),
        ]
    }

    fn detail(m: &Movement, _palette: &StylePalette, offset: FixedOffset) -> DetailPanel {
        let facility_label = match m.direction {
            Direction::Import => "Destino",
            Direction::Export => "Origen",
        };
        let mut sections = Vec::new();
        if m.has_alert {
            if let Some(reason) = m.alert_reason.as_deref() {
                sections.push(DetailSection::text("Información de Alerta", reason));
            }
        }
        DetailPanel {
            title: "Detalles del Movimiento".to_string(),
            rows: vec![
                DetailRow::new("Tipo", m.direction.label()),
                DetailRow::new("Documento", m.document_number.as_str()),
                DetailRow::new("Fecha", format_date(&m.date_of_movement, offset)),
                DetailRow::new("País", m.country.as_str()),
                DetailRow::new(facility_label, m.facility().unwrap_or(MISSING)),
                DetailRow::new("Cantidad", format!("{} {}", m.animal_count, m.animal_type)),
                DetailRow::new("Propósito", m.purpose.as_str()),
                DetailRow::new("Estado Sanitario", m.health_status.as_str()),
                DetailRow::new("Responsable", m.responsible.as_str()),
            ],
            sections,
            actions: Vec::new(),
        }
    }

    fn summarize(records: &[&Movement], filter: &MovementFilter) -> MovementSummary {
        summarize_movements(records, filter.has_alert)
    }

    fn filter_options(records: &[Movement]) -> Vec<FilterOptions> {
        vec![
            FilterOptions {
                field: "type",
                values: [Direction::Import, Direction::Export]
                    .iter()
                    .map(|d| (d.as_str().to_string(), d.label().to_string()))
                    .collect(),
            },
            FilterOptions {
                field: "country",
                values: distinct(records.iter().map(|m| m.country.clone()))
                    .into_iter()
                    .map(|c| (c.clone(), c))
                    .collect(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::view::ReportView;

    fn view() -> ReportView<'static, MovementSchema> {
        ReportView::new(&fixtures::embedded().unwrap().movements, &AppConfig::default())
    }

    #[test]
    fn table_cells_use_column_formatters() {
        let v = view();
        let page = v.table_page();
        assert_eq!(page.headers[0], "Fecha");
        assert_eq!(
            page.rows[0].cells,
            vec!["15/04/2025", "Importación", "Brasil", "250", "Bovino", "Reproducción", "✓"]
        );
        assert_eq!(page.rows[4].cells[6], "⚠️");
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn country_chart_sums_both_directions() {
        let v = view();
        let charts = v.charts();
        assert_eq!(charts.len(), 3);
        let pie = &charts[0];
        let names: Vec<&str> = pie.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Brasil", "México", "Argentina", "Perú", "Estados Unidos"]);
        assert_eq!(pie.total(0), 715);
        assert_eq!(charts[1].rows[1].values, vec![0, 180]);
    }

    #[test]
    fn purpose_chart_totals_match_filtered_animals() {
        let mut v = view();
        v.set_filter("type", "import").unwrap();
        let charts = v.charts();
        let expected: u64 = v.filtered().iter().map(|m| u64::from(m.animal_count)).sum();
        assert_eq!(charts[2].total(0), expected);
        assert_eq!(expected, 445);
    }

    #[test]
    fn detail_shows_alert_only_when_flagged() {
        let mut v = view();
        v.select("1");
        let plain = v.detail().unwrap();
        assert!(plain.sections.is_empty());
        assert!(plain.rows.iter().any(|r| r.label == "Destino" && r.value == "Meta"));

        v.select("5");
        let flagged = v.detail().unwrap();
        assert_eq!(flagged.sections[0].heading, "Información de Alerta");
        assert_eq!(
            flagged.sections[0].text.as_deref(),
            Some("Procedencia de zona con casos recientes de brucelosis")
        );

        v.select("2");
        let export = v.detail().unwrap();
        assert!(export.rows.iter().any(|r| r.label == "Origen" && r.value == "Córdoba"));
    }

    #[test]
    fn western_offset_moves_display_and_filter_together() {
        let config = AppConfig {
            utc_offset: FixedOffset::west_opt(5 * 3600).unwrap(),
            ..AppConfig::default()
        };
        let mut v: ReportView<MovementSchema> =
            ReportView::new(&fixtures::embedded().unwrap().movements, &config);
        v.set_filter("dateStart", "2025-04-14").unwrap();
        v.set_filter("dateEnd", "2025-04-14").unwrap();
        let ids: Vec<&str> = v.filtered().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(v.table_page().rows[0].cells[0], "14/04/2025");
        v.select("1");
        let panel = v.detail().unwrap();
        assert!(panel.rows.iter().any(|r| r.label == "Fecha" && r.value == "14/04/2025"));
    }

    #[test]
    fn country_options_are_distinct() {
        let v = view();
        let opts = v.filter_options();
        assert_eq!(opts[1].field, "country");
        assert_eq!(opts[1].values.len(), 5);
        assert_eq!(opts[0].values[0], ("import".to_string(), "Importación".to_string()));
    }
}
