//! Disease outbreaks and their progression.

use chrono::FixedOffset;

use crate::aggregate::{group_count, group_sum};
use crate::chart::{ChartKind, ChartRow, ChartSpec};
use crate::config::AppConfig;
use crate::filter::OutbreakFilter;
use crate::map::{project_outbreaks, Marker};
use crate::style::StylePalette;
use crate::summary::{summarize_outbreaks, OutbreakSummary};
use crate::table::{CellValue, Column};
use crate::types::{Outbreak, OutbreakStatus, ProgressEntry, Severity};
use crate::util::{distinct, format_date};
use crate::view::{DetailPanel, DetailRow, DetailSection, FilterOptions, ReportSchema};

pub struct OutbreakSchema;

fn affected(o: &Outbreak) -> u64 {
    u64::from(o.affected_animals)
}

/// Progress entries carry a plain calendar date, so no offset applies.
fn progress_day(p: &ProgressEntry) -> String {
    p.date.format("%d/%m/%Y").to_string()
}

/// Total and new cases per progress entry, keyed by date.
fn progress_chart(title: &str, progress: &[ProgressEntry], palette: &StylePalette) -> ChartSpec {
    let rows = progress
        .iter()
        .map(|p| ChartRow {
            name: p.date.to_string(),
            values: vec![u64::from(p.total_cases), u64::from(p.new_cases)],
        })
        .collect();
    ChartSpec::multi(
        ChartKind::Line,
        title,
        &[("totalCases", "Total Casos"), ("newCases", "Nuevos Casos")],
        rows,
        palette,
    )
    .with_name_key("date")
    .with_axes("Fecha", "Casos")
}

impl ReportSchema for OutbreakSchema {
    type Record = Outbreak;
    type Filter = OutbreakFilter;
    type Summary = OutbreakSummary;

    const TITLE: &'static str = "Brotes de Enfermedades";
    const MAP_TITLE: &'static str = "Mapa de Brotes";

    fn new_filter(_config: &AppConfig) -> OutbreakFilter {
        OutbreakFilter::default()
    }

    fn columns() -> Vec<Column<Outbreak>> {
        vec![
            Column::field("Enfermedad", "diseaseType"),
            Column::field("Región", "region"),
            Column::field("Municipio", "municipality"),
            Column::field("Estado", "status"),
            Column::derived("Severidad", |o: &Outbreak| CellValue::text(o.severity.label())),
            Column::field("Animales Afectados", "affectedAnimals"),
            Column::field("Detección", "detectionDate"),
        ]
    }

    fn markers(records: &[&Outbreak], palette: &StylePalette) -> Vec<Marker> {
        project_outbreaks(records, palette)
    }

    fn charts(
        records: &[&Outbreak],
        palette: &StylePalette,
        _offset: FixedOffset,
    ) -> Vec<ChartSpec> {
        let by_disease = group_sum(records, |o| o.disease_type.clone(), affected);
        let by_status = group_count(records, |o| o.status.label().to_string());
        let by_region = group_sum(records, |o| o.region.clone(), affected);
        let by_severity = group_sum(records, |o| o.severity.label().to_string(), affected);

        let mut charts = vec![
            ChartSpec::from_groups(
                ChartKind::Pie,
                "Animales Afectados por Enfermedad",
                &by_disease,
                palette,
            ),
            ChartSpec::from_groups(ChartKind::Pie, "Brotes por Estado", &by_status, palette),
            ChartSpec::from_groups(
                ChartKind::Bar,
                "Animales Afectados por Región",
                &by_region,
                palette,
            )
            .with_axes("Región", "Animales"),
            ChartSpec::from_groups(
                ChartKind::Pie,
                "Animales Afectados por Severidad",
                &by_severity,
                palette,
            ),
        ];
        if let Some(first) = records.iter().find(|o| o.status == OutbreakStatus::Active) {
            charts.push(progress_chart("Evolución de Brotes Activos", &first.progress, palette));
        }
        charts
    }

    fn detail(o: &Outbreak, palette: &StylePalette, offset: FixedOffset) -> DetailPanel {
        let mut sections = vec![DetailSection::text("Medidas Tomadas", &o.measures)];
        if !o.progress.is_empty() {
            let mut table = vec![vec![
                "Fecha".to_string(),
                "Nuevos Casos".to_string(),
                "Total Casos".to_string(),
            ]];
            table.extend(
                o.progress
                    .iter()
                    .map(|p| {
                        vec![progress_day(p), p.new_cases.to_string(), p.total_cases.to_string()]
                    }),
            );
            sections.push(DetailSection {
                heading: "Evolución del Brote".to_string(),
                table,
                chart: Some(progress_chart("Evolución del Brote", &o.progress, palette)),
                ..DetailSection::default()
            });
        }
        let actions = if o.status == OutbreakStatus::Active {
            vec!["Ver Protocolo".to_string(), "Actualizar Estado".to_string()]
        } else {
            Vec::new()
        };
        DetailPanel {
            title: format!("Brote de {}", o.disease_type),
            rows: vec![
                DetailRow::new("Estado", o.status.label()),
                DetailRow::new("Severidad", o.severity.label()),
                DetailRow::new("Región", o.region.as_str()),
                DetailRow::new("Municipio", o.municipality.as_str()),
                DetailRow::new("Fecha de Detección", format_date(&o.detection_date, offset)),
                DetailRow::new("Animales Afectados", o.affected_animals.to_string()),
                DetailRow::new("Técnico Responsable", o.responsible_technician.as_str()),
            ],
            sections,
            actions,
        }
    }

    fn summarize(records: &[&Outbreak], _filter: &OutbreakFilter) -> OutbreakSummary {
        summarize_outbreaks(records)
    }

    fn filter_options(records: &[Outbreak]) -> Vec<FilterOptions> {
        let same = |values: Vec<String>| -> Vec<(String, String)> {
            values.into_iter().map(|v| (v.clone(), v)).collect()
        };
        vec![
            FilterOptions {
                field: "disease",
                values: same(distinct(records.iter().map(|o| o.disease_type.clone()))),
            },
            FilterOptions {
                field: "status",
                values: OutbreakStatus::ALL
                    .iter()
                    .map(|s| (s.as_str().to_string(), s.label().to_string()))
                    .collect(),
            },
            FilterOptions {
                field: "region",
                values: same(distinct(records.iter().map(|o| o.region.clone()))),
            },
            FilterOptions {
                field: "severity",
                values: [Severity::Low, Severity::Medium, Severity::High]
                    .iter()
                    .map(|s| (s.as_str().to_string(), s.label().to_string()))
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

    fn view() -> ReportView<'static, OutbreakSchema> {
        ReportView::new(&fixtures::embedded().unwrap().outbreaks, &AppConfig::default())
    }

    #[test]
    fn table_shows_labels() {
        let v = view();
        let page = v.table_page();
        assert_eq!(
            page.rows[0].cells,
            vec!["Fiebre Aftosa", "Meta", "Puerto López", "Activo", "Alta", "45", "10/04/2025"]
        );
    }

    #[test]
    fn status_chart_counts_records() {
        let v = view();
        let charts = v.charts();
        let status = &charts[1];
        let pairs: Vec<(&str, u64)> =
            status.rows.iter().map(|r| (r.name.as_str(), r.values[0])).collect();
        assert_eq!(pairs, vec![("Activo", 2), ("Controlado", 1), ("Erradicado", 1)]);
        assert_eq!(charts[0].total(0), 113);
    }

    #[test]
    fn progress_line_follows_first_active_outbreak() {
        let mut v = view();
        let charts = v.charts();
        assert_eq!(charts.len(), 5);
        let line = &charts[4];
        assert_eq!(line.kind, ChartKind::Line);
        assert_eq!(line.rows.len(), 4);
        assert_eq!(line.data()[1]["totalCases"], serde_json::json!(32));

        v.set_filter("status", "eradicated").unwrap();
        assert_eq!(v.charts().len(), 4);
    }

    #[test]
    fn severity_filter_keeps_only_active_high_outbreaks() {
        let mut v = view();
        v.set_filter("severity", "alta").unwrap();
        let ids: Vec<&str> = v.filtered().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        let s = v.summary();
        assert_eq!((s.active, s.controlled, s.eradicated), (2, 0, 0));
    }

    #[test]
    fn detail_actions_only_for_active() {
        let mut v = view();
        v.select("1");
        let active = v.detail().unwrap();
        assert_eq!(active.actions, vec!["Ver Protocolo", "Actualizar Estado"]);
        let evolution = &active.sections[1];
        assert_eq!(evolution.table.len(), 5);
        assert_eq!(evolution.table[2], vec!["15/04/2025", "20", "32"]);
        assert!(evolution.chart.is_some());

        v.select("3");
        let eradicated = v.detail().unwrap();
        assert!(eradicated.actions.is_empty());
        assert_eq!(
            eradicated.sections[0].text.as_deref(),
            Some("Cuarentena, vacunación, seguimiento epidemiológico")
        );
    }

    #[test]
    fn marker_radius_scales_with_affected_animals() {
        let v = view();
        let layer = v.map_layer();
        assert_eq!(layer.marker("2").and_then(|m| m.radius_m), Some(2_800.0));
    }
}
