//! Vaccination sessions recorded by field vaccinators.

use chrono::FixedOffset;

use crate::aggregate::{group_by_date, group_sum};
use crate::chart::{ChartKind, ChartSpec};
use crate::config::AppConfig;
use crate::filter::VaccinationFilter;
use crate::map::{project_vaccinations, Marker};
use crate::style::StylePalette;
use crate::summary::{summarize_vaccinations, VaccinationStats};
use crate::table::Column;
use crate::types::Vaccination;
use crate::util::{distinct, format_date, local_day};
use crate::view::{DetailPanel, DetailRow, DetailSection, FilterOptions, ReportSchema};

pub struct VaccinationSchema;

fn vaccinated(v: &Vaccination) -> u64 {
    u64::from(v.animals_vaccinated)
}

/// Animals vaccinated per calendar day at `offset`, oldest first.
pub fn daily_trend(
    records: &[&Vaccination],
    palette: &StylePalette,
    offset: FixedOffset,
) -> ChartSpec {
    let days = group_by_date(
        records,
        |v| local_day(&v.date_created, offset),
        vaccinated,
        |d| d.format("%d/%m/%Y").to_string(),
    );
    ChartSpec::from_groups(ChartKind::Line, "Tendencia de Vacunación", &days, palette)
        .with_name_key("date")
        .with_axes("Fecha", "Animales")
}

impl ReportSchema for VaccinationSchema {
    type Record = Vaccination;
    type Filter = VaccinationFilter;
    type Summary = VaccinationStats;

    const TITLE: &'static str = "Registro de Vacunación";
    const MAP_TITLE: &'static str = "Mapa de Vacunación";

    fn new_filter(config: &AppConfig) -> VaccinationFilter {
        VaccinationFilter::with_offset(config.utc_offset)
    }

    fn columns() -> Vec<Column<Vaccination>> {
        vec![
            Column::field("Fecha", "dateCreated"),
            Column::field("Vacunador", "vaccinatorName"),
            Column::field("Finca", "farm"),
            Column::field("Región", "region"),
            Column::field("Municipio", "municipality"),
            Column::field("Tipo de Vacuna", "vaccineType"),
            Column::field("Animales Vacunados", "animalsVaccinated"),
        ]
    }

    fn markers(records: &[&Vaccination], palette: &StylePalette) -> Vec<Marker> {
        project_vaccinations(records, palette)
    }

    fn charts(
        records: &[&Vaccination],
        palette: &StylePalette,
        offset: FixedOffset,
    ) -> Vec<ChartSpec> {
        let by_region = group_sum(records, |v| v.region.clone(), vaccinated);
        let by_vaccine = group_sum(records, |v| v.vaccine_type.clone(), vaccinated);
        let by_vaccinator = group_sum(records, |v| v.vaccinator_name.clone(), vaccinated);

        vec![
            ChartSpec::from_groups(ChartKind::Bar, "Vacunación por Región", &by_region, palette)
                .with_axes("Región", "Animales"),
            ChartSpec::from_groups(
                ChartKind::Pie,
                "Distribución por Tipo de Vacuna",
                &by_vaccine,
                palette,
            ),
            ChartSpec::from_groups(
                ChartKind::Bar,
                "Vacunación por Vacunador",
                &by_vaccinator,
                palette,
            )
            .with_axes("Vacunador", "Animales"),
            daily_trend(records, palette, offset),
        ]
    }

    fn detail(v: &Vaccination, _palette: &StylePalette, offset: FixedOffset) -> DetailPanel {
        let mut sections = vec![DetailSection::rows(
            "Conteo de Animales",
            vec![
                DetailRow::new("Machos", v.male_count.to_string()),
                DetailRow::new("Hembras", v.female_count.to_string()),
                DetailRow::new("Jóvenes", v.young_count.to_string()),
                DetailRow::new("Adultos", v.adult_count.to_string()),
            ],
        )];
        if let Some(obs) = v.observations.as_deref().filter(|s| !s.trim().is_empty()) {
            sections.push(DetailSection::text("Observaciones", obs));
        }
        DetailPanel {
            title: v.farm.clone(),
            rows: vec![
                DetailRow::new("Fecha", format_date(&v.date_created, offset)),
                DetailRow::new("Vacunador", v.vaccinator_name.as_str()),
                DetailRow::new("Ubicación", format!("{}, {}", v.municipality, v.region)),
                DetailRow::new("Campaña", v.campaign.as_str()),
                DetailRow::new("Estado de Campaña", v.campaign_status.as_str()),
                DetailRow::new("Tipo de Vacuna", v.vaccine_type.as_str()),
                DetailRow::new("Animales Vacunados", v.animals_vaccinated.to_string()),
            ],
            sections,
            actions: Vec::new(),
        }
    }

    fn summarize(records: &[&Vaccination], _filter: &VaccinationFilter) -> VaccinationStats {
        summarize_vaccinations(records)
    }

    fn filter_options(records: &[Vaccination]) -> Vec<FilterOptions> {
        let vaccinators = distinct(
            records
                .iter()
                .map(|v| (v.vaccinator_id.clone(), v.vaccinator_name.clone())),
        );
        vec![
            FilterOptions {
                field: "region",
                values: distinct(records.iter().map(|v| v.region.clone()))
                    .into_iter()
                    .map(|r| (r.clone(), r))
                    .collect(),
            },
            FilterOptions {
                field: "campaign",
                values: distinct(records.iter().map(|v| v.campaign.clone()))
                    .into_iter()
                    .map(|c| (c.clone(), c))
                    .collect(),
            },
            FilterOptions {
                field: "vaccinator",
                values: vaccinators,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::view::ReportView;

    fn view() -> ReportView<'static, VaccinationSchema> {
        ReportView::new(&fixtures::embedded().unwrap().vaccinations, &AppConfig::default())
    }

    #[test]
    fn region_filter_narrows_charts() {
        let mut v = view();
        assert_eq!(v.summary().total_animals, 1040);
        v.set_filter("region", "Cundinamarca").unwrap();
        assert_eq!(v.filtered().len(), 3);
        let charts = v.charts();
        assert_eq!(charts[0].rows.len(), 1);
        assert_eq!(charts[0].total(0), 525);
        assert_eq!(charts[1].total(0), 525);
    }

    #[test]
    fn trend_is_sorted_by_day() {
        let data = fixtures::embedded().unwrap();
        let mut refs: Vec<&Vaccination> = data.vaccinations.iter().collect();
        refs.reverse();
        let trend = daily_trend(&refs, &StylePalette::default(), AppConfig::default().utc_offset);
        let days: Vec<&str> = trend.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            days,
            vec!["05/05/2025", "06/05/2025", "07/05/2025", "08/05/2025", "09/05/2025"]
        );
        assert_eq!(trend.total(0), 1040);
    }

    #[test]
    fn trend_day_matches_the_date_filter_day() {
        let data = fixtures::embedded().unwrap();
        let mut late = data.vaccinations[0].clone();
        late.date_created = "2025-05-06T02:00:00Z".parse().unwrap();
        let records = vec![late];
        let config = AppConfig {
            utc_offset: FixedOffset::west_opt(5 * 3600).unwrap(),
            ..AppConfig::default()
        };
        let mut v: ReportView<VaccinationSchema> = ReportView::new(&records, &config);
        v.set_filter("dateStart", "2025-05-05").unwrap();
        v.set_filter("dateEnd", "2025-05-05").unwrap();
        assert_eq!(v.filtered().len(), 1);
        let charts = v.charts();
        let trend = &charts[3];
        assert_eq!(trend.rows.len(), 1);
        assert_eq!(trend.rows[0].name, "05/05/2025");
        assert_eq!(v.table_page().rows[0].cells[0], "05/05/2025");
    }

    #[test]
    fn vaccinator_options_pair_id_and_name() {
        let v = view();
        let opts = v.filter_options();
        let vaccinators = opts.iter().find(|o| o.field == "vaccinator").unwrap();
        assert_eq!(vaccinators.values.len(), 3);
        assert_eq!(vaccinators.values[1], ("2".to_string(), "María López".to_string()));
    }

    #[test]
    fn observations_section_is_optional() {
        let data = fixtures::embedded().unwrap();
        let palette = StylePalette::default();
        let utc = AppConfig::default().utc_offset;
        let panel = VaccinationSchema::detail(&data.vaccinations[0], &palette, utc);
        assert_eq!(panel.sections.len(), 2);
        assert_eq!(panel.sections[0].rows[0].value, "45");

        let mut bare = data.vaccinations[0].clone();
        bare.observations = None;
        let panel = VaccinationSchema::detail(&bare, &palette, utc);
        assert_eq!(panel.sections.len(), 1);
        assert_eq!(panel.sections[0].heading, "Conteo de Animales");
    }

    #[test]
    fn table_first_row() {
        let v = view();
        let page = v.table_page();
        assert_eq!(
            page.rows[0].cells,
            vec![
                "05/05/2025",
                "Juan Pérez",
                "Finca El Recreo",
                "Cundinamarca",
                "Chía",
                "Aftosa Bivalente",
                "120"
            ]
        );
    }
}
