//! Headline numbers shown above each report and on the public landing page.

use serde::Serialize;

use crate::aggregate::{group_count, group_dual, group_sum, DualGroup, Group};
use crate::types::{Dataset, Direction, Movement, Outbreak, OutbreakStatus, Vaccination};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertNotice {
    pub document_number: String,
    pub country: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementSummary {
    pub records: usize,
    pub imports: usize,
    pub exports: usize,
    pub animals_imported: u64,
    pub animals_exported: u64,
    pub alerts: Vec<AlertNotice>,
    /// The alert banner is only shown while the alert filter is on.
    pub show_alerts: bool,
}

pub fn summarize_movements(records: &[&Movement], alert_filter: bool) -> MovementSummary {
    let mut summary = MovementSummary {
        records: records.len(),
        imports: 0,
        exports: 0,
        animals_imported: 0,
        animals_exported: 0,
        alerts: Vec::new(),
        show_alerts: false,
    };
    for &m in records {
        match m.direction {
            Direction::Import => {
                summary.imports += 1;
                summary.animals_imported += u64::from(m.animal_count);
            }
            Direction::Export => {
                summary.exports += 1;
                summary.animals_exported += u64::from(m.animal_count);
            }
        }
        if m.has_alert {
            summary.alerts.push(AlertNotice {
                document_number: m.document_number.clone(),
                country: m.country.clone(),
                reason: m.alert_reason.clone().unwrap_or_default(),
            });
        }
    }
    summary.show_alerts = alert_filter && !summary.alerts.is_empty();
    summary
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutbreakSummary {
    pub total: usize,
    pub active: usize,
    pub controlled: usize,
    pub eradicated: usize,
    pub affected_animals: u64,
}

pub fn summarize_outbreaks(records: &[&Outbreak]) -> OutbreakSummary {
    let count = |status: OutbreakStatus| records.iter().filter(|o| o.status == status).count();
    OutbreakSummary {
        total: records.len(),
        active: count(OutbreakStatus::Active),
        controlled: count(OutbreakStatus::Controlled),
        eradicated: count(OutbreakStatus::Eradicated),
        affected_animals: records.iter().map(|o| u64::from(o.affected_animals)).sum(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VaccinationStats {
    pub sessions: usize,
    pub total_animals: u64,
    pub males: u64,
    pub females: u64,
    pub young: u64,
    pub adults: u64,
}

pub fn summarize_vaccinations(records: &[&Vaccination]) -> VaccinationStats {
    records.iter().fold(VaccinationStats::default(), |mut acc, v| {
        acc.sessions += 1;
        acc.total_animals += u64::from(v.animals_vaccinated);
        acc.males += u64::from(v.male_count);
        acc.females += u64::from(v.female_count);
        acc.young += u64::from(v.young_count);
        acc.adults += u64::from(v.adult_count);
        acc
    })
}

/// Unfiltered figures for the public landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicOverview {
    pub total_vaccinated: u64,
    pub imports: usize,
    pub exports: usize,
    pub animals_imported: u64,
    pub animals_exported: u64,
    pub total_outbreaks: usize,
    pub active_outbreaks: usize,
    pub affected_animals: u64,
    /// Animals imported (`first`) and exported (`second`) per country.
    pub movements_by_country: Vec<DualGroup<String>>,
    pub animals_by_purpose: Vec<Group<String>>,
    /// Outbreak counts, not animals.
    pub outbreaks_by_status: Vec<Group<String>>,
    pub outbreaks_by_disease: Vec<Group<String>>,
    pub outbreaks_by_region: Vec<Group<String>>,
    pub vaccinated_by_region: Vec<Group<String>>,
}

impl PublicOverview {
    pub fn from_dataset(data: &Dataset) -> Self {
        let vaccinations: Vec<&Vaccination> = data.vaccinations.iter().collect();
        let movements: Vec<&Movement> = data.movements.iter().collect();
        let outbreaks: Vec<&Outbreak> = data.outbreaks.iter().collect();
        let moves = summarize_movements(&movements, false);
        let breaks = summarize_outbreaks(&outbreaks);
        let animals = |m: &Movement| u64::from(m.animal_count);
        Self {
            total_vaccinated: summarize_vaccinations(&vaccinations).total_animals,
            imports: moves.imports,
            exports: moves.exports,
            animals_imported: moves.animals_imported,
            animals_exported: moves.animals_exported,
            total_outbreaks: breaks.total,
            active_outbreaks: breaks.active,
            affected_animals: breaks.affected_animals,
            movements_by_country: group_dual(
                &movements,
                |m| m.country.clone(),
                |m| m.direction == Direction::Import,
                animals,
            ),
            animals_by_purpose: group_sum(&movements, |m| m.purpose.clone(), animals),
            outbreaks_by_status: group_count(&outbreaks, |o| o.status.label().to_string()),
            outbreaks_by_disease: group_count(&outbreaks, |o| o.disease_type.clone()),
            outbreaks_by_region: group_count(&outbreaks, |o| o.region.clone()),
            vaccinated_by_region: group_sum(&vaccinations, |v| v.region.clone(), |v| {
                u64::from(v.animals_vaccinated)
            }),
        }
    }
}
