use crate::error::FixtureError;
use crate::types::{Dataset, Movement, Outbreak, OutbreakStatus, Vaccination};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

const EMBEDDED: &str = include_str!("../data/fixtures.json");

// Parsed once on first use; every view borrows from it.
static EMBEDDED_DATASET: Lazy<Result<Dataset, String>> =
    Lazy::new(|| parse_and_validate(EMBEDDED).map(|(d, _)| d).map_err(|e| e.to_string()));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub movements: usize,
    pub outbreaks: usize,
    pub vaccinations: usize,
}

/// The dataset compiled into the binary.
pub fn embedded() -> Result<&'static Dataset, FixtureError> {
    EMBEDDED_DATASET
        .as_ref()
        .map_err(|reason| FixtureError::Invalid {
            kind: "fixture",
            id: "embedded".to_string(),
            reason: reason.clone(),
        })
}

pub fn load_from_path(path: &Path) -> Result<(Dataset, LoadReport), FixtureError> {
    let raw = std::fs::read_to_string(path)?;
    let loaded = parse_and_validate(&raw)?;
    log::info!("Loaded fixtures from {}", path.display());
    Ok(loaded)
}

pub fn parse_and_validate(raw: &str) -> Result<(Dataset, LoadReport), FixtureError> {
    let data: Dataset = serde_json::from_str(raw)?;

    unique_ids("movement", data.movements.iter().map(|m| m.id.as_str()))?;
    unique_ids("outbreak", data.outbreaks.iter().map(|o| o.id.as_str()))?;
    unique_ids("vaccination", data.vaccinations.iter().map(|v| v.id.as_str()))?;

    for m in &data.movements {
        validate_movement(m)?;
    }
    for o in &data.outbreaks {
        validate_outbreak(o)?;
    }
    for v in &data.vaccinations {
        validate_vaccination(v)?;
    }

    let report = LoadReport {
        movements: data.movements.len(),
        outbreaks: data.outbreaks.len(),
        vaccinations: data.vaccinations.len(),
    };
    log::info!(
        "Fixtures validated: {} movements, {} outbreaks, {} vaccinations",
        report.movements,
        report.outbreaks,
        report.vaccinations
    );
    Ok((data, report))
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), FixtureError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(reject(kind, id, "duplicate id".to_string()));
        }
    }
    Ok(())
}

fn reject(kind: &'static str, id: &str, reason: String) -> FixtureError {
    FixtureError::Invalid {
        kind,
        id: id.to_string(),
        reason,
    }
}

fn validate_movement(m: &Movement) -> Result<(), FixtureError> {
    if m.animal_count == 0 {
        return Err(reject("movement", &m.id, "animalCount must be positive".into()));
    }
    let has_reason = m.alert_reason.as_deref().is_some_and(|r| !r.trim().is_empty());
    if m.has_alert != has_reason {
        return Err(reject(
            "movement",
            &m.id,
            "alertReason must be present exactly when hasAlert is set".into(),
        ));
    }
    Ok(())
}

fn validate_outbreak(o: &Outbreak) -> Result<(), FixtureError> {
    let mut running = 0u32;
    let mut prev_date = None;
    for entry in &o.progress {
        if prev_date.is_some_and(|d| entry.date < d) {
            let msg = format!("progress out of order at {}", entry.date);
            return Err(reject("outbreak", &o.id, msg));
        }
        prev_date = Some(entry.date);
        running = running.saturating_add(entry.new_cases);
        if entry.total_cases != running {
            return Err(reject(
                "outbreak",
                &o.id,
                format!(
                    "totalCases {} on {} is not the running sum {}",
                    entry.total_cases, entry.date, running
                ),
            ));
        }
    }
    if let Some(last) = o.progress.last() {
        if o.status != OutbreakStatus::Active && last.total_cases != o.affected_animals {
            return Err(reject(
                "outbreak",
                &o.id,
                format!(
                    "final totalCases {} differs from affectedAnimals {}",
                    last.total_cases, o.affected_animals
                ),
            ));
        }
    }
    Ok(())
}

fn validate_vaccination(v: &Vaccination) -> Result<(), FixtureError> {
    // Widened so huge counts cannot wrap into a false match.
    let split = |a: u32, b: u32| u64::from(a) + u64::from(b);
    let total = u64::from(v.animals_vaccinated);
    if split(v.male_count, v.female_count) != total {
        return Err(reject(
            "vaccination",
            &v.id,
            "maleCount + femaleCount must equal animalsVaccinated".into(),
        ));
    }
    if split(v.young_count, v.adult_count) != total {
        return Err(reject(
            "vaccination",
            &v.id,
            "youngCount + adultCount must equal animalsVaccinated".into(),
        ));
    }
    Ok(())
}
