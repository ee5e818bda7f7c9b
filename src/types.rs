use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::table::CellValue;

/// Geographic point as stored in the fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Import,
    Export,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "import" | "importacion" | "importación" => Some(Self::Import),
            "export" | "exportacion" | "exportación" => Some(Self::Export),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Import => "Importación",
            Self::Export => "Exportación",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutbreakStatus {
    Active,
    Controlled,
    Eradicated,
}

impl OutbreakStatus {
    pub const ALL: [OutbreakStatus; 3] = [Self::Active, Self::Controlled, Self::Eradicated];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "activo" => Some(Self::Active),
            "controlled" | "controlado" => Some(Self::Controlled),
            "eradicated" | "erradicado" => Some(Self::Eradicated),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Controlled => "controlled",
            Self::Eradicated => "eradicated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Activo",
            Self::Controlled => "Controlado",
            Self::Eradicated => "Erradicado",
        }
    }
}

/// Outbreak severity. The fixtures spell the levels in Spanish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "baja" | "low" => Some(Self::Low),
            "media" | "medium" => Some(Self::Medium),
            "alta" | "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "baja",
            Self::Medium => "media",
            Self::High => "alta",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Medium => "Media",
            Self::High => "Alta",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementCoordinates {
    pub origin: Option<LatLng>,
    pub destination: Option<LatLng>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub country: String,
    pub animal_count: u32,
    pub animal_type: String,
    pub purpose: String,
    pub health_status: String,
    pub document_number: String,
    pub date_of_movement: DateTime<Utc>,
    pub responsible: String,
    /// Facility the animals leave from (exports).
    #[serde(default)]
    pub origin: Option<String>,
    /// Facility the animals arrive at (imports).
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub has_alert: bool,
    #[serde(default)]
    pub alert_reason: Option<String>,
    #[serde(default)]
    pub coordinates: MovementCoordinates,
}

impl Movement {
    /// The domestic facility involved: destination for imports, origin for exports.
    pub fn facility(&self) -> Option<&str> {
        match self.direction {
            Direction::Import => self.destination.as_deref(),
            Direction::Export => self.origin.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub date: NaiveDate,
    pub new_cases: u32,
    pub total_cases: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outbreak {
    pub id: String,
    pub disease_type: String,
    pub status: OutbreakStatus,
    pub severity: Severity,
    pub detection_date: DateTime<Utc>,
    pub region: String,
    pub municipality: String,
    pub affected_animals: u32,
    pub measures: String,
    pub responsible_technician: String,
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    #[serde(default)]
    pub coordinates: Option<LatLng>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccination {
    pub id: String,
    pub vaccinator_id: String,
    pub vaccinator_name: String,
    pub farm: String,
    pub municipality: String,
    pub region: String,
    pub campaign: String,
    pub campaign_status: String,
    pub vaccine_type: String,
    pub animals_vaccinated: u32,
    pub male_count: u32,
    pub female_count: u32,
    pub young_count: u32,
    pub adult_count: u32,
    #[serde(default)]
    pub observations: Option<String>,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub coordinates: Option<LatLng>,
}

/// The three static collections, as laid out in the fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub movements: Vec<Movement>,
    pub outbreaks: Vec<Outbreak>,
    pub vaccinations: Vec<Vaccination>,
}

/// A record that can be listed in a table and selected by id.
pub trait Record {
    fn id(&self) -> &str;

    /// Looks up a field by its fixture name. Unknown names yield `CellValue::Missing`.
    fn field(&self, name: &str) -> CellValue;
}

impl Record for Movement {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(&self.id),
            "type" => CellValue::text(self.direction.as_str()),
            "country" => CellValue::text(&self.country),
            "animalCount" => CellValue::Int(self.animal_count.into()),
            "animalType" => CellValue::text(&self.animal_type),
            "purpose" => CellValue::text(&self.purpose),
            "healthStatus" => CellValue::text(&self.health_status),
            "documentNumber" => CellValue::text(&self.document_number),
            "dateOfMovement" => CellValue::Date(self.date_of_movement),
            "responsible" => CellValue::text(&self.responsible),
            "origin" => CellValue::opt_text(self.origin.as_deref()),
            "destination" => CellValue::opt_text(self.destination.as_deref()),
            "hasAlert" => CellValue::Bool(self.has_alert),
            "alertReason" => CellValue::opt_text(self.alert_reason.as_deref()),
            _ => CellValue::Missing,
        }
    }
}

impl Record for Outbreak {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(&self.id),
            "diseaseType" => CellValue::text(&self.disease_type),
            "status" => CellValue::text(self.status.label()),
            "severity" => CellValue::text(self.severity.as_str()),
            "detectionDate" => CellValue::Date(self.detection_date),
            "region" => CellValue::text(&self.region),
            "municipality" => CellValue::text(&self.municipality),
            "affectedAnimals" => CellValue::Int(self.affected_animals.into()),
            "measures" => CellValue::text(&self.measures),
            "responsibleTechnician" => CellValue::text(&self.responsible_technician),
            _ => CellValue::Missing,
        }
    }
}

impl Record for Vaccination {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(&self.id),
            "vaccinatorId" => CellValue::text(&self.vaccinator_id),
            "vaccinatorName" => CellValue::text(&self.vaccinator_name),
            "farm" => CellValue::text(&self.farm),
            "municipality" => CellValue::text(&self.municipality),
            "region" => CellValue::text(&self.region),
            "campaign" => CellValue::text(&self.campaign),
            "campaignStatus" => CellValue::text(&self.campaign_status),
            "vaccineType" => CellValue::text(&self.vaccine_type),
            "animalsVaccinated" => CellValue::Int(self.animals_vaccinated.into()),
            "maleCount" => CellValue::Int(self.male_count.into()),
            "femaleCount" => CellValue::Int(self.female_count.into()),
            "youngCount" => CellValue::Int(self.young_count.into()),
            "adultCount" => CellValue::Int(self.adult_count.into()),
            "observations" => CellValue::opt_text(self.observations.as_deref()),
            "dateCreated" => CellValue::Date(self.date_created),
            _ => CellValue::Missing,
        }
    }
}
