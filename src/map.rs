//! Projection of records onto map markers.
//!
//! A [`MapLayer`] is the complete, owned description handed to the map
//! renderer: markers, the lines joining paired movement markers, and a legend
//! limited to the categories actually on the map.

use serde::Serialize;
use std::collections::HashMap;

use crate::style::{LinkStyle, StylePalette};
use crate::types::{Direction, LatLng, Movement, Outbreak, OutbreakStatus, Vaccination};

pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 4.570868,
    lng: -74.297333,
};
pub const DEFAULT_ZOOM: u8 = 6;

/// Metres of affected-area radius per affected animal.
pub const RADIUS_PER_ANIMAL_M: f64 = 100.0;
pub const MAX_RADIUS_M: f64 = 20_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerCategory {
    Origin,
    Destination,
    Outbreak,
    Vaccination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    /// Id of the record the marker was projected from.
    pub record_id: String,
    pub title: String,
    pub description: String,
    pub coordinates: LatLng,
    pub category: MarkerCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OutbreakStatus>,
    pub alert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_reason: Option<String>,
    /// Shared by the origin and destination markers of one movement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<f64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub correlation_id: String,
    pub from: LatLng,
    pub to: LatLng,
    pub alert: bool,
    pub style: LinkStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub title: String,
    pub center: LatLng,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub links: Vec<Link>,
    pub legend: Vec<LegendEntry>,
}

impl MapLayer {
    pub fn new(title: &str, markers: Vec<Marker>, palette: &StylePalette) -> Self {
        let links = link_pairs(&markers, palette);
        let legend = legend(&markers, palette);
        Self {
            title: title.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            markers,
            links,
            legend,
        }
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

pub fn outbreak_radius(affected_animals: u32) -> f64 {
    (f64::from(affected_animals) * RADIUS_PER_ANIMAL_M).min(MAX_RADIUS_M)
}

/// Up to two markers per movement; a side without coordinates is skipped.
pub fn project_movements(records: &[&Movement], palette: &StylePalette) -> Vec<Marker> {
    let mut markers = Vec::with_capacity(records.len() * 2);
    for &m in records {
        let description = format!("{} {}", m.animal_count, m.animal_type);
        let facility = m.facility().unwrap_or(m.country.as_str());

        if let Some(origin) = m.coordinates.origin {
            let title = match m.direction {
                Direction::Import => format!("Origen: {}", m.country),
                Direction::Export => format!("Salida: {}", m.country),
            };
            markers.push(movement_marker(
                m,
                "origin",
                title,
                &description,
                origin,
                MarkerCategory::Origin,
                palette,
            ));
        }
        if let Some(destination) = m.coordinates.destination {
            let title = match m.direction {
                Direction::Import => format!("Destino: {facility}"),
                Direction::Export => format!("Destino: {}", m.country),
            };
            markers.push(movement_marker(
                m,
                "destination",
                title,
                &description,
                destination,
                MarkerCategory::Destination,
                palette,
            ));
        }
    }
    markers
}

fn movement_marker(
    m: &Movement,
    side: &str,
    title: String,
    description: &str,
    coordinates: LatLng,
    category: MarkerCategory,
    palette: &StylePalette,
) -> Marker {
    Marker {
        id: format!("{side}-{}", m.id),
        record_id: m.id.clone(),
        title,
        description: description.to_string(),
        coordinates,
        category,
        status: None,
        alert: m.has_alert,
        alert_reason: m.alert_reason.clone(),
        correlation_id: Some(m.id.clone()),
        radius_m: None,
        color: palette.marker_color(category, None).to_string(),
    }
}

pub fn project_outbreaks(records: &[&Outbreak], palette: &StylePalette) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|&o| {
            let coordinates = o.coordinates?;
            Some(Marker {
                id: o.id.clone(),
                record_id: o.id.clone(),
                title: o.disease_type.clone(),
                description: format!(
                    "{}, {} - {} animales",
                    o.municipality, o.region, o.affected_animals
                ),
                coordinates,
                category: MarkerCategory::Outbreak,
                status: Some(o.status),
                alert: false,
                alert_reason: None,
                correlation_id: None,
                radius_m: Some(outbreak_radius(o.affected_animals)),
                color: palette.marker_color(MarkerCategory::Outbreak, Some(o.status)).to_string(),
            })
        })
        .collect()
}

pub fn project_vaccinations(records: &[&Vaccination], palette: &StylePalette) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|&v| {
            let coordinates = v.coordinates?;
            Some(Marker {
                id: v.id.clone(),
                record_id: v.id.clone(),
                title: v.farm.clone(),
                description: format!("{} animales vacunados", v.animals_vaccinated),
                coordinates,
                category: MarkerCategory::Vaccination,
                status: None,
                alert: false,
                alert_reason: None,
                correlation_id: None,
                radius_m: None,
                color: palette.marker_color(MarkerCategory::Vaccination, None).to_string(),
            })
        })
        .collect()
}

fn link_pairs(markers: &[Marker], palette: &StylePalette) -> Vec<Link> {
    let mut pairs: HashMap<&str, (Option<&Marker>, Option<&Marker>)> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for m in markers {
        let Some(cid) = m.correlation_id.as_deref() else {
            continue;
        };
        let slot = pairs.entry(cid).or_insert_with(|| {
            order.push(cid);
            (None, None)
        });
        match m.category {
            MarkerCategory::Origin => slot.0 = Some(m),
            MarkerCategory::Destination => slot.1 = Some(m),
            _ => {}
        }
    }

    order
        .into_iter()
        .filter_map(|cid| match pairs.get(cid) {
            Some((Some(from), Some(to))) => Some(Link {
                correlation_id: cid.to_string(),
                from: from.coordinates,
                to: to.coordinates,
                alert: from.alert,
                style: palette.link_style(from.alert).clone(),
            }),
            _ => None,
        })
        .collect()
}

fn legend(markers: &[Marker], palette: &StylePalette) -> Vec<LegendEntry> {
    let present = |category: MarkerCategory, status: Option<OutbreakStatus>| {
        markers
            .iter()
            .any(|m| m.category == category && (status.is_none() || m.status == status))
    };
    let candidates = [
        (MarkerCategory::Outbreak, Some(OutbreakStatus::Active), "Brote Activo"),
        (MarkerCategory::Outbreak, Some(OutbreakStatus::Controlled), "Brote Controlado"),
        (MarkerCategory::Outbreak, Some(OutbreakStatus::Eradicated), "Brote Erradicado"),
        (MarkerCategory::Origin, None, "Origen"),
        (MarkerCategory::Destination, None, "Destino"),
        (MarkerCategory::Vaccination, None, "Vacunación"),
    ];
    candidates
        .into_iter()
        .filter(|(category, status, _)| present(*category, *status))
        .map(|(category, status, label)| LegendEntry {
            label: label.to_string(),
            color: palette.marker_color(category, status).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::types::MovementCoordinates;

    #[test]
    fn movement_markers_pair_up() {
        let data = fixtures::embedded().unwrap();
        let refs: Vec<&Movement> = data.movements.iter().collect();
        let palette = StylePalette::default();
        let markers = project_movements(&refs, &palette);
        assert_eq!(markers.len(), 10);
        assert!(markers.len() <= 2 * refs.len());

        let layer = MapLayer::new("Movimientos", markers, &palette);
        assert_eq!(layer.links.len(), 5);
        let alert_link = layer.links.iter().find(|l| l.correlation_id == "5").unwrap();
        assert!(alert_link.alert);
        assert_eq!(alert_link.style, palette.alert_link);
        assert_eq!(layer.marker("origin-1").unwrap().title, "Origen: Brasil");
        assert_eq!(layer.marker("destination-1").unwrap().title, "Destino: Meta");
        assert_eq!(layer.marker("origin-2").unwrap().title, "Salida: México");
        assert_eq!(layer.marker("destination-2").unwrap().title, "Destino: México");
    }

    #[test]
    fn missing_coordinates_omit_markers_and_links() {
        let data = fixtures::embedded().unwrap();
        let mut m = data.movements[0].clone();
        m.coordinates = MovementCoordinates {
            origin: None,
            destination: m.coordinates.destination,
        };
        let mut bare = data.movements[1].clone();
        bare.coordinates = MovementCoordinates::default();
        let palette = StylePalette::default();
        let markers = project_movements(&[&m, &bare], &palette);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].category, MarkerCategory::Destination);
        let layer = MapLayer::new("x", markers, &palette);
        assert!(layer.links.is_empty());
    }

    #[test]
    fn outbreak_radius_is_capped() {
        assert_eq!(outbreak_radius(45), 4_500.0);
        assert_eq!(outbreak_radius(200), MAX_RADIUS_M);
        assert_eq!(outbreak_radius(0), 0.0);
        assert!(outbreak_radius(10) < outbreak_radius(11));
    }

    #[test]
    fn outbreak_markers_and_legend() {
        let data = fixtures::embedded().unwrap();
        let refs: Vec<&Outbreak> = data.outbreaks.iter().collect();
        let palette = StylePalette::default();
        let markers = project_outbreaks(&refs, &palette);
        assert_eq!(markers.len(), 4);
        assert!(markers.iter().all(|m| m.category == MarkerCategory::Outbreak));
        assert_eq!(markers[0].description, "Puerto López, Meta - 45 animales");

        let layer = MapLayer::new("Brotes", markers, &palette);
        let labels: Vec<&str> = layer.legend.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Brote Activo", "Brote Controlado", "Brote Erradicado"]);
    }

    #[test]
    fn vaccination_markers_skip_missing_points() {
        let data = fixtures::embedded().unwrap();
        let mut v = data.vaccinations[0].clone();
        v.coordinates = None;
        let refs = vec![&v, &data.vaccinations[1]];
        let markers = project_vaccinations(&refs, &StylePalette::default());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].title, "Hacienda La Primavera");
        assert_eq!(markers[0].description, "230 animales vacunados");
    }
}
