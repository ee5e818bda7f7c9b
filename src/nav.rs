//! Top-level routes between the three reports.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    #[default]
    Movements,
    Outbreaks,
    Vaccinations,
}

impl Route {
    pub const ALL: [Route; 3] = [Self::Movements, Self::Outbreaks, Self::Vaccinations];

    /// Accepts route paths (`/outbreaks`, `#/vaccinations`), bare names and
    /// menu numbers. Anything unrecognised lands on movements.
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().trim_start_matches('#').trim_start_matches('/').to_lowercase();
        match key.as_str() {
            "2" | "outbreaks" | "brotes" => Self::Outbreaks,
            "3" | "vaccinations" | "vacunacion" | "vacunación" => Self::Vaccinations,
            "1" | "movements" | "movimientos" => Self::Movements,
            other => {
                if !other.is_empty() {
                    log::debug!("Unknown route {raw:?}, falling back to movements");
                }
                Self::Movements
            }
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Movements => "/movements",
            Self::Outbreaks => "/outbreaks",
            Self::Vaccinations => "/vaccinations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Movements => "Movimiento de Ganado",
            Self::Outbreaks => "Brotes de Enfermedades",
            Self::Vaccinations => "Registro de Vacunación",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_names_and_numbers() {
        assert_eq!(Route::parse("/outbreaks"), Route::Outbreaks);
        assert_eq!(Route::parse("#/vaccinations"), Route::Vaccinations);
        assert_eq!(Route::parse("3"), Route::Vaccinations);
        assert_eq!(Route::parse(" Brotes "), Route::Outbreaks);
    }

    #[test]
    fn unknown_routes_fall_back_to_movements() {
        assert_eq!(Route::parse(""), Route::Movements);
        assert_eq!(Route::parse("/admin"), Route::Movements);
        assert_eq!(Route::parse("9"), Route::Movements);
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::parse(route.path()), route);
        }
    }
}
