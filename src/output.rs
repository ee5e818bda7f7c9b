// Writers and terminal previews.
//
// Exports go to CSV (table pages) and pretty JSON (map layers, charts,
// summaries). Previews render as Markdown tables through `tabled`.
use num_format::Locale;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::chart::{ChartKind, ChartSpec};
use crate::error::Result;
use crate::map::MapLayer;
use crate::table::{TablePage, MISSING};
use crate::util::format_int;
use crate::view::DetailPanel;

const EMPTY: &str = "(sin datos)";
const BAR_WIDTH: u64 = 30;

/// One line of a key/value preview.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct SummaryLine {
    #[tabled(rename = "Indicador")]
    pub label: String,
    #[tabled(rename = "Valor")]
    pub value: String,
}

/// Writes string rows as CSV, the first row being the header.
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    log::info!("Wrote {} rows to {}", rows.len().saturating_sub(1), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// `<dir>/<stem>.<ext>`, creating `dir` if needed.
pub fn export_path(dir: &Path, stem: &str, ext: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(format!("{stem}.{ext}")))
}

/// Markdown table from string rows (header first).
pub fn render_rows(rows: &[Vec<String>]) -> String {
    if rows.len() <= 1 {
        return EMPTY.to_string();
    }
    let mut builder = Builder::default();
    for r in rows {
        builder.push_record(r.iter().cloned());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn render_page<R>(page: &TablePage<'_, R>) -> String {
    if page.is_empty() {
        return EMPTY.to_string();
    }
    format!(
        "{}\nPágina {} de {} ({} registros)",
        render_rows(&page.string_rows()),
        page.page,
        page.total_pages,
        page.total_rows
    )
}

pub fn render_lines(lines: &[SummaryLine]) -> String {
    if lines.is_empty() {
        return EMPTY.to_string();
    }
    Table::new(lines).with(Style::markdown()).to_string()
}

/// Display captions for summary fields, in the order they are listed.
/// Fields missing here keep their serialized name and go last.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("records", "Registros"),
    ("sessions", "Sesiones"),
    ("total", "Total de Brotes"),
    ("total_outbreaks", "Total de Brotes"),
    ("total_vaccinated", "Animales Vacunados"),
    ("total_animals", "Animales Vacunados"),
    ("imports", "Importaciones"),
    ("exports", "Exportaciones"),
    ("animals_imported", "Animales Importados"),
    ("animals_exported", "Animales Exportados"),
    ("active", "Activos"),
    ("controlled", "Controlados"),
    ("eradicated", "Erradicados"),
    ("active_outbreaks", "Brotes Activos"),
    ("affected_animals", "Animales Afectados"),
    ("males", "Machos"),
    ("females", "Hembras"),
    ("young", "Jóvenes"),
    ("adults", "Adultos"),
    ("alerts", "Alertas"),
    ("movements_by_country", "Importaciones/Exportaciones por País"),
    ("animals_by_purpose", "Animales por Propósito"),
    ("outbreaks_by_status", "Brotes por Estado"),
    ("outbreaks_by_disease", "Brotes por Enfermedad"),
    ("outbreaks_by_region", "Brotes por Región"),
    ("vaccinated_by_region", "Vacunación por Región"),
];

/// `(field, flag)`: the field is listed only while the boolean flag is set.
/// Flags themselves are never listed.
const GATED_FIELDS: &[(&str, &str)] = &[("alerts", "show_alerts")];

fn field_label(name: &str) -> (usize, String) {
    FIELD_LABELS
        .iter()
        .position(|(field, _)| *field == name)
        .map_or((FIELD_LABELS.len(), name.to_string()), |i| (i, FIELD_LABELS[i].1.to_string()))
}

fn display_value(v: &Value, locale: &Locale) -> String {
    match v {
        Value::Number(n) => n.as_u64().map_or_else(|| n.to_string(), |n| format_int(n, locale)),
        Value::Bool(true) => "Sí".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        Value::Null => MISSING.to_string(),
        Value::Array(items) if items.is_empty() => MISSING.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| display_value(item, locale))
            .collect::<Vec<_>>()
            .join("; "),
        // Groups read `key: value`, dual groups `key: first/second`.
        Value::Object(fields) => {
            let rest: Vec<String> = fields
                .iter()
                .filter(|(k, _)| k.as_str() != "key")
                .map(|(_, v)| display_value(v, locale))
                .collect();
            match fields.get("key") {
                Some(key) => format!("{}: {}", display_value(key, locale), rest.join("/")),
                None => rest.join(" - "),
            }
        }
    }
}

/// Flattens the top-level fields of any serializable summary into labelled
/// lines. Nested groups are listed inline.
pub fn summary_lines<T: Serialize>(value: &T, locale: &Locale) -> Vec<SummaryLine> {
    let Ok(Value::Object(map)) = serde_json::to_value(value) else {
        return Vec::new();
    };
    let flag_on = |flag: &str| map.get(flag).and_then(Value::as_bool).unwrap_or(false);
    let listed = |name: &str| {
        GATED_FIELDS.iter().all(|&(field, flag)| {
            name != flag && (name != field || flag_on(flag))
        })
    };
    let mut lines: Vec<(usize, SummaryLine)> = map
        .iter()
        .filter(|(name, _)| listed(name.as_str()))
        .map(|(name, v)| {
            let (order, label) = field_label(name);
            let value = display_value(v, locale);
            (order, SummaryLine { label, value })
        })
        .collect();
    lines.sort_by_key(|(order, _)| *order);
    lines.into_iter().map(|(_, line)| line).collect()
}

/// Horizontal bars for the first series; pie charts also list their labels.
pub fn render_chart(spec: &ChartSpec, locale: &Locale) -> String {
    let mut out = format!("## {}\n", spec.title);
    if spec.is_empty() {
        out.push_str(EMPTY);
        return out;
    }
    let max = spec
        .rows
        .iter()
        .filter_map(|r| r.values.first().copied())
        .max()
        .unwrap_or(0);
    let series: Vec<&str> = spec.series.iter().map(|s| s.label.as_str()).collect();
    if series.len() > 1 {
        out.push_str(&format!("Series: {}\n", series.join(", ")));
    }
    for row in &spec.rows {
        let first = row.values.first().copied().unwrap_or(0);
        let width = if max == 0 { 0 } else { first * BAR_WIDTH / max };
        let values: Vec<String> = row.values.iter().map(|v| format_int(*v, locale)).collect();
        out.push_str(&format!(
            "{:<24} {:<30} {}\n",
            row.name,
            "#".repeat(width as usize),
            values.join(" / ")
        ));
    }
    if spec.kind == ChartKind::Pie {
        let labels: Vec<String> = spec.pie_labels().into_iter().flatten().collect();
        if !labels.is_empty() {
            out.push_str(&format!("Etiquetas: {}\n", labels.join(", ")));
        }
    }
    out
}

pub fn render_map(layer: &MapLayer) -> String {
    let mut out = format!("## {}\n", layer.title);
    if layer.is_empty() {
        out.push_str(EMPTY);
        return out;
    }
    let mut rows = vec![vec![
        "Id".to_string(),
        "Título".to_string(),
        "Lat".to_string(),
        "Lng".to_string(),
        "Alerta".to_string(),
    ]];
    rows.extend(layer.markers.iter().map(|m| {
        vec![
            m.id.clone(),
            m.title.clone(),
            format!("{:.2}", m.coordinates.lat),
            format!("{:.2}", m.coordinates.lng),
            if m.alert { "⚠️".to_string() } else { String::new() },
        ]
    }));
    out.push_str(&render_rows(&rows));
    out.push_str(&format!("\nEnlaces: {}\n", layer.links.len()));
    let legend: Vec<&str> = layer.legend.iter().map(|l| l.label.as_str()).collect();
    out.push_str(&format!("Leyenda: {}\n", legend.join(", ")));
    out
}

pub fn render_detail(panel: &DetailPanel) -> String {
    let mut out = format!("## {}\n", panel.title);
    let lines: Vec<SummaryLine> = panel
        .rows
        .iter()
        .map(|r| SummaryLine {
            label: r.label.clone(),
            value: r.value.clone(),
        })
        .collect();
    out.push_str(&render_lines(&lines));
    out.push('\n');
    for section in &panel.sections {
        out.push_str(&format!("\n### {}\n", section.heading));
        if let Some(text) = &section.text {
            out.push_str(text);
            out.push('\n');
        }
        if !section.rows.is_empty() {
            for r in &section.rows {
                out.push_str(&format!("{}: {}\n", r.label, r.value));
            }
        }
        if !section.table.is_empty() {
            out.push_str(&render_rows(&section.table));
            out.push('\n');
        }
    }
    if !panel.actions.is_empty() {
        out.push_str(&format!("\nAcciones: {}\n", panel.actions.join(" | ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Group;
    use crate::style::StylePalette;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ganado_report_{name}_{}", std::process::id()))
    }

    #[test]
    fn csv_export_keeps_header_and_rows() {
        let dir = scratch_dir("csv");
        let path = export_path(&dir, "tabla", "csv").unwrap();
        let rows = vec![
            vec!["País".to_string(), "Cantidad".to_string()],
            vec!["Brasil".to_string(), "250".to_string()],
        ];
        write_csv(&path, &rows).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "País,Cantidad\nBrasil,250\n");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn json_export_is_pretty() {
        let dir = scratch_dir("json");
        let path = export_path(&dir, "grafico", "json").unwrap();
        write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"a\": 1\n}");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn empty_table_renders_placeholder() {
        assert_eq!(render_rows(&[vec!["Fecha".to_string()]]), EMPTY);
        let md = render_rows(&[vec!["A".to_string()], vec!["x".to_string()]]);
        assert!(md.contains("| A |"));
        assert!(md.contains("| x |"));
    }

    #[test]
    fn chart_preview_lists_rows() {
        let groups = vec![
            Group {
                key: "Meta".to_string(),
                value: 45,
            },
            Group {
                key: "Antioquia".to_string(),
                value: 28,
            },
        ];
        let palette = StylePalette::default();
        let spec = ChartSpec::from_groups(ChartKind::Pie, "Brotes", &groups, &palette);
        let text = render_chart(&spec, &Locale::en);
        assert!(text.starts_with("## Brotes\n"));
        assert!(text.contains("Meta"));
        assert!(text.contains("Etiquetas: Meta: 45, Antioquia: 28"));
    }

    #[test]
    fn summary_lines_flatten_fields() {
        #[derive(Serialize)]
        struct S {
            total_animals: u64,
            records: usize,
            note: bool,
        }
        let lines = summary_lines(
            &S {
                total_animals: 1040,
                records: 5,
                note: true,
            },
            &Locale::en,
        );
        let pairs: Vec<(&str, &str)> =
            lines.iter().map(|l| (l.label.as_str(), l.value.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("Registros", "5"), ("Animales Vacunados", "1,040"), ("note", "Sí")]
        );
    }

    #[test]
    fn alert_lines_follow_their_flag() {
        let data = crate::fixtures::embedded().unwrap();
        let refs: Vec<&crate::types::Movement> = data.movements.iter().collect();

        let quiet = summary_lines(&crate::summary::summarize_movements(&refs, false), &Locale::en);
        assert!(quiet.iter().all(|l| l.label != "Alertas"));
        assert!(quiet.iter().all(|l| !l.label.contains("show_alerts")));
        assert_eq!(quiet[0].label, "Registros");
        assert_eq!(quiet[3].label, "Animales Importados");

        let flagged = summary_lines(&crate::summary::summarize_movements(&refs, true), &Locale::en);
        let alerts = flagged.iter().find(|l| l.label == "Alertas").unwrap();
        assert!(alerts.value.contains("IMP-2025-0158"), "{}", alerts.value);
        assert!(flagged.iter().all(|l| l.label != "show_alerts"));
    }

    #[test]
    fn grouped_fields_read_inline() {
        let data = crate::fixtures::embedded().unwrap();
        let overview = crate::summary::PublicOverview::from_dataset(data);
        let lines = summary_lines(&overview, &Locale::en);
        let region = lines.iter().find(|l| l.label == "Vacunación por Región").unwrap();
        assert!(region.value.starts_with("Cundinamarca: 525; "), "{}", region.value);
        let country = lines
            .iter()
            .find(|l| l.label == "Importaciones/Exportaciones por País")
            .unwrap();
        assert!(country.value.starts_with("Brasil: 250/0; México: 0/180"), "{}", country.value);
    }
}
