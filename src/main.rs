// Entry point and interactive menu.
//
// - The main menu picks one of the three reports or the public overview.
// - Inside a report, single-letter commands switch tabs, page, filter,
//   select records and export what is on screen.
// - Errors are printed and the menu keeps going.
use ganado_report::config::AppConfig;
use ganado_report::error::Result;
use ganado_report::filter::Criteria;
use ganado_report::movement::MovementSchema;
use ganado_report::nav::Route;
use ganado_report::outbreak::OutbreakSchema;
use ganado_report::summary::PublicOverview;
use ganado_report::types::Dataset;
use ganado_report::vaccination::VaccinationSchema;
use ganado_report::view::{ReportSchema, ReportView, Tab};
use ganado_report::{fixtures, output};

use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::path::PathBuf;

// A fixture file named in the configuration is loaded once and kept for the
// whole run, so views can borrow from it like from the embedded data.
static LOADED: OnceCell<Dataset> = OnceCell::new();

enum Flow {
    Back,
    Quit,
}

/// Prints the prompt and reads one trimmed line. `None` on end of input.
fn read_choice() -> Option<String> {
    print!("Opción: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn load_dataset(config: &AppConfig) -> Result<&'static Dataset> {
    match &config.fixture_path {
        Some(path) => {
            let (data, report) = fixtures::load_from_path(path)?;
            log::debug!("{report:?}");
            Ok(LOADED.get_or_init(|| data))
        }
        None => Ok(fixtures::embedded()?),
    }
}

fn print_overview(data: &Dataset, config: &AppConfig) {
    let overview = PublicOverview::from_dataset(data);
    println!("\n# Resumen Público");
    let lines = output::summary_lines(&overview, &config.locale);
    println!("{}\n", output::render_lines(&lines));
}

fn print_view<S: ReportSchema>(view: &ReportView<'_, S>, config: &AppConfig) {
    println!("\n# {} [{}]", view.title(), tab_name(view.tab()));
    println!("{}", output::render_lines(&output::summary_lines(&view.summary(), &config.locale)));
    match view.tab() {
        Tab::Table => println!("{}", output::render_page(&view.table_page())),
        Tab::Map => println!("{}", output::render_map(&view.map_layer())),
        Tab::Chart => {
            for spec in view.charts() {
                println!("{}", output::render_chart(&spec, &config.locale));
            }
        }
    }
    if let Some(panel) = view.detail() {
        println!("{}", output::render_detail(&panel));
    }
}

fn print_view_help() {
    println!("[t] Tabla  [m] Mapa  [c] Gráficos  [n/p] Página siguiente/anterior");
    println!("[f campo=valor] Filtrar  [f] Ver filtros  [r] Limpiar filtros");
    println!("[s id] Seleccionar  [x] Cerrar detalle  [e] Exportar  [o] Resumen público");
    println!("[b] Volver  [q] Salir\n");
}

fn print_filters<S: ReportSchema>(view: &ReportView<'_, S>) {
    println!(
        "Campos: {}",
        <S::Filter as Criteria<S::Record>>::FIELDS.join(", ")
    );
    for opts in view.filter_options() {
        let values: Vec<String> = opts
            .values
            .iter()
            .map(|(value, label)| {
                if value == label {
                    value.clone()
                } else {
                    format!("{value} ({label})")
                }
            })
            .collect();
        println!("  {}: {}", opts.field, values.join(", "));
    }
    println!("Filtro actual: {:?}\n", view.filter());
}

fn handle_filter<S: ReportSchema>(view: &mut ReportView<'_, S>, arg: &str) {
    if arg.is_empty() {
        print_filters(view);
        return;
    }
    let Some((field, value)) = arg.split_once('=') else {
        println!("Formato: f campo=valor (valor vacío limpia el campo)\n");
        return;
    };
    if let Err(e) = view.set_filter(field.trim(), value.trim()) {
        println!("Filtro rechazado: {e}\n");
    }
}

fn tab_name(tab: Tab) -> &'static str {
    match tab {
        Tab::Table => "tabla",
        Tab::Map => "mapa",
        Tab::Chart => "graficos",
    }
}

/// Writes the current tab: CSV for the table page, JSON for map and charts.
fn export_tab<S: ReportSchema>(
    route: Route,
    view: &ReportView<'_, S>,
    config: &AppConfig,
) -> Result<PathBuf> {
    let stem = format!("{}_{}", route.path().trim_start_matches('/'), tab_name(view.tab()));
    let path = match view.tab() {
        Tab::Table => {
            let path = output::export_path(&config.export_dir, &stem, "csv")?;
            output::write_csv(&path, &view.table_page().string_rows())?;
            path
        }
        Tab::Map => {
            let path = output::export_path(&config.export_dir, &stem, "json")?;
            output::write_json(&path, &view.map_layer())?;
            path
        }
        Tab::Chart => {
            let path = output::export_path(&config.export_dir, &stem, "json")?;
            let payloads: Vec<serde_json::Value> =
                view.charts().iter().map(|c| c.payload()).collect();
            output::write_json(&path, &payloads)?;
            path
        }
    };
    Ok(path)
}

fn run_view<S: ReportSchema>(
    route: Route,
    records: &[S::Record],
    data: &Dataset,
    config: &AppConfig,
) -> Flow {
    let mut view: ReportView<'_, S> = ReportView::new(records, config);
    loop {
        print_view(&view, config);
        print_view_help();
        let Some(line) = read_choice() else {
            return Flow::Quit;
        };
        let (cmd, arg) = match line.split_once(' ') {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line.as_str(), ""),
        };
        match cmd {
            "t" | "m" | "c" => {
                if let Some(tab) = Tab::parse(cmd) {
                    view.select_tab(tab);
                }
            }
            "n" => {
                if !view.next_page() {
                    println!("Ya está en la última página.");
                }
            }
            "p" => {
                if !view.prev_page() {
                    println!("Ya está en la primera página.");
                }
            }
            "f" => handle_filter(&mut view, arg),
            "r" => view.reset_filters(),
            "s" => {
                if !view.select(arg) && !view.click_marker(arg) {
                    println!("No existe el registro {arg:?}.");
                }
            }
            "x" => view.close_detail(),
            "e" => match export_tab(route, &view, config) {
                Ok(path) => println!("Exportado a {}", path.display()),
                Err(e) => eprintln!("Error al exportar: {e}"),
            },
            "o" => print_overview(data, config),
            "b" => return Flow::Back,
            "q" => return Flow::Quit,
            "" => {}
            _ => println!("Comando no reconocido: {cmd}"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env();
    log::debug!("{config:?}");

    let data = match load_dataset(&config) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("No se pudieron cargar los datos: {e}");
            std::process::exit(1);
        }
    };

    loop {
        println!("Seleccione un reporte:");
        for (i, route) in Route::ALL.iter().enumerate() {
            println!("[{}] {}", i + 1, route.label());
        }
        println!("[o] Resumen público");
        println!("[q] Salir\n");
        let Some(choice) = read_choice() else {
            break;
        };
        let flow = match choice.as_str() {
            "q" => break,
            "o" => {
                print_overview(data, &config);
                continue;
            }
            other => {
                let route = Route::parse(other);
                log::debug!("Navigating to {}", route.path());
                match route {
                    Route::Movements => {
                        run_view::<MovementSchema>(route, &data.movements, data, &config)
                    }
                    Route::Outbreaks => {
                        run_view::<OutbreakSchema>(route, &data.outbreaks, data, &config)
                    }
                    Route::Vaccinations => {
                        run_view::<VaccinationSchema>(route, &data.vaccinations, data, &config)
                    }
                }
            }
        };
        if let Flow::Quit = flow {
            break;
        }
    }
    println!("Saliendo del programa.");
}
