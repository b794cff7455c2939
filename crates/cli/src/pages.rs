// coffee / sales / traffic commands

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use serde_json::Value;

use geodash_config::Settings;
use geodash_core::Table;
use geodash_enrich::{enrich, style_document, EnrichError, LayerStyle, StyleOptions};
use geodash_io::LoadError;
use geodash_reports::{
    sales, traffic, CoffeeReport, CoffeeSelection, CoffeeShops, GroupTotal, SalesReport,
    TrafficReport,
};

use crate::util::{format_total, render_table};
use crate::CliError;

#[derive(Args)]
pub struct CoffeeArgs {
    /// Coffee-shop sales sheet (xlsx, csv)
    file: PathBuf,

    /// Sheet name for multi-sheet workbooks
    #[arg(long)]
    sheet: Option<String>,

    /// Keep only these stores (repeatable; default: all)
    #[arg(long = "store", value_name = "NAME")]
    stores: Vec<String>,

    /// Keep only these product types (repeatable; default: all)
    #[arg(long = "product-type", value_name = "TYPE")]
    product_types: Vec<String>,

    /// Municipality boundaries for the base map [settings: map.boundaryFile]
    #[arg(long)]
    boundary: Option<PathBuf>,

    /// Per-municipality values for the base map [settings: map.attributeFile]
    #[arg(long)]
    attributes: Option<PathBuf>,

    /// Print the report (and map layer) as JSON
    #[arg(long)]
    json: bool,
}

/// Styled municipality layer drawn under the store points.
#[derive(Serialize)]
struct MapLayer {
    style: LayerStyle,
    document: Value,
}

#[derive(Serialize)]
struct CoffeePage<'a> {
    #[serde(flatten)]
    report: &'a CoffeeReport,
    layer: Option<MapLayer>,
}

fn load_sheet(file: &Path, sheet: Option<&str>) -> Result<Table, CliError> {
    let table = geodash_io::load_table(file, sheet).map_err(CliError::input)?;
    log::info!("{}: {} rows, {} columns", file.display(), table.len(), table.headers.len());
    Ok(table)
}

fn none_if_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn write_stdout(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(CliError::output(format!("cannot write to stdout: {}", e))),
    }
}

fn write_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    write_stdout(&(json + "\n"))
}

fn print_warnings(warnings: &[String]) {
    for w in warnings {
        eprintln!("warning: {}", w);
    }
}

fn totals_table(label: &str, value: &str, groups: &[GroupTotal]) -> String {
    let rows: Vec<Vec<String>> =
        groups.iter().map(|g| vec![g.key.clone(), format_total(g.total)]).collect();
    render_table(&[label, value], &rows, &[1])
}

// ============================================================================
// coffee
// ============================================================================

/// Boundary plus attribute table, enriched and styled. `Ok(None)` when no
/// base map is configured; `Err` carries the reason it could not be built.
fn municipality_layer(
    boundary: Option<&Path>,
    attributes: Option<&Path>,
    settings: &Settings,
) -> Result<Option<MapLayer>, String> {
    let (Some(boundary), Some(attributes)) = (boundary, attributes) else {
        log::debug!("no boundary/attributes configured; skipping base map");
        return Ok(None);
    };

    let doc = geodash_io::load_boundary(boundary).map_err(load_failure)?;
    let table = geodash_io::load_attribute_table(attributes, None).map_err(load_failure)?;

    let opts = settings.enrich_options();
    let enriched = enrich(&doc, &table, &opts).map_err(enrich_failure)?;
    let style = StyleOptions {
        name_field: opts.join_key_field.clone(),
        value_field: opts.effective_target().to_string(),
        ramp: settings.fill_ramp(),
    };
    let document = style_document(&enriched, &style).map_err(enrich_failure)?;
    Ok(Some(MapLayer { style: LayerStyle::default(), document }))
}

fn load_failure(err: LoadError) -> String {
    if err.is_not_found() {
        format!("GeoJSON or attributes file not found ({}).", err)
    } else {
        format!("Cannot load the base map: {}.", err)
    }
}

fn enrich_failure(err: EnrichError) -> String {
    format!("Cannot join the attributes onto the base map: {}.", err)
}

pub fn cmd_coffee(args: CoffeeArgs, settings: &Settings) -> Result<(), CliError> {
    let table = load_sheet(&args.file, args.sheet.as_deref())?;
    let shops = CoffeeShops::prepare(table);
    let selection = CoffeeSelection {
        stores: none_if_empty(args.stores),
        product_types: none_if_empty(args.product_types),
    };
    let mut report = shops.report(&selection);

    let boundary = args.boundary.as_deref().or(settings.boundary_file.as_deref());
    let attributes = args.attributes.as_deref().or(settings.attribute_file.as_deref());
    let layer = municipality_layer(boundary, attributes, settings).unwrap_or_else(|reason| {
        log::warn!("{}", reason);
        report.warnings.push(format!("{} The base map will not be displayed.", reason));
        None
    });

    print_warnings(&report.warnings);
    if args.json {
        return write_json(&CoffeePage { report: &report, layer });
    }

    let mut text = String::new();
    text.push_str(&format!(
        "Stores ({} of {} rows)  view {:.4}, {:.4} zoom {} pitch {}\n",
        report.row_count,
        shops.table().len(),
        report.view.latitude,
        report.view.longitude,
        report.view.zoom,
        report.view.pitch
    ));
    let rows: Vec<Vec<String>> = report
        .locations
        .iter()
        .map(|l| {
            vec![
                l.store_name.clone(),
                l.location.clone(),
                format!("{:.4}", l.latitude),
                format!("{:.4}", l.longitude),
            ]
        })
        .collect();
    text.push_str(&render_table(&["store", "location", "lat", "lon"], &rows, &[2, 3]));

    if let Some(layer) = &layer {
        let count = layer.document["features"].as_array().map_or(0, Vec::len);
        text.push_str(&format!("\nBase map: {} municipalities\n", count));
    }

    text.push_str("\nTop products\n");
    text.push_str(&totals_table("product", "quantity", &report.top_products));

    text.push_str("\nTransactions by hour\n");
    let rows: Vec<Vec<String>> = report
        .hourly
        .iter()
        .map(|h| vec![format!("{:02}", h.hour), h.transactions.to_string()])
        .collect();
    text.push_str(&render_table(&["hour", "transactions"], &rows, &[1]));

    write_stdout(&text)
}

// ============================================================================
// sales
// ============================================================================

pub fn cmd_sales(file: PathBuf, sheet: Option<String>, top: usize, json: bool) -> Result<(), CliError> {
    if top == 0 {
        return Err(CliError::usage("--top must be at least 1"));
    }
    let table = load_sheet(&file, sheet.as_deref())?;
    let report: SalesReport = sales(&table, top);

    print_warnings(&report.warnings);
    if json {
        return write_json(&report);
    }

    let mut text = String::from("Sales by region\n");
    text.push_str(&totals_table("Region", "Sales", &report.sales_by_region));
    text.push_str(&format!("\nTop {} selling products\n", top));
    text.push_str(&totals_table("Product Name", "Sales", &report.top_selling));
    text.push_str(&format!("\nTop {} most profitable products\n", top));
    text.push_str(&totals_table("Product Name", "Profit", &report.top_profitable));
    write_stdout(&text)
}

// ============================================================================
// traffic
// ============================================================================

pub fn cmd_traffic(
    file: PathBuf,
    sheet: Option<String>,
    year: Option<i32>,
    month: Option<u32>,
    json: bool,
) -> Result<(), CliError> {
    let table = load_sheet(&file, sheet.as_deref())?;
    let report: TrafficReport = traffic(&table, year, month);

    print_warnings(&report.warnings);
    if json {
        return write_json(&report);
    }

    let period = match (report.year, report.month) {
        (Some(y), Some(m)) => format!("{}-{:02}", y, m),
        _ => "no data".to_string(),
    };
    let mut text = format!("Clients per day ({})\n", period);
    let rows: Vec<Vec<String>> =
        report.days.iter().map(|d| vec![d.label.clone(), d.clients.to_string()]).collect();
    text.push_str(&render_table(&["day", "clients"], &rows, &[1]));
    write_stdout(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_multiselect_means_all() {
        assert_eq!(none_if_empty(vec![]), None);
        assert_eq!(none_if_empty(vec!["Astoria".into()]), Some(vec!["Astoria".to_string()]));
    }

    #[test]
    fn unconfigured_layer_is_skipped() {
        let layer = municipality_layer(None, Some(Path::new("municipiosDatos.csv")), &Settings::default());
        assert!(matches!(layer, Ok(None)));
    }

    #[test]
    fn missing_layer_inputs_give_a_reason() {
        let dir = tempdir().unwrap();
        let reason = municipality_layer(
            Some(dir.path().join("Yucatan.geojson").as_path()),
            Some(dir.path().join("municipiosDatos.csv").as_path()),
            &Settings::default(),
        )
        .err()
        .unwrap();
        assert!(reason.starts_with("GeoJSON or attributes file not found"), "{reason}");
    }

    #[test]
    fn malformed_boundary_gives_a_reason() {
        let dir = tempdir().unwrap();
        let boundary = dir.path().join("Yucatan.geojson");
        let attributes = dir.path().join("municipiosDatos.csv");
        fs::write(&boundary, r#"{"type":"Feature","properties":{}}"#).unwrap();
        fs::write(&attributes, "Unnamed: 0,Municipio,RandomNumbers\n0,MERIDA,1000\n").unwrap();

        let reason = municipality_layer(Some(boundary.as_path()), Some(attributes.as_path()), &Settings::default())
            .err()
            .unwrap();
        assert!(reason.starts_with("Cannot join the attributes onto the base map"), "{reason}");
        assert!(reason.contains("FeatureCollection"), "{reason}");
    }

    #[test]
    fn attributes_without_join_columns_give_a_reason() {
        let dir = tempdir().unwrap();
        let boundary = dir.path().join("Yucatan.geojson");
        let attributes = dir.path().join("municipiosDatos.csv");
        fs::write(
            &boundary,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"NOMGEO":"MERIDA"},"geometry":null}]}"#,
        )
        .unwrap();
        fs::write(&attributes, "Nombre,Valor\nMERIDA,1000\n").unwrap();

        let reason = municipality_layer(Some(boundary.as_path()), Some(attributes.as_path()), &Settings::default())
            .err()
            .unwrap();
        assert!(reason.contains("missing field 'Municipio'"), "{reason}");
    }

    #[test]
    fn layer_is_enriched_and_styled() {
        let dir = tempdir().unwrap();
        let boundary = dir.path().join("Yucatan.geojson");
        let attributes = dir.path().join("municipiosDatos.csv");
        fs::write(
            &boundary,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"NOMGEO":"MERIDA"},"geometry":null},
                {"type":"Feature","properties":{"NOMGEO":"MOTUL"},"geometry":null}]}"#,
        )
        .unwrap();
        fs::write(&attributes, "Unnamed: 0,Municipio,RandomNumbers\n0,MERIDA,1000\n").unwrap();

        let layer = municipality_layer(Some(boundary.as_path()), Some(attributes.as_path()), &Settings::default())
            .unwrap()
            .unwrap();
        let props = &layer.document["features"][1]["properties"];
        assert_eq!(props["RandomNumbers"], 0);
        assert_eq!(props["fill_color"], serde_json::json!([0, 0, 255, 100]));
        assert_eq!(layer.style.opacity, 0.5);
    }

    #[test]
    fn totals_render_rounded() {
        let groups = vec![GroupTotal { key: "Phone".into(), total: 799.999 }];
        assert_eq!(totals_table("Product Name", "Sales", &groups), "Product Name  Sales\nPhone           800\n");
    }
}
