//! Coffee-shop sales page: store map, filtered sales, top products and
//! hourly traffic.

use chrono::{NaiveTime, Timelike};
use geodash_core::{Cell, Table};
use serde::Serialize;

use crate::aggregate::{sum_by, top_n, GroupTotal};

pub const STORE_COLUMN: &str = "store_name";
pub const PRODUCT_TYPE_COLUMN: &str = "product_type";
pub const LOCATION_COLUMN: &str = "state store location";

const LEGACY_STORE_COLUMN: &str = "store_location";
const TOP_PRODUCTS: usize = 10;
const PREVIEW_ROWS: usize = 10;

/// Known store towns.
const COORDINATES: &[(&str, f64, f64)] = &[
    ("MOTUL", 21.1667, -89.2667),
    ("TICUL", 20.5833, -89.5333),
    ("MERIDA", 20.9670, -89.6247),
];

pub fn coordinates(location: &str) -> Option<(f64, f64)> {
    COORDINATES
        .iter()
        .find(|(name, _, _)| *name == location)
        .map(|&(_, lat, lon)| (lat, lon))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub pitch: u8,
}

impl MapView {
    /// Whole-state view used when there is nothing to center on.
    pub fn yucatan() -> Self {
        Self { latitude: 20.8, longitude: -89.0, zoom: 7, pitch: 45 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreLocation {
    pub store_name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub transactions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub stores: Vec<String>,
    pub product_types: Vec<String>,
}

/// Multiselect state. `None` selects every option.
#[derive(Debug, Clone, Default)]
pub struct CoffeeSelection {
    pub stores: Option<Vec<String>>,
    pub product_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoffeeReport {
    pub filter_options: FilterOptions,
    pub row_count: usize,
    pub locations: Vec<StoreLocation>,
    pub view: MapView,
    pub preview: Table,
    pub top_products: Vec<GroupTotal>,
    pub hourly: Vec<HourCount>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Sales rows with store coordinates attached.
#[derive(Debug, Clone)]
pub struct CoffeeShops {
    table: Table,
    warnings: Vec<String>,
}

impl CoffeeShops {
    /// Normalize the loaded sheet: rename the legacy store column, clean the
    /// location names, add `latitude`/`longitude`, and drop rows with no
    /// known coordinates.
    pub fn prepare(mut table: Table) -> Self {
        let mut warnings = Vec::new();

        if table.has_column(LEGACY_STORE_COLUMN) && !table.has_column(STORE_COLUMN) {
            table.rename_column(LEGACY_STORE_COLUMN, STORE_COLUMN);
        }

        let loc_col = table.column_index(LOCATION_COLUMN);
        if loc_col.is_none() {
            warnings.push(format!(
                "Column '{}' not found. Cannot map store locations.",
                LOCATION_COLUMN
            ));
        }

        table.headers.push("latitude".to_string());
        table.headers.push("longitude".to_string());
        let width = table.headers.len();

        let before = table.len();
        let rows = std::mem::take(&mut table.rows);
        for mut row in rows {
            let Some(col) = loc_col else { continue };
            let location = row.get(col).map(|c| c.to_string().trim().to_uppercase()).unwrap_or_default();
            let Some((lat, lon)) = coordinates(&location) else { continue };

            row.resize(width - 2, Cell::Empty);
            row[col] = Cell::Text(location);
            row.push(Cell::Number(lat));
            row.push(Cell::Number(lon));
            table.rows.push(row);
        }
        log::debug!("coffee shops: kept {} of {} rows with coordinates", table.len(), before);

        Self { table, warnings }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            stores: self.table.unique_values(STORE_COLUMN),
            product_types: self.table.unique_values(PRODUCT_TYPE_COLUMN),
        }
    }

    /// Rows whose store and product type are both selected.
    pub fn filter(&self, selection: &CoffeeSelection) -> Table {
        let mut filtered = self.table.clone();
        filtered.retain_rows(|t, row| {
            selected(t, row, STORE_COLUMN, selection.stores.as_deref())
                && selected(t, row, PRODUCT_TYPE_COLUMN, selection.product_types.as_deref())
        });
        filtered
    }

    pub fn report(&self, selection: &CoffeeSelection) -> CoffeeReport {
        let filtered = self.filter(selection);
        let mut warnings = self.warnings.clone();

        let locations = store_locations(&filtered);
        if filtered.is_empty() {
            warnings.push("No store locations to display based on current filters.".to_string());
            warnings.push("No data available for the selected filters.".to_string());
            warnings.push(
                "No hay datos de productos para mostrar con los filtros seleccionados.".to_string(),
            );
            warnings.push(
                "No hay datos de afluencia para mostrar con los filtros seleccionados.".to_string(),
            );
        }

        let products = sum_by(&filtered, "product_detail", "transaction_qty");
        if products.skipped > 0 {
            warnings.push(format!("{} rows with a non-numeric transaction_qty were skipped", products.skipped));
        }

        let (hourly, unreadable) = hourly_traffic(&filtered);
        if unreadable > 0 {
            warnings.push(format!("{} rows with an unreadable transaction_time were skipped", unreadable));
        }

        CoffeeReport {
            filter_options: self.filter_options(),
            row_count: filtered.len(),
            view: map_view(&locations),
            locations,
            preview: filtered.head(PREVIEW_ROWS),
            top_products: top_n(&products.groups, TOP_PRODUCTS),
            hourly,
            warnings,
        }
    }
}

fn selected(table: &Table, row: &[Cell], column: &str, choices: Option<&[String]>) -> bool {
    let Some(choices) = choices else {
        return true;
    };
    match table.cell(row, column) {
        Some(cell) if !cell.is_empty() => {
            let value = cell.key_text();
            choices.iter().any(|c| *c == value)
        }
        _ => false,
    }
}

/// Distinct (store, location, lat, lon) tuples in row order.
pub fn store_locations(table: &Table) -> Vec<StoreLocation> {
    let mut out: Vec<StoreLocation> = Vec::new();
    for row in &table.rows {
        let text = |col: &str| table.cell(row, col).map(|c| c.to_string()).unwrap_or_default();
        let number = |col: &str| table.cell(row, col).and_then(Cell::as_number);
        let (Some(latitude), Some(longitude)) = (number("latitude"), number("longitude")) else {
            continue;
        };
        let loc = StoreLocation {
            store_name: text(STORE_COLUMN),
            location: text(LOCATION_COLUMN),
            latitude,
            longitude,
        };
        if !out.contains(&loc) {
            out.push(loc);
        }
    }
    out
}

/// Center on the mean of the store coordinates.
pub fn map_view(locations: &[StoreLocation]) -> MapView {
    if locations.is_empty() {
        return MapView::yucatan();
    }
    let n = locations.len() as f64;
    MapView {
        latitude: locations.iter().map(|l| l.latitude).sum::<f64>() / n,
        longitude: locations.iter().map(|l| l.longitude).sum::<f64>() / n,
        zoom: 9,
        pitch: 45,
    }
}

/// Count of `transaction_id` per hour of `transaction_time`, ascending hours.
/// Returns the counts and the number of rows whose time could not be read.
pub fn hourly_traffic(table: &Table) -> (Vec<HourCount>, usize) {
    let mut counts = [0usize; 24];
    let mut seen = [false; 24];
    let mut unreadable = 0;

    for row in &table.rows {
        let Some(hour) = table.cell(row, "transaction_time").and_then(hour_of) else {
            unreadable += 1;
            continue;
        };
        let h = hour as usize;
        seen[h] = true;
        if table.cell(row, "transaction_id").is_some_and(|c| !c.is_empty()) {
            counts[h] += 1;
        }
    }

    let hourly = (0..24)
        .filter(|&h| seen[h])
        .map(|h| HourCount { hour: h as u32, transactions: counts[h] })
        .collect();
    (hourly, unreadable)
}

/// Hour of a time cell: `HH:MM:SS` text, a timestamp, or a day fraction.
fn hour_of(cell: &Cell) -> Option<u32> {
    match cell {
        Cell::DateTime(dt) => Some(dt.hour()),
        Cell::Text(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S").ok().map(|t| t.hour()),
        Cell::Number(n) if (0.0..1.0).contains(n) => {
            let seconds = (n * 86_400.0).round() as u32;
            Some((seconds / 3600).min(23))
        }
        _ => None,
    }
}
