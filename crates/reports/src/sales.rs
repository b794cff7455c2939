//! Sales page: totals by region and the best products by sales and profit.

use geodash_core::Table;
use serde::Serialize;

use crate::aggregate::{sum_by, top_n, GroupTotal};

pub const DEFAULT_TOP: usize = 5;
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub preview: Table,
    pub sales_by_region: Vec<GroupTotal>,
    pub top_selling: Vec<GroupTotal>,
    pub top_profitable: Vec<GroupTotal>,
    pub warnings: Vec<String>,
}

pub fn sales(table: &Table, top: usize) -> SalesReport {
    let mut warnings = Vec::new();
    for column in ["Region", "Product Name", "Sales", "Profit"] {
        if !table.has_column(column) {
            warnings.push(format!("Column '{}' not found.", column));
        }
    }

    let by_region = sum_by(table, "Region", "Sales");
    let by_product = sum_by(table, "Product Name", "Sales");
    let profit = sum_by(table, "Product Name", "Profit");

    let skipped = by_region.skipped.max(by_product.skipped);
    if skipped > 0 {
        warnings.push(format!("{} rows with a non-numeric Sales value were skipped", skipped));
    }
    if profit.skipped > 0 {
        warnings.push(format!("{} rows with a non-numeric Profit value were skipped", profit.skipped));
    }

    SalesReport {
        preview: table.head(PREVIEW_ROWS),
        sales_by_region: by_region.groups,
        top_selling: top_n(&by_product.groups, top),
        top_profitable: top_n(&profit.groups, top),
        warnings,
    }
}
