use std::collections::{HashMap, HashSet};

use geodash_core::{Cell, Table};
use serde::Serialize;
use serde_json::Value;

use crate::document::{feature_key, features, features_mut, properties_mut};
use crate::error::{EnrichError, FieldOwner};
use crate::options::{DuplicatePolicy, EnrichOptions};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
    /// Every record index carrying the key, in table order. The first one is
    /// the record used for the join.
    pub records: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichReport {
    pub feature_count: usize,
    pub matched: usize,
    pub defaulted: usize,
    /// Region names that received the default, in feature order.
    pub unmatched_regions: Vec<String>,
    /// Table keys no feature asked for, in table order.
    pub unused_keys: Vec<String>,
    pub duplicate_keys: Vec<DuplicateKey>,
}

#[derive(Debug, Clone)]
pub struct Enriched {
    pub document: Value,
    pub report: EnrichReport,
}

// ---------------------------------------------------------------------------
// Key index
// ---------------------------------------------------------------------------

struct KeyIndex {
    /// Key text -> first record index.
    first: HashMap<String, usize>,
    /// Distinct keys in table order.
    order: Vec<String>,
    duplicates: Vec<DuplicateKey>,
    value_col: usize,
}

/// Index the table by join key, validating every record up front so a bad
/// record fails the call even when no feature would have matched it.
fn index_table(table: &Table, opts: &EnrichOptions) -> Result<KeyIndex, EnrichError> {
    let key_field = opts.effective_table_key();
    let value_field = opts.value_field.as_str();

    let mut first: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    let mut dup_slots: HashMap<String, usize> = HashMap::new();
    let mut duplicates: Vec<DuplicateKey> = Vec::new();

    if table.is_empty() {
        return Ok(KeyIndex { first, order, duplicates, value_col: 0 });
    }

    let missing = |record: usize, field: &str| EnrichError::MissingField {
        owner: FieldOwner::Record(record),
        field: field.to_string(),
    };
    let key_col = table.column_index(key_field).ok_or_else(|| missing(0, key_field))?;
    let value_col = table.column_index(value_field).ok_or_else(|| missing(0, value_field))?;

    for (i, row) in table.rows.iter().enumerate() {
        let key_cell = row.get(key_col).ok_or_else(|| missing(i, key_field))?;
        if row.get(value_col).is_none() {
            return Err(missing(i, value_field));
        }
        if key_cell.is_empty() {
            continue;
        }

        let key = key_cell.key_text();
        match first.get(&key) {
            None => {
                first.insert(key.clone(), i);
                order.push(key);
            }
            Some(&first_record) => {
                if opts.on_duplicate == DuplicatePolicy::Error {
                    return Err(EnrichError::DuplicateKey {
                        key,
                        first_record,
                        duplicate_record: i,
                    });
                }
                let slot = *dup_slots.entry(key.clone()).or_insert_with(|| {
                    duplicates.push(DuplicateKey { key: key.clone(), records: vec![first_record] });
                    duplicates.len() - 1
                });
                duplicates[slot].records.push(i);
            }
        }
    }

    Ok(KeyIndex { first, order, duplicates, value_col })
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Copy `boundary` and inject the joined value into every feature.
///
/// The boundary document is never mutated. On error nothing is returned.
pub fn enrich(boundary: &Value, table: &Table, opts: &EnrichOptions) -> Result<Value, EnrichError> {
    enrich_with_report(boundary, table, opts).map(|e| e.document)
}

/// Like [`enrich`], also reporting matched/defaulted regions and duplicate keys.
pub fn enrich_with_report(
    boundary: &Value,
    table: &Table,
    opts: &EnrichOptions,
) -> Result<Enriched, EnrichError> {
    features(boundary)?;
    let index = index_table(table, opts)?;

    let mut document = boundary.clone();
    let target = opts.effective_target();
    // Non-finite defaults have no JSON form and are written as null.
    let default = if opts.default_value.is_finite() {
        number_value(opts.default_value)
    } else {
        Value::Null
    };

    let mut report = EnrichReport::default();
    let mut used: HashSet<String> = HashSet::new();

    for (i, feature) in features_mut(&mut document)?.iter_mut().enumerate() {
        let region = feature_key(i, feature, &opts.join_key_field)?;

        let value = match index.first.get(&region) {
            Some(&record) => {
                let cell = table.rows[record]
                    .get(index.value_col)
                    .ok_or_else(|| EnrichError::MissingField {
                        owner: FieldOwner::Record(record),
                        field: opts.value_field.clone(),
                    })?;
                let value = coerce_value(cell, record, &opts.value_field)?;
                report.matched += 1;
                used.insert(region);
                value
            }
            None => {
                report.defaulted += 1;
                report.unmatched_regions.push(region);
                default.clone()
            }
        };

        if let Some(props) = properties_mut(feature) {
            props.insert(target.to_string(), value);
        }
        report.feature_count += 1;
    }

    report.unused_keys = index.order.into_iter().filter(|k| !used.contains(k)).collect();
    report.duplicate_keys = index.duplicates;

    Ok(Enriched { document, report })
}

/// Numeric JSON value for a matched cell. Integral values become JSON
/// integers; empty, non-numeric and non-finite cells are coercion errors.
fn coerce_value(cell: &Cell, record: usize, field: &str) -> Result<Value, EnrichError> {
    match cell.as_number() {
        Some(n) if n.is_finite() => Ok(number_value(n)),
        _ => Err(EnrichError::ValueCoercion {
            owner: FieldOwner::Record(record),
            field: field.to_string(),
            value: cell.to_string(),
        }),
    }
}

pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
