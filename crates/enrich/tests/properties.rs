// Property-based tests for the enrichment contract.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashMap;

use geodash_core::{Cell, Table};
use geodash_enrich::{enrich, enrich_with_report, EnrichOptions};
use proptest::prelude::*;
use serde_json::{json, Value};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small name pool so features and records collide often.
fn arb_region() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("MERIDA".to_string()),
        Just("TICUL".to_string()),
        Just("MOTUL".to_string()),
        Just("IZAMAL".to_string()),
        Just("merida".to_string()),
        r"[A-Z]{3,8}",
    ]
}

fn arb_boundary() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_region(), 0..12).prop_map(|names| {
        let features: Vec<Value> = names
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                json!({
                    "type": "Feature",
                    "id": i,
                    "properties": {"NOMGEO": n, "CVE_MUN": format!("{i:03}")},
                    "geometry": null
                })
            })
            .collect();
        json!({"type": "FeatureCollection", "features": features})
    })
}

fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec((arb_region(), -100_000i64..100_000), 0..12).prop_map(|records| {
        let rows = records
            .into_iter()
            .map(|(name, v)| vec![Cell::from(name), Cell::from(v.to_string())])
            .collect();
        Table::with_rows(vec!["NOMGEO".into(), "value".into()], rows)
    })
}

fn first_values(table: &Table) -> HashMap<String, i64> {
    let mut first = HashMap::new();
    for row in &table.rows {
        let value: i64 = row[1].to_string().parse().unwrap();
        first.entry(row[0].to_string()).or_insert(value);
    }
    first
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn feature_count_and_order_preserved(doc in arb_boundary(), table in arb_table()) {
        let out = enrich(&doc, &table, &EnrichOptions::new("NOMGEO", "value")).unwrap();
        let before = doc["features"].as_array().unwrap();
        let after = out["features"].as_array().unwrap();
        prop_assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after) {
            prop_assert_eq!(&b["id"], &a["id"]);
            prop_assert_eq!(&b["properties"]["NOMGEO"], &a["properties"]["NOMGEO"]);
        }
    }

    #[test]
    fn matched_features_take_first_record(doc in arb_boundary(), table in arb_table()) {
        let first = first_values(&table);
        let opts = EnrichOptions::new("NOMGEO", "value").default_value(-1.5);
        let out = enrich(&doc, &table, &opts).unwrap();

        for feature in out["features"].as_array().unwrap() {
            let name = feature["properties"]["NOMGEO"].as_str().unwrap();
            let expected = match first.get(name) {
                Some(v) => json!(v),
                None => json!(-1.5),
            };
            prop_assert_eq!(&feature["properties"]["value"], &expected);
        }
    }

    #[test]
    fn input_document_untouched(doc in arb_boundary(), table in arb_table()) {
        let snapshot = doc.clone();
        let _ = enrich(&doc, &table, &EnrichOptions::new("NOMGEO", "value")).unwrap();
        prop_assert_eq!(doc, snapshot);
    }

    #[test]
    fn repeated_calls_agree(doc in arb_boundary(), table in arb_table()) {
        let opts = EnrichOptions::new("NOMGEO", "value");
        prop_assert_eq!(enrich(&doc, &table, &opts), enrich(&doc, &table, &opts));
    }

    #[test]
    fn re_enriching_output_changes_nothing(doc in arb_boundary(), table in arb_table()) {
        let opts = EnrichOptions::new("NOMGEO", "value");
        let once = enrich(&doc, &table, &opts).unwrap();
        let twice = enrich(&once, &table, &opts).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn report_counts_add_up(doc in arb_boundary(), table in arb_table()) {
        let result = enrich_with_report(&doc, &table, &EnrichOptions::new("NOMGEO", "value")).unwrap();
        let report = result.report;
        prop_assert_eq!(report.feature_count, doc["features"].as_array().unwrap().len());
        prop_assert_eq!(report.matched + report.defaulted, report.feature_count);
        prop_assert_eq!(report.unmatched_regions.len(), report.defaulted);
    }
}
