use std::path::PathBuf;

use geodash_enrich::{
    enrich, enrich_with_report, region_names, style_document, DuplicatePolicy, EnrichError,
    EnrichOptions, FieldOwner, StyleOptions,
};
use serde_json::{json, Value};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_boundary() -> Value {
    geodash_io::load_boundary(&fixtures_dir().join("yucatan.geojson")).unwrap()
}

fn load_table(name: &str) -> geodash_core::Table {
    geodash_io::load_attribute_table(&fixtures_dir().join(name), None).unwrap()
}

fn municipios_options() -> EnrichOptions {
    EnrichOptions::new("NOMGEO", "RandomNumbers").table_key("Municipio")
}

fn value_of<'a>(doc: &'a Value, region: &str) -> &'a Value {
    doc["features"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["properties"]["NOMGEO"] == region)
        .map(|f| &f["properties"]["RandomNumbers"])
        .unwrap_or_else(|| panic!("no feature named {region}"))
}

// -------------------------------------------------------------------------
// Fixture joins
// -------------------------------------------------------------------------

#[test]
fn index_column_is_dropped_on_load() {
    let table = load_table("municipios.csv");
    assert_eq!(table.headers, vec!["Municipio", "RandomNumbers"]);
    assert_eq!(table.len(), 5);
}

#[test]
fn municipios_join() {
    let doc = load_boundary();
    let out = enrich(&doc, &load_table("municipios.csv"), &municipios_options()).unwrap();

    assert_eq!(value_of(&out, "MERIDA"), &json!(500));
    assert_eq!(value_of(&out, "TICUL"), &json!(1200));
    assert_eq!(value_of(&out, "MOTUL"), &json!(0));
    assert_eq!(value_of(&out, "IZAMAL"), &json!(8750));
    assert_eq!(region_names(&out, "NOMGEO").unwrap(), region_names(&doc, "NOMGEO").unwrap());
}

#[test]
fn municipios_report() {
    let doc = load_boundary();
    let result =
        enrich_with_report(&doc, &load_table("municipios.csv"), &municipios_options()).unwrap();
    let report = result.report;

    assert_eq!(report.feature_count, 4);
    assert_eq!(report.matched, 3);
    assert_eq!(report.defaulted, 1);
    assert_eq!(report.unmatched_regions, vec!["MOTUL"]);
    assert_eq!(report.unused_keys, vec!["VALLADOLID"]);
    assert_eq!(report.duplicate_keys.len(), 1);
    assert_eq!(report.duplicate_keys[0].key, "MERIDA");
    assert_eq!(report.duplicate_keys[0].records, vec![0, 3]);
}

#[test]
fn municipios_strict_duplicates() {
    let opts = municipios_options().on_duplicate(DuplicatePolicy::Error);
    let err = enrich(&load_boundary(), &load_table("municipios.csv"), &opts).unwrap_err();
    assert_eq!(
        err,
        EnrichError::DuplicateKey { key: "MERIDA".into(), first_record: 0, duplicate_record: 3 }
    );
}

#[test]
fn unparseable_value_fails_whole_call() {
    let err = enrich(&load_boundary(), &load_table("votos_invalidos.csv"), &municipios_options())
        .unwrap_err();
    match err {
        EnrichError::ValueCoercion { owner, field, value } => {
            assert_eq!(owner, FieldOwner::Record(0));
            assert_eq!(field, "RandomNumbers");
            assert_eq!(value, "quinientos");
        }
        other => panic!("expected coercion error, got {other:?}"),
    }
}

#[test]
fn geometry_and_other_properties_survive() {
    let doc = load_boundary();
    let out = enrich(&doc, &load_table("municipios.csv"), &municipios_options()).unwrap();

    for (before, after) in doc["features"].as_array().unwrap().iter().zip(out["features"].as_array().unwrap()) {
        assert_eq!(before["geometry"], after["geometry"]);
        assert_eq!(before["properties"]["CVEGEO"], after["properties"]["CVEGEO"]);
        assert_eq!(before["properties"]["CVE_MUN"], after["properties"]["CVE_MUN"]);
    }
}

#[test]
fn enrich_then_style() {
    let enriched =
        enrich(&load_boundary(), &load_table("municipios.csv"), &municipios_options()).unwrap();
    let styled = style_document(&enriched, &StyleOptions::new("NOMGEO", "RandomNumbers")).unwrap();

    let merida = styled["features"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["properties"]["NOMGEO"] == "MERIDA")
        .unwrap();
    assert_eq!(merida["properties"]["fill_color"], json!([128, 128, 128, 100]));
    assert_eq!(merida["properties"]["tooltip"], json!("MERIDA\nRandomNumbers: 500"));
}
