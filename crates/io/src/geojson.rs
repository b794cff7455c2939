// GeoJSON read/write
//
// Documents stay as `serde_json::Value` so foreign members and property
// order survive a load/write cycle untouched. Shape checks belong to the
// enrichment engine.

use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;

/// Read and parse a boundary file.
pub fn load_boundary(path: &Path) -> Result<Value, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::from_io(path, e))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let doc: Value = serde_json::from_str(text).map_err(|e| LoadError::parse(path, e.to_string()))?;
    log::debug!(
        "{}: {} features",
        path.display(),
        doc.get("features").and_then(Value::as_array).map_or(0, Vec::len)
    );
    Ok(doc)
}

/// Serialize a document to `out`, followed by a newline.
pub fn write_document<W: Write>(doc: &Value, mut out: W, pretty: bool) -> std::io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, doc)?;
    } else {
        serde_json::to_writer(&mut out, doc)?;
    }
    out.write_all(b"\n")?;
    out.flush()
}

/// Write a document to a file, creating parent directories as needed.
pub fn save_document(doc: &Value, path: &Path, pretty: bool) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_document(doc, std::io::BufWriter::new(file), pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_load_keeps_property_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("yucatan.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"NOMGEO":"MERIDA","CVEGEO":"31050"},"geometry":null}]}"#,
        )
        .unwrap();

        let doc = load_boundary(&path).unwrap();
        let keys: Vec<&String> = doc["features"][0]["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["NOMGEO", "CVEGEO"]);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        std::fs::write(&path, "{\"type\": ").unwrap();
        assert!(matches!(load_boundary(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = tempdir().unwrap();
        assert!(load_boundary(&dir.path().join("none.geojson")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/nested/enriched.geojson");
        let doc = json!({"type": "FeatureCollection", "features": []});
        save_document(&doc, &path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"type\":\"FeatureCollection\",\"features\":[]}\n");
    }
}
