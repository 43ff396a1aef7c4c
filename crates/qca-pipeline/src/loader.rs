//! Tolerant loading of extraction-produced case records

use crate::error::Result;
use qca_audit::trail::event;
use qca_audit::AuditTrail;
use qca_domain::{Case, CaseMetadata};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Load every `*.json` case record under `input_dir`
///
/// Files are read in sorted name order so identical inputs always produce
/// the same case ordering. Per-record anomalies (missing id field,
/// non-numeric properties) are warnings with safe defaults, never errors.
pub fn load_cases(input_dir: &Path, case_id_field: &str, audit: &mut AuditTrail) -> Result<Vec<Case>> {
    let mut paths: Vec<_> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut cases = Vec::with_capacity(paths.len());
    for path in &paths {
        let text = std::fs::read_to_string(path)?;
        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!(file = %path.display(), "skipping unparseable case record: {e}");
                audit.record(
                    event::WARNING,
                    json!({"file": path.display().to_string(), "message": format!("unparseable case record: {e}")}),
                );
                continue;
            }
        };
        cases.push(parse_case(&value, path, case_id_field, audit));
    }

    info!(cases = cases.len(), dir = %input_dir.display(), "case records loaded");
    audit.record(event::CASES_LOADED, json!({"count": cases.len()}));
    Ok(cases)
}

fn parse_case(value: &Value, path: &Path, case_id_field: &str, audit: &mut AuditTrail) -> Case {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let case_id = match &value[case_id_field] {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            let fallback = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone());
            warn!(
                file = %file_name,
                field = case_id_field,
                "case id field missing, falling back to file stem '{fallback}'"
            );
            audit.record(
                event::WARNING,
                json!({
                    "file": file_name,
                    "message": format!("case id field '{case_id_field}' missing, using '{fallback}'"),
                }),
            );
            fallback
        }
    };

    // Extraction output sometimes nests the payload under "extraction".
    let payload = if value["extraction"].is_object() {
        &value["extraction"]
    } else {
        value
    };

    Case {
        case_id,
        codes: id_list(&payload["codes"], "code_id"),
        entities: id_list(&payload["entities"], "entity_id"),
        relationships: id_list(&payload["relationships"], "relationship_id"),
        speaker_properties: numeric_map(&payload["speaker_properties"]),
        metadata: CaseMetadata {
            word_count: metadata_field(value, "word_count"),
            speaker_count: metadata_field(value, "speaker_count"),
            quote_count: metadata_field(value, "quote_count"),
        },
        source_file: file_name,
    }
}

// Both supported shapes flatten to the same list: ["a", "a", "b"] and
// [{"code_id": "a"}, {"code_id": "a"}, {"code_id": "b"}] count identically.
fn id_list(value: &Value, object_key: &str) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get(object_key)
                .or_else(|| obj.get("id"))
                .or_else(|| obj.get("name"))
                .or_else(|| obj.get("type"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            _ => None,
        })
        .collect()
}

fn numeric_map(value: &Value) -> BTreeMap<String, f64> {
    let Some(obj) = value.as_object() else {
        return BTreeMap::new();
    };
    obj.iter()
        .filter_map(|(key, v)| {
            let number = v.as_f64().or_else(|| match v {
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            });
            match number {
                Some(n) => Some((key.clone(), n)),
                None => {
                    warn!(property = %key, "non-numeric speaker property skipped");
                    None
                }
            }
        })
        .collect()
}

fn metadata_field(value: &Value, field: &str) -> u64 {
    value[field]
        .as_u64()
        .or_else(|| value["metadata"][field].as_u64())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_case(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_flat_and_legacy_code_shapes_count_identically() {
        let dir = tempfile::tempdir().unwrap();
        write_case(
            dir.path(),
            "flat.json",
            r#"{"case_id": "flat", "codes": ["trust", "trust", "risk"]}"#,
        );
        write_case(
            dir.path(),
            "legacy.json",
            r#"{"case_id": "legacy", "codes": [{"code_id": "trust"}, {"code_id": "trust"}, {"code_id": "risk"}]}"#,
        );
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].codes, cases[1].codes);
    }

    #[test]
    fn test_sorted_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "b.json", r#"{"case_id": "second"}"#);
        write_case(dir.path(), "a.json", r#"{"case_id": "first"}"#);
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert_eq!(cases[0].case_id, "first");
        assert_eq!(cases[1].case_id, "second");
    }

    #[test]
    fn test_missing_id_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "interview_07.json", r#"{"codes": ["trust"]}"#);
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert_eq!(cases[0].case_id, "interview_07");
        assert_eq!(audit.events_of_type(event::WARNING).count(), 1);
    }

    #[test]
    fn test_custom_case_id_field() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "x.json", r#"{"interview_id": "i-42"}"#);
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "interview_id", &mut audit).unwrap();
        assert_eq!(cases[0].case_id, "i-42");
    }

    #[test]
    fn test_metadata_top_level_and_nested() {
        let dir = tempfile::tempdir().unwrap();
        write_case(
            dir.path(),
            "top.json",
            r#"{"case_id": "top", "word_count": 4000, "speaker_count": 2}"#,
        );
        write_case(
            dir.path(),
            "nested.json",
            r#"{"case_id": "nested", "metadata": {"word_count": 3000, "quote_count": 12}}"#,
        );
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        let nested = cases.iter().find(|c| c.case_id == "nested").unwrap();
        let top = cases.iter().find(|c| c.case_id == "top").unwrap();
        assert_eq!(top.metadata.word_count, 4000);
        assert_eq!(top.metadata.speaker_count, 2);
        assert_eq!(nested.metadata.word_count, 3000);
        assert_eq!(nested.metadata.quote_count, 12);
    }

    #[test]
    fn test_extraction_payload_nesting() {
        let dir = tempfile::tempdir().unwrap();
        write_case(
            dir.path(),
            "n.json",
            r#"{"case_id": "n", "extraction": {"codes": ["trust"], "speaker_properties": {"seniority": 4}}}"#,
        );
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert_eq!(cases[0].codes, vec!["trust".to_string()]);
        assert_eq!(cases[0].speaker_properties["seniority"], 4.0);
    }

    #[test]
    fn test_unparseable_record_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "bad.json", "{not json");
        write_case(dir.path(), "good.json", r#"{"case_id": "good"}"#);
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].case_id, "good");
    }

    #[test]
    fn test_non_json_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "notes.txt", "irrelevant");
        write_case(dir.path(), "a.json", r#"{"case_id": "a"}"#);
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn test_empty_dir_yields_no_cases() {
        let dir = tempfile::tempdir().unwrap();
        let mut audit = AuditTrail::new();
        let cases = load_cases(dir.path(), "case_id", &mut audit).unwrap();
        assert!(cases.is_empty());
    }
}
