//! Raw case records as produced by the extraction pipeline

use crate::condition::SourceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interview-level metadata used by normalization
///
/// Each field defaults to 0 when absent from the source record; normalization
/// treats 0 as 1 to avoid division by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaseMetadata {
    /// Total words in the transcript
    #[serde(default)]
    pub word_count: u64,
    /// Distinct speakers in the interview
    #[serde(default)]
    pub speaker_count: u64,
    /// Quotes extracted from the transcript
    #[serde(default)]
    pub quote_count: u64,
}

/// One unit of analysis with its raw counts
///
/// The loader flattens both supported code shapes (a flat id list and the
/// legacy list of `{code_id}` objects) into `codes` before a `Case` exists,
/// so counting here is shape-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    /// Stable case identifier
    pub case_id: String,
    /// Code occurrences, one entry per occurrence
    #[serde(default)]
    pub codes: Vec<String>,
    /// Entity occurrences, one entry per occurrence
    #[serde(default)]
    pub entities: Vec<String>,
    /// Relationship occurrences, one entry per occurrence
    #[serde(default)]
    pub relationships: Vec<String>,
    /// Numeric speaker properties keyed by property name
    #[serde(default)]
    pub speaker_properties: BTreeMap<String, f64>,
    /// Interview-level metadata for normalization
    #[serde(default)]
    pub metadata: CaseMetadata,
    /// File the record was loaded from
    #[serde(default)]
    pub source_file: String,
}

impl Case {
    /// Raw value for one (source_type, source_id) pair
    ///
    /// Counts occurrences for codes/entities/relationships; reads the value
    /// directly for speaker properties. Anything unmatched is 0.0, including
    /// the `Unknown` source type (the caller logs that case).
    pub fn raw_value(&self, source_type: SourceType, source_id: &str) -> f64 {
        match source_type {
            SourceType::Code => count_matches(&self.codes, source_id),
            SourceType::Entity => count_matches(&self.entities, source_id),
            SourceType::Relationship => count_matches(&self.relationships, source_id),
            SourceType::SpeakerProperty => {
                self.speaker_properties.get(source_id).copied().unwrap_or(0.0)
            }
            SourceType::Unknown => 0.0,
        }
    }

    /// Total number of code occurrences (provenance)
    pub fn total_codes(&self) -> u64 {
        self.codes.len() as u64
    }
}

fn count_matches(items: &[String], id: &str) -> f64 {
    items.iter().filter(|item| item.as_str() == id).count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> Case {
        Case {
            case_id: "case_01".to_string(),
            codes: vec![
                "trust".to_string(),
                "trust".to_string(),
                "risk".to_string(),
            ],
            entities: vec!["vendor_a".to_string()],
            relationships: vec!["depends_on".to_string(), "depends_on".to_string()],
            speaker_properties: BTreeMap::from([("seniority".to_string(), 7.0)]),
            metadata: CaseMetadata {
                word_count: 4000,
                speaker_count: 2,
                quote_count: 25,
            },
            source_file: "case_01.json".to_string(),
        }
    }

    #[test]
    fn test_code_counting() {
        let case = sample_case();
        assert_eq!(case.raw_value(SourceType::Code, "trust"), 2.0);
        assert_eq!(case.raw_value(SourceType::Code, "risk"), 1.0);
        assert_eq!(case.raw_value(SourceType::Code, "absent"), 0.0);
    }

    #[test]
    fn test_entity_and_relationship_counting() {
        let case = sample_case();
        assert_eq!(case.raw_value(SourceType::Entity, "vendor_a"), 1.0);
        assert_eq!(case.raw_value(SourceType::Relationship, "depends_on"), 2.0);
    }

    #[test]
    fn test_speaker_property_lookup() {
        let case = sample_case();
        assert_eq!(case.raw_value(SourceType::SpeakerProperty, "seniority"), 7.0);
        assert_eq!(case.raw_value(SourceType::SpeakerProperty, "missing"), 0.0);
    }

    #[test]
    fn test_unknown_source_type_is_zero() {
        let case = sample_case();
        assert_eq!(case.raw_value(SourceType::Unknown, "anything"), 0.0);
    }

    #[test]
    fn test_metadata_defaults() {
        let case: Case = serde_json::from_str(r#"{"case_id": "x"}"#).unwrap();
        assert_eq!(case.metadata.word_count, 0);
        assert_eq!(case.metadata.speaker_count, 0);
        assert_eq!(case.metadata.quote_count, 0);
        assert!(case.codes.is_empty());
    }
}
