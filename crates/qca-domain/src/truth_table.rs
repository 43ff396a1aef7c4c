//! Truth tables: cases grouped into condition configurations

use serde::{Deserialize, Serialize};

/// Whether condition values are discretized or preserved for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    /// Values discretized to 0/1 at the membership threshold
    Crisp,
    /// Exact values preserved (rounded to 3 decimals for grouping only)
    Fuzzy,
}

impl TableMode {
    /// Stable lowercase name used in artifact file names
    pub fn as_str(&self) -> &'static str {
        match self {
            TableMode::Crisp => "crisp",
            TableMode::Fuzzy => "fuzzy",
        }
    }

    /// Parse a mode name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "crisp" => Some(TableMode::Crisp),
            "fuzzy" => Some(TableMode::Fuzzy),
            _ => None,
        }
    }
}

/// One condition's value inside a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionValue {
    /// The condition
    pub condition_id: String,
    /// Discretized (crisp) or rounded (fuzzy) membership value
    pub value: f64,
}

/// One configuration and the cases that share it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTableRow {
    /// Condition values in the table's fixed condition order
    pub configuration: Vec<ConditionValue>,
    /// Mean outcome of the member cases
    pub outcome: f64,
    /// Cases sharing this configuration, in input order
    pub case_ids: Vec<String>,
    /// 1 − min(1, mean absolute deviation of member outcomes)
    pub consistency: f64,
    /// Share of total positive outcome explained by this row
    pub coverage: f64,
}

impl TruthTableRow {
    /// Value for one condition id within this row's configuration
    pub fn condition_value(&self, condition_id: &str) -> Option<f64> {
        self.configuration
            .iter()
            .find(|cv| cv.condition_id == condition_id)
            .map(|cv| cv.value)
    }
}

/// A complete truth table for one outcome in one mode
///
/// Immutable once built; `conditions` fixes the configuration-key ordering
/// for the table's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTable {
    /// Condition ids in the order configuration keys use
    pub conditions: Vec<String>,
    /// The outcome this table summarizes
    pub outcome_id: String,
    /// Crisp or fuzzy
    pub mode: TableMode,
    /// Observed configurations
    pub rows: Vec<TruthTableRow>,
    /// Cases that went into the table
    pub total_cases: usize,
    /// Number of distinct observed configurations
    pub configurations_found: usize,
    /// Theoretically possible but unobserved configurations
    ///
    /// Crisp: `2^|conditions| − configurations_found` (saturating).
    /// Fuzzy: 0 by convention; the fuzzy configuration space is not
    /// enumerable the same way.
    pub logical_remainders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(TableMode::parse("crisp"), Some(TableMode::Crisp));
        assert_eq!(TableMode::parse("FUZZY"), Some(TableMode::Fuzzy));
        assert_eq!(TableMode::parse("dual"), None);
    }

    #[test]
    fn test_row_condition_lookup() {
        let row = TruthTableRow {
            configuration: vec![
                ConditionValue {
                    condition_id: "a".to_string(),
                    value: 1.0,
                },
                ConditionValue {
                    condition_id: "b".to_string(),
                    value: 0.0,
                },
            ],
            outcome: 1.0,
            case_ids: vec!["case_01".to_string()],
            consistency: 1.0,
            coverage: 0.5,
        };
        assert_eq!(row.condition_value("b"), Some(0.0));
        assert_eq!(row.condition_value("c"), None);
    }

    #[test]
    fn test_table_serde_round_trip() {
        let table = TruthTable {
            conditions: vec!["a".to_string(), "b".to_string()],
            outcome_id: "adoption".to_string(),
            mode: TableMode::Fuzzy,
            rows: vec![],
            total_cases: 0,
            configurations_found: 0,
            logical_remainders: 0,
        };
        let json = serde_json::to_string(&table).unwrap();
        let parsed: TruthTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
