//! Condition and outcome definitions with their calibration rules

use serde::{Deserialize, Serialize};

/// Where a condition's raw value comes from in a case record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Occurrence count of a qualitative code
    Code,
    /// A numeric speaker property (e.g. years of experience)
    SpeakerProperty,
    /// Occurrence count of a named entity
    Entity,
    /// Occurrence count of a relationship type
    Relationship,
    /// Anything the loader could not classify; extraction yields 0.0 with a warning
    #[serde(other)]
    Unknown,
}

impl SourceType {
    /// Stable lowercase name used in artifacts and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Code => "code",
            SourceType::SpeakerProperty => "speaker_property",
            SourceType::Entity => "entity",
            SourceType::Relationship => "relationship",
            SourceType::Unknown => "unknown",
        }
    }
}

/// Calibration function family applied to a condition's raw values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMethod {
    /// Step function at a threshold
    Binary,
    /// Banded scores from two breakpoints
    Frequency,
    /// User expression over `count`, clamped to [0,1]
    Fuzzy,
    /// Banded scores from percentiles of the observed distribution
    Percentile,
    /// Exact anchors for raw 0 / 1 / >1
    Direct,
    /// Piecewise-linear interpolation between three anchors
    AnchorPoints,
    /// Placeholder for researcher-validated calibration; falls back to percentile
    Interactive,
}

impl CalibrationMethod {
    /// Stable lowercase name used in artifacts and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationMethod::Binary => "binary",
            CalibrationMethod::Frequency => "frequency",
            CalibrationMethod::Fuzzy => "fuzzy",
            CalibrationMethod::Percentile => "percentile",
            CalibrationMethod::Direct => "direct",
            CalibrationMethod::AnchorPoints => "anchor_points",
            CalibrationMethod::Interactive => "interactive",
        }
    }
}

/// Rescaling applied to raw counts before calibration
///
/// Normalization always runs before calibration; percentile and frequency
/// breakpoints are computed over normalized values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    /// No rescaling (identity cast to float)
    #[default]
    None,
    /// `raw * 1000 / word_count`
    PerThousandWords,
    /// `raw / max(speaker_count, 1)`
    PerSpeaker,
    /// `raw / max(quote_count, 1)`
    PerQuote,
}

impl NormalizationMethod {
    /// Stable lowercase name used in artifacts and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationMethod::None => "none",
            NormalizationMethod::PerThousandWords => "per_thousand_words",
            NormalizationMethod::PerSpeaker => "per_speaker",
            NormalizationMethod::PerQuote => "per_quote",
        }
    }
}

/// Score bands for the frequency method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyScores {
    /// Score below the first breakpoint
    pub rare: f64,
    /// Score between the breakpoints
    pub moderate: f64,
    /// Score at or above the second breakpoint
    pub frequent: f64,
}

impl Default for FrequencyScores {
    fn default() -> Self {
        Self {
            rare: 0.2,
            moderate: 0.5,
            frequent: 0.8,
        }
    }
}

/// Percentile pair for the percentile method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBands {
    /// Lower percentile (0-100)
    pub lower: f64,
    /// Upper percentile (0-100)
    pub upper: f64,
}

impl Default for PercentileBands {
    fn default() -> Self {
        Self {
            lower: 33.0,
            upper: 67.0,
        }
    }
}

/// Membership anchors for the direct method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectAnchors {
    /// Membership for raw == 0
    pub non_membership: f64,
    /// Membership for raw == 1
    pub crossover: f64,
    /// Membership for raw > 1
    pub full_membership: f64,
}

impl Default for DirectAnchors {
    fn default() -> Self {
        Self {
            non_membership: 0.0,
            crossover: 0.5,
            full_membership: 1.0,
        }
    }
}

/// Raw-value anchors for the anchor_points method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSet {
    /// Raw value at or below which membership is 0.0
    pub non_member: f64,
    /// Raw value mapping to membership 0.5
    pub crossover: f64,
    /// Raw value at or above which membership is 1.0
    pub full_member: f64,
}

impl Default for AnchorSet {
    fn default() -> Self {
        Self {
            non_member: 0.0,
            crossover: 3.0,
            full_member: 6.0,
        }
    }
}

/// How raw values become membership scores for one condition or outcome
///
/// Method-specific parameters are optional; absent parameters take the
/// defaults documented on their types. `theoretical_justification` is a
/// methodology requirement: configuration load fails when it is blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationRule {
    /// Which calibration family to apply
    pub method: CalibrationMethod,
    /// Binary threshold (default 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Frequency breakpoints; only the first two are used (default [1, 3, 5])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Vec<f64>>,
    /// Frequency score bands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<FrequencyScores>,
    /// Fuzzy expression over the variable `count`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Percentile bands (default 33/67)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<PercentileBands>,
    /// Direct membership anchors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<DirectAnchors>,
    /// Anchor-point raw values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<AnchorSet>,
    /// Rescaling applied before calibration
    #[serde(default)]
    pub normalization: NormalizationMethod,
    /// Why this rule is methodologically sound; must be non-empty
    pub theoretical_justification: String,
}

impl CalibrationRule {
    /// Build a rule for a method with defaults and the given justification
    pub fn new(method: CalibrationMethod, justification: impl Into<String>) -> Self {
        Self {
            method,
            threshold: None,
            breakpoints: None,
            scores: None,
            function: None,
            percentiles: None,
            direct: None,
            anchors: None,
            normalization: NormalizationMethod::None,
            theoretical_justification: justification.into(),
        }
    }

    /// True when a non-blank justification is present
    pub fn justification_provided(&self) -> bool {
        !self.theoretical_justification.trim().is_empty()
    }

    /// Structural problems with this rule, empty when the rule is sound
    pub fn issues(&self, context: &str) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.justification_provided() {
            issues.push(format!(
                "{context}: theoretical_justification is required and must be non-empty"
            ));
        }
        if let Some(bps) = &self.breakpoints {
            if bps.len() < 2 {
                issues.push(format!("{context}: breakpoints need at least two values"));
            } else if bps.windows(2).any(|w| w[0] >= w[1]) {
                issues.push(format!("{context}: breakpoints must be strictly ascending"));
            }
        }
        if self.method == CalibrationMethod::Fuzzy
            && self.function.as_deref().map_or(true, |f| f.trim().is_empty())
        {
            issues.push(format!("{context}: fuzzy calibration requires a function"));
        }
        if let Some(p) = &self.percentiles {
            if !(0.0..=100.0).contains(&p.lower)
                || !(0.0..=100.0).contains(&p.upper)
                || p.lower >= p.upper
            {
                issues.push(format!(
                    "{context}: percentiles must satisfy 0 <= lower < upper <= 100"
                ));
            }
        }
        issues
    }
}

/// A researcher-defined factor measured per case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Stable identifier, unique within a configuration
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Where the raw value comes from
    pub source_type: SourceType,
    /// Which code/entity/relationship/property to count
    pub source_id: String,
    /// How raw values become membership scores
    pub calibration: CalibrationRule,
}

impl ConditionDefinition {
    /// Structural problems with this definition, empty when sound
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.id.trim().is_empty() {
            issues.push("condition has an empty id".to_string());
        }
        if self.source_id.trim().is_empty() {
            issues.push(format!("condition '{}': source_id is required", self.id));
        }
        issues.extend(self.calibration.issues(&format!("condition '{}'", self.id)));
        issues
    }
}

/// An outcome derived from one or more source conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeDefinition {
    /// Stable identifier, unique within a configuration
    pub outcome_id: String,
    /// Condition ids whose membership scores feed the combination
    pub source_conditions: Vec<String>,
    /// "any" (max), "all" (min), or an expression over the source ids
    pub combination_rule: String,
    /// Re-calibration applied to the raw combination (fuzzy = keep raw)
    pub calibration: CalibrationRule,
}

impl OutcomeDefinition {
    /// Structural problems with this definition, empty when sound
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.outcome_id.trim().is_empty() {
            issues.push("outcome has an empty outcome_id".to_string());
        }
        if self.source_conditions.is_empty() {
            issues.push(format!(
                "outcome '{}': source_conditions must not be empty",
                self.outcome_id
            ));
        }
        issues.extend(
            self.calibration
                .issues(&format!("outcome '{}'", self.outcome_id)),
        );
        issues
    }
}
