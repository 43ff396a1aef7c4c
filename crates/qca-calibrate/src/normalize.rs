//! Raw-count normalization against case metadata

use qca_domain::{CaseMetadata, NormalizationMethod};

/// Rescale a raw count using case metadata
///
/// Zero denominators are treated as 1, so a record with missing metadata
/// degrades to the raw count instead of dividing by zero.
pub fn normalize(raw: f64, method: NormalizationMethod, metadata: &CaseMetadata) -> f64 {
    match method {
        NormalizationMethod::None => raw,
        NormalizationMethod::PerThousandWords => raw * 1000.0 / metadata.word_count.max(1) as f64,
        NormalizationMethod::PerSpeaker => raw / metadata.speaker_count.max(1) as f64,
        NormalizationMethod::PerQuote => raw / metadata.quote_count.max(1) as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(word_count: u64, speaker_count: u64, quote_count: u64) -> CaseMetadata {
        CaseMetadata {
            word_count,
            speaker_count,
            quote_count,
        }
    }

    #[test]
    fn test_none_is_identity() {
        let m = metadata(5000, 3, 20);
        assert_eq!(normalize(7.0, NormalizationMethod::None, &m), 7.0);
    }

    #[test]
    fn test_per_thousand_words() {
        let m = metadata(5000, 3, 20);
        assert_eq!(normalize(10.0, NormalizationMethod::PerThousandWords, &m), 2.0);
    }

    #[test]
    fn test_per_speaker() {
        let m = metadata(5000, 5, 20);
        assert_eq!(normalize(10.0, NormalizationMethod::PerSpeaker, &m), 2.0);
    }

    #[test]
    fn test_per_quote() {
        let m = metadata(5000, 3, 4);
        assert_eq!(normalize(10.0, NormalizationMethod::PerQuote, &m), 2.5);
    }

    #[test]
    fn test_zero_denominators_treated_as_one() {
        let m = metadata(0, 0, 0);
        assert_eq!(normalize(10.0, NormalizationMethod::PerSpeaker, &m), 10.0);
        assert_eq!(normalize(10.0, NormalizationMethod::PerQuote, &m), 10.0);
        assert_eq!(
            normalize(10.0, NormalizationMethod::PerThousandWords, &m),
            10000.0
        );
    }
}
