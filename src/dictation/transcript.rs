//! Recognition result types shared between speech engines and the composer.
//!
//! A result event carries the full ordered list of everything recognized so
//! far in the session. Consumers rebuild the transcript from scratch on every
//! event rather than appending.

/// One candidate transcript for a recognized segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    /// The recognized text.
    pub transcript: String,
    /// Engine confidence in the range 0.0..=1.0.
    pub confidence: f32,
}

impl RecognitionAlternative {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

/// One recognized segment, with its candidate transcripts ordered best-first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Candidate transcripts, primary first.
    pub alternatives: Vec<RecognitionAlternative>,
    /// Whether the engine considers this segment settled.
    pub is_final: bool,
}

/// Events delivered by a live dictation session.
#[derive(Debug, Clone, PartialEq)]
pub enum DictationEvent {
    /// New recognition snapshot; `results` is the full ordered list so far.
    Result { results: Vec<RecognitionResult> },
    /// Engine-reported recognition error; diagnostic only.
    Error { message: String },
}

/// Flatten a result list into transcript text: the primary alternative of
/// each result, concatenated in result order.
pub fn assemble_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter_map(|result| result.alternatives.first())
        .map(|alternative| alternative.transcript.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(alternatives: &[&str]) -> RecognitionResult {
        RecognitionResult {
            alternatives: alternatives
                .iter()
                .map(|text| RecognitionAlternative::new(*text, 0.9))
                .collect(),
            is_final: false,
        }
    }

    #[test]
    fn assembles_primary_alternatives_in_order() {
        let results = vec![result(&["Hello "]), result(&["world"])];
        assert_eq!(assemble_transcript(&results), "Hello world");
    }

    #[test]
    fn ignores_non_primary_alternatives() {
        let results = vec![result(&["Hello", "Yellow"]), result(&[" there", " hair"])];
        assert_eq!(assemble_transcript(&results), "Hello there");
    }

    #[test]
    fn skips_results_with_no_alternatives() {
        let results = vec![result(&["Hi"]), result(&[]), result(&[" again"])];
        assert_eq!(assemble_transcript(&results), "Hi again");
    }

    #[test]
    fn empty_result_list_yields_empty_transcript() {
        assert_eq!(assemble_transcript(&[]), "");
    }
}
