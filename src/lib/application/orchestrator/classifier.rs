use crate::domain::Verdict;

pub const SUCCESS_NOTE: &str = "\n\n✅ Task completed successfully.";
pub const ERROR_NOTE: &str = "\n\n⚠️ Task completed with errors.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    /// Transcript with the verdict note appended.
    pub annotated: String,
}

/// Keyword heuristic: any case-insensitive `"error"` in the transcript,
/// including inside other words, marks the run as completed with errors.
pub fn classify(transcript: &str) -> Classification {
    let (verdict, note) = if transcript.to_lowercase().contains("error") {
        (Verdict::CompletedWithErrors, ERROR_NOTE)
    } else {
        (Verdict::Success, SUCCESS_NOTE)
    };
    Classification {
        verdict,
        annotated: format!("{transcript}{note}"),
    }
}
