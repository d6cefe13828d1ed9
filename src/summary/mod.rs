//! Rotation summary synthesis.
//!
//! One backend call per rotation, no retry. Whatever happens, the caller
//! gets well-formed content back: backend and parse failures are turned
//! into a deterministic fallback built from the driver note.

mod backend;
mod parse;

#[cfg(test)]
pub use backend::BackendError;
pub use backend::{ClaudeCli, ContentGenerator, GenerationRequest};

use parse::parse_response;

use tracing::{info, warn};

use crate::domain::{note_tldr, SummaryContent};

/// Diff prefix length sent to the backend.
pub const MAX_DIFF_CHARS: usize = 10_000;

const TRUNCATION_MARKER: &str = "\n... (truncated)";

const FALLBACK_CHANGE: &str = "Changes made during rotation";
const FALLBACK_NEXT_STEP: &str = "Continue from where the previous driver left off";

/// Everything known about the rotation being summarized.
#[derive(Debug, Clone, Default)]
pub struct SummaryInput<'a> {
    pub diff: &'a str,
    pub driver_note: &'a str,
    pub branch: &'a str,
    /// Recent one-line commit log, if it could be read.
    pub recent_commits: Option<&'a str>,
}

/// Synthesized content plus why the fallback was used, if it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub content: SummaryContent,
    pub degraded: Option<String>,
}

/// Cut `diff` to [`MAX_DIFF_CHARS`] characters, marking the cut.
pub fn truncate_diff(diff: &str) -> String {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((cut, _)) => format!("{}{}", &diff[..cut], TRUNCATION_MARKER),
        None => diff.to_string(),
    }
}

/// The summary used whenever generation does not produce one.
pub fn fallback_summary(driver_note: &str) -> SummaryContent {
    SummaryContent {
        tldr: note_tldr(driver_note),
        changes: vec![FALLBACK_CHANGE.to_string()],
        next_steps: vec![FALLBACK_NEXT_STEP.to_string()],
    }
}

pub struct SummarySynthesizer {
    backend: Box<dyn ContentGenerator>,
    model: String,
    max_turns: u32,
}

impl SummarySynthesizer {
    pub fn new(backend: Box<dyn ContentGenerator>, model: &str, max_turns: u32) -> Self {
        Self {
            backend,
            model: model.to_string(),
            max_turns,
        }
    }

    fn build_prompt(&self, input: &SummaryInput<'_>) -> String {
        let note = if input.driver_note.trim().is_empty() {
            "(none)"
        } else {
            input.driver_note
        };
        let commits = match input.recent_commits.map(str::trim) {
            Some(log) if !log.is_empty() => format!("\nRecent commits:\n{}\n", log),
            _ => String::new(),
        };

        format!(
            r#"Analyze this git diff from a mob programming rotation on branch "{branch}" and create a brief summary.

Driver's note: {note}
{commits}
Git diff:
{diff}

Return a JSON object with exactly these fields:
- tldr: One sentence summary of what was accomplished (max 100 chars)
- changes: Array of 2-4 specific changes made
- nextSteps: Array of 1-3 suggested next steps for the next driver

Respond ONLY with the JSON object, no explanation."#,
            branch = input.branch,
            note = note,
            commits = commits,
            diff = truncate_diff(input.diff),
        )
    }

    /// Summarize a rotation. Never fails.
    pub async fn synthesize(&self, input: &SummaryInput<'_>) -> Synthesis {
        let request = GenerationRequest {
            prompt: self.build_prompt(input),
            model: self.model.clone(),
            max_turns: self.max_turns,
        };

        let degraded = match self.backend.generate(&request).await {
            Ok(raw) => match parse_response(&raw) {
                Ok(content) => {
                    info!("Summary: {}", content.tldr);
                    return Synthesis {
                        content,
                        degraded: None,
                    };
                }
                Err(e) => format!("could not parse generated summary: {}", e),
            },
            Err(e) => format!("summary generation failed: {}", e),
        };

        warn!("{}; using fallback summary", degraded);
        Synthesis {
            content: fallback_summary(input.driver_note),
            degraded: Some(degraded),
        }
    }
}
