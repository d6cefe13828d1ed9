//! Domain types shared across modules.
//!
//! These are used by the plan store, the summary synthesizer, the
//! dashboard gateway and the orchestrator alike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// tldr used when there is neither a generated summary nor a driver note.
pub const GENERIC_TLDR: &str = "Rotation completed";

/// Longest tldr derived from a driver note, ellipsis included.
pub const MAX_NOTE_TLDR_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// The summarized content of one rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryContent {
    pub tldr: String,
    pub changes: Vec<String>,
    pub next_steps: Vec<String>,
}

impl SummaryContent {
    /// Content derived from the driver note alone, with no change lists.
    pub fn note_only(driver_note: &str) -> Self {
        Self {
            tldr: note_tldr(driver_note),
            changes: Vec::new(),
            next_steps: Vec::new(),
        }
    }
}

/// One driver's recorded contribution. Written once, never modified.
///
/// Stored as .claude/mob/summaries/<timestamp>.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSummary {
    pub timestamp: DateTime<Utc>,
    pub driver_name: String,
    pub driver_note: String,
    pub tldr: String,
    pub changes: Vec<String>,
    pub next_steps: Vec<String>,
    pub branch: String,
}

impl RotationSummary {
    pub fn new(
        content: SummaryContent,
        driver_name: &str,
        driver_note: &str,
        branch: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            driver_name: driver_name.to_string(),
            driver_note: driver_note.to_string(),
            tldr: content.tldr,
            changes: content.changes,
            next_steps: content.next_steps,
            branch: branch.to_string(),
        }
    }
}

/// Derive a tldr from a driver note.
///
/// Notes up to 100 characters are kept verbatim; longer ones are cut to
/// exactly 100 characters including a trailing "...".
pub fn note_tldr(driver_note: &str) -> String {
    if driver_note.is_empty() {
        return GENERIC_TLDR.to_string();
    }
    if driver_note.chars().count() <= MAX_NOTE_TLDR_CHARS {
        return driver_note.to_string();
    }
    let keep = MAX_NOTE_TLDR_CHARS - ELLIPSIS.len();
    let mut tldr: String = driver_note.chars().take(keep).collect();
    tldr.push_str(ELLIPSIS);
    tldr
}
