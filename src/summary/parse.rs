//! Strict parsing of generated summaries.
//!
//! The backend must answer with exactly one JSON object, optionally
//! wrapped in one code fence. Anything else is rejected so the caller can
//! fall back, rather than guessing where the object starts and ends.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::SummaryContent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("response is empty")]
    Empty,

    #[error("unterminated code fence")]
    UnterminatedFence,

    #[error("response is not a single JSON summary object: {0}")]
    InvalidJson(String),

    #[error("field {0} is empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GeneratedSummary {
    tldr: String,
    changes: Vec<String>,
    next_steps: Vec<String>,
}

/// Remove one surrounding ``` or ```json fence.
fn unwrap_fence(text: &str) -> Result<&str, ParseError> {
    let Some(rest) = text.strip_prefix("```") else {
        return Ok(text);
    };
    // Drop the info string ("json", "JSON", or nothing) up to the newline.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return Err(ParseError::UnterminatedFence),
    };
    let body = body.trim_end();
    body.strip_suffix("```")
        .map(str::trim)
        .ok_or(ParseError::UnterminatedFence)
}

fn non_empty_list(items: Vec<String>, field: &'static str) -> Result<Vec<String>, ParseError> {
    let items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
    if items.is_empty() || items.iter().any(String::is_empty) {
        return Err(ParseError::EmptyField(field));
    }
    Ok(items)
}

/// Parse a backend response into summary content.
pub fn parse_response(response: &str) -> Result<SummaryContent, ParseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let body = unwrap_fence(trimmed)?;
    let generated: GeneratedSummary =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let tldr = generated.tldr.trim().to_string();
    if tldr.is_empty() {
        return Err(ParseError::EmptyField("tldr"));
    }

    Ok(SummaryContent {
        tldr,
        changes: non_empty_list(generated.changes, "changes")?,
        next_steps: non_empty_list(generated.next_steps, "nextSteps")?,
    })
}
