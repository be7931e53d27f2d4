//! Reply parsing: the `[NaN,NaN]` sentinel, the bracketed score shape, and
//! the loose score extraction used by the score-only export.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::rating::{RatingResult, Verdict};

/// Reply sentinel meaning "the comment does not address the attribute".
pub const NOT_APPLICABLE: &str = "[NaN,NaN]";

static REPLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*(\d)\s*,\s*(.+?)\s*\]$").expect("valid reply regex"));

static SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(10|[0-9])\b").expect("valid score regex"));

/// Parse a raw model reply into a rating result.
///
/// The trimmed reply must be either exactly [`NOT_APPLICABLE`] or of the
/// shape `[<digit>,<reason>]`. Anything else is a format violation and
/// becomes [`Verdict::Errored`]; the row is still persisted with a null
/// score so the raw reply stays available for re-processing. The raw reply
/// is preserved verbatim in every case.
pub fn parse_reply(raw: &str) -> RatingResult {
    let trimmed = raw.trim();
    if trimmed == NOT_APPLICABLE {
        return RatingResult {
            verdict: Verdict::NotApplicable,
            raw: raw.to_string(),
        };
    }
    if let Some(caps) = REPLY_RE.captures(trimmed) {
        let score = caps[1].parse::<u8>().unwrap_or(0);
        let reason = caps[2].to_string();
        return RatingResult {
            verdict: Verdict::Scored { score, reason },
            raw: raw.to_string(),
        };
    }
    debug!(reply = %trimmed, "reply matched neither expected shape");
    RatingResult {
        verdict: Verdict::Errored {
            detail: format!("unexpected reply format: {trimmed}"),
        },
        raw: raw.to_string(),
    }
}

/// Extract a numeric score from a raw wide-table cell.
///
/// A cell containing `nan` in any case is unscored. Otherwise the leading
/// comma-separated element is searched for the first standalone 0–10
/// number. Both ASCII and fullwidth commas split.
pub fn extract_score(cell: &str) -> Option<i64> {
    if cell.to_lowercase().contains("nan") {
        return None;
    }
    let head = cell.split([',', '，']).next().unwrap_or("");
    SCORE_RE
        .find(head)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}
