//! Shared types for the rating pipeline.

use serde::{Deserialize, Serialize};

/// A product-review comment to be rated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub title: String,
    pub body: String,
}

/// Classification of an attribute. Affects only prompt wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    Attribute,
    BrandPersonality,
}

impl AttributeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::BrandPersonality => "brand personality",
        }
    }
}

/// A named product characteristic that comments are rated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub category: AttributeCategory,
}

/// Rating scale used by the prompt instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// 1 = Strongly Disagree … 5 = Strongly Agree.
    OneToFive,
    /// 0 = Strongly Disagree … 10 = Strongly Agree.
    ZeroToTen,
}

/// One rating request for a (comment, attribute) pair.
///
/// Built per pair, consumed by one remote call, then discarded.
#[derive(Debug, Clone)]
pub struct RatingRequest {
    pub title: String,
    pub body: String,
    pub product_line: String,
    pub attribute_name: String,
    pub attribute_category: AttributeCategory,
    pub scale: Scale,
}

impl RatingRequest {
    pub fn new(comment: &Comment, product_line: &str, attribute: &Attribute, scale: Scale) -> Self {
        Self {
            title: comment.title.clone(),
            body: comment.body.clone(),
            product_line: product_line.to_string(),
            attribute_name: attribute.name.clone(),
            attribute_category: attribute.category,
            scale,
        }
    }
}

/// Outcome of one rating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Scored {
        score: u8,
        reason: String,
    },
    /// The comment does not address the attribute at all. Distinct from a
    /// low numeric score.
    NotApplicable,
    /// Remote-call or reply-format failure, with a human-readable detail.
    Errored {
        detail: String,
    },
}

/// A parsed rating together with the raw reply it came from.
///
/// `raw` always carries the full model reply; for faults that happened
/// before any reply existed it carries `Error: <detail>` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingResult {
    pub verdict: Verdict,
    pub raw: String,
}

impl RatingResult {
    /// Numeric score, if the reply was scored.
    pub fn score(&self) -> Option<i32> {
        match &self.verdict {
            Verdict::Scored { score, .. } => Some(i32::from(*score)),
            _ => None,
        }
    }

    /// Free-text justification; empty for not-applicable and errored results.
    pub fn reason(&self) -> &str {
        match &self.verdict {
            Verdict::Scored { reason, .. } => reason,
            _ => "",
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self.verdict, Verdict::Errored { .. })
    }
}

/// One persisted row: a (comment, attribute) pair flattened for storage.
///
/// `id` and `scored_at` are assigned by the relational store. There is no
/// uniqueness constraint beyond the natural (comment, property) key, so
/// re-running without deduplication appends duplicate rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRow {
    pub title: String,
    pub body: String,
    pub property: String,
    pub score: Option<i32>,
    pub reason: String,
    pub raw_resp: String,
}

impl RatingRow {
    pub fn from_result(comment: &Comment, property: &str, result: &RatingResult) -> Self {
        Self {
            title: comment.title.clone(),
            body: comment.body.clone(),
            property: property.to_string(),
            score: result.score(),
            reason: result.reason().to_string(),
            raw_resp: result.raw.clone(),
        }
    }
}
