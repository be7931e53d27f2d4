pub mod parse;
pub mod prompt;
pub mod rating;
pub mod schema;

pub use parse::{NOT_APPLICABLE, extract_score, parse_reply};
pub use prompt::{SYSTEM_RESET, build_prompt};
pub use rating::{
    Attribute, AttributeCategory, Comment, RatingRequest, RatingResult, RatingRow, Scale, Verdict,
};
pub use schema::SchemaError;
