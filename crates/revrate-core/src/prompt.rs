//! Prompt construction for rating requests.
//!
//! The prompt mandates exactly two reply shapes: the `[NaN,NaN]` sentinel
//! when the comment does not demonstrate the attribute at all, or
//! `[<score>,<reason>]` otherwise. The scale block is the only part that
//! differs between the 1–5 and 0–10 variants.

use crate::rating::{RatingRequest, Scale};

/// System message sent before every user prompt to reset prior context.
pub const SYSTEM_RESET: &str = "Forget any previous information.";

const SCALE_ONE_TO_FIVE: &str = "\
2. Otherwise, rate your agreement with the statement on a scale from 1 to 5:
- '5' for Strongly Agree
- '4' for Agree
- '3' for Neither Agree nor Disagree
- '2' for Disagree
- '1' for Strongly Disagree";

const SCALE_ZERO_TO_TEN: &str = "\
2. Otherwise, rate your agreement with the statement on a scale from 0 to 10, \
where '0' means Strongly Disagree and '10' means Strongly Agree.";

/// Build the evaluation prompt for one (comment, attribute) pair.
///
/// Pure function of the request; no I/O.
pub fn build_prompt(req: &RatingRequest) -> String {
    let scale_block = match req.scale {
        Scale::OneToFive => SCALE_ONE_TO_FIVE,
        Scale::ZeroToTen => SCALE_ZERO_TO_TEN,
    };
    format!(
        "The following is a comment on a {product} product:\n\
         Title: {title}\n\
         Body: {body}\n\
         Evaluate the comment regarding the product's '{attribute}', which is categorized as a {category} feature.\n\
         Use the following rules to respond:\n\
         1. If the comment does not demonstrate the stated characteristic in any way, reply exactly [NaN,NaN] without any additional reasoning or explanation.\n\
         {scale_block}\n\
         Provide your rationale in the format: [Score, Reason].\n\
         ** Please double-check that if the comment does not demonstrate the stated characteristic in any way, your reply is exactly [NaN,NaN] with no extra explanation.",
        product = req.product_line,
        title = req.title,
        body = req.body,
        attribute = req.attribute_name,
        category = req.attribute_category.as_str(),
    )
}
