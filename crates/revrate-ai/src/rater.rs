//! Fail-closed rating wrapper: prompt → remote call → parse.

use revrate_core::{RatingRequest, RatingResult, SYSTEM_RESET, Verdict, build_prompt, parse_reply};
use tracing::warn;

use crate::chat::{ChatApi, ChatMessage};

/// Rates single requests against any [`ChatApi`].
///
/// Never returns an error: any fault while calling the remote model becomes
/// a [`Verdict::Errored`] result carrying the error description, so callers
/// can mark the row and move on.
pub struct Rater<A> {
    api: A,
}

impl<A: ChatApi> Rater<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn rate(&self, request: &RatingRequest) -> RatingResult {
        let messages = [
            ChatMessage::system(SYSTEM_RESET),
            ChatMessage::user(build_prompt(request)),
        ];
        match self.api.complete(&messages).await {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                warn!(attribute = %request.attribute_name, error = %e, "chat completion failed");
                RatingResult {
                    verdict: Verdict::Errored {
                        detail: e.to_string(),
                    },
                    raw: format!("Error: {e}"),
                }
            }
        }
    }
}
