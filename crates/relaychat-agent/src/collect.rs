//! Block Collector: drain a reply into one finished string.

use futures::StreamExt;

use crate::decode::Utf8StreamDecoder;
use crate::error::AgentError;
use crate::runtime::AgentReply;
use crate::stream::UNPARSEABLE_FALLBACK;

pub const NO_COMPLETION_FALLBACK: &str = "No completion stream received from agent";
pub const EMPTY_CONTENT_FALLBACK: &str = "No response content received from agent";

/// Concatenate every decoded fragment of a reply, trimmed.
///
/// Policy-equivalent to consuming the Stream Adapter and joining. Callers
/// never see a raw provider parsing error: unparseable output and empty
/// responses both come back as fixed explanatory strings.
pub async fn collect_reply(reply: AgentReply) -> String {
    let Some(mut completion) = reply.completion else {
        return NO_COMPLETION_FALLBACK.to_string();
    };

    let mut decoder = Utf8StreamDecoder::new();
    let mut full_text = String::new();

    while let Some(chunk) = completion.next().await {
        match chunk {
            Ok(bytes) => full_text.push_str(&decoder.decode(&bytes)),
            Err(AgentError::MalformedResponse) => return UNPARSEABLE_FALLBACK.to_string(),
            Err(err) => return format!("Error processing response: {}", err),
        }
    }
    full_text.push_str(&decoder.finish());

    let trimmed = full_text.trim();
    if trimmed.is_empty() {
        EMPTY_CONTENT_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}
