//! Stream Adapter: raw provider reply to a lazy sequence of text fragments.

use async_stream::stream;
use futures::{Stream, StreamExt};

use crate::decode::Utf8StreamDecoder;
use crate::error::AgentError;
use crate::runtime::AgentReply;

/// Yielded when the provider sent no completion stream at all.
pub const NO_RESPONSE_FALLBACK: &str = "No response from agent.";

/// Shown in place of unparseable provider output, on both the stream and
/// block paths. Internal diagnostics stay out of user-visible text.
pub const UNPARSEABLE_FALLBACK: &str =
    "The agent response could not be parsed. Please check your agent configuration.";

/// Adapt a raw reply into decoded text fragments.
///
/// Finite, single-consumer, not restartable. Downstream always sees at
/// least one fragment, and a mid-stream failure degrades to one diagnostic
/// fragment and then end-of-stream; errors never cross this boundary.
pub fn fragments(reply: AgentReply) -> impl Stream<Item = String> + Send {
    stream! {
        let Some(mut completion) = reply.completion else {
            yield NO_RESPONSE_FALLBACK.to_string();
            return;
        };

        let mut decoder = Utf8StreamDecoder::new();

        while let Some(chunk) = completion.next().await {
            match chunk {
                Ok(bytes) => yield decoder.decode(&bytes),
                Err(AgentError::MalformedResponse) => {
                    yield UNPARSEABLE_FALLBACK.to_string();
                    return;
                }
                Err(err) => {
                    yield format!("Stream error: {}", err);
                    return;
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            yield tail;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{AgentRuntime, MockAgentRuntime, MockStep};

    async fn collect(runtime: MockAgentRuntime) -> Vec<String> {
        let reply = runtime
            .invoke(crate::runtime::AgentInvocation {
                agent_id: "agent-1".to_string(),
                agent_alias_id: "alias-1".to_string(),
                session_id: "session-1".to_string(),
                input_text: "hi".to_string(),
            })
            .await
            .unwrap();
        fragments(reply).collect().await
    }

    #[tokio::test]
    async fn yields_fragments_in_arrival_order() {
        let runtime = MockAgentRuntime::with_reply(vec![
            MockStep::chunk("The"),
            MockStep::chunk(" OUAF"),
            MockStep::chunk(" process"),
        ]);
        assert_eq!(collect(runtime).await, vec!["The", " OUAF", " process"]);
    }

    #[tokio::test]
    async fn missing_completion_yields_fallback() {
        let runtime = MockAgentRuntime::new();
        runtime
            .push_reply(crate::runtime::MockReply::NoCompletion)
            .await;
        assert_eq!(collect(runtime).await, vec![NO_RESPONSE_FALLBACK]);
    }

    #[tokio::test]
    async fn split_multibyte_chunks_decode_cleanly() {
        let bytes = "你好".as_bytes();
        let runtime = MockAgentRuntime::with_reply(vec![
            MockStep::raw(bytes[..4].to_vec()),
            MockStep::raw(bytes[4..].to_vec()),
        ]);
        let joined: String = collect(runtime).await.concat();
        assert_eq!(joined, "你好");
    }

    #[tokio::test]
    async fn mid_stream_error_degrades_to_diagnostic_fragment() {
        let runtime = MockAgentRuntime::with_reply(vec![
            MockStep::chunk("partial "),
            MockStep::error("connection reset"),
        ]);
        let fragments = collect(runtime).await;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "partial ");
        assert!(fragments[1].starts_with("Stream error: "));
        assert!(fragments[1].contains("connection reset"));
    }

    #[tokio::test]
    async fn malformed_response_yields_fixed_message() {
        let runtime =
            MockAgentRuntime::with_reply(vec![MockStep::chunk("x"), MockStep::Malformed]);
        let fragments = collect(runtime).await;
        assert_eq!(fragments.last().map(String::as_str), Some(UNPARSEABLE_FALLBACK));
    }
}
