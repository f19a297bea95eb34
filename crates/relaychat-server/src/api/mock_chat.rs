//! POST /api/mock-chat: canned stream over the production SSE encoder.
//!
//! Same wire protocol as /api/chat, no upstream call; useful for driving
//! the client and the reveal styles without live agent quota.

use async_stream::stream;
use axum::response::Response;
use rand::Rng;
use tokio::time::{Duration, sleep};

use crate::api::sse::{sse_events, sse_response};

const SAMPLE_RESPONSE: &str = "This is a mocked response from the local server. \
It is designed to be long enough to test all the different animation styles \
without using any live API queries. You can freely test the UI and streaming \
functionality with this endpoint.";

pub async fn mock_chat() -> Response {
    let words: Vec<String> = SAMPLE_RESPONSE
        .split_whitespace()
        .map(|word| format!(" {}", word))
        .collect();

    let fragments = stream! {
        for word in words {
            // Simulate a natural typing delay.
            let delay = rand::rng().random_range(30..90);
            sleep(Duration::from_millis(delay)).await;
            yield word;
        }
    };

    sse_response(sse_events(fragments))
}
