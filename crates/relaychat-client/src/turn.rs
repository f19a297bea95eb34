//! Per-turn lifecycle and transcript state.

/// Marker text shown when a turn is stopped before any content arrived.
pub const STOPPED_FALLBACK: &str = "Generation stopped.";

/// Lifecycle of one assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Pending,
    Streaming,
    Completed,
    Stopped,
    Failed,
}

impl TurnState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TurnState::Pending | TurnState::Streaming)
    }
}

/// The authoritative transcript of one turn.
///
/// Append-only while active; frozen at the first terminal transition.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    transcript: String,
    state: TurnState,
}

impl Turn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The stream opened (`start` observed).
    pub fn begin(&mut self) {
        if self.state == TurnState::Pending {
            self.state = TurnState::Streaming;
        }
    }

    pub fn append(&mut self, content: &str) {
        if self.state.is_terminal() {
            return;
        }
        self.state = TurnState::Streaming;
        self.transcript.push_str(content);
    }

    pub fn complete(&mut self) {
        if !self.state.is_terminal() {
            self.state = TurnState::Completed;
        }
    }

    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = TurnState::Failed;
        }
    }

    /// User-initiated stop. An empty transcript gets the marker text so no
    /// turn is left showing nothing.
    pub fn stop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        if self.transcript.is_empty() {
            self.transcript.push_str(STOPPED_FALLBACK);
        }
        self.state = TurnState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_length_is_non_decreasing() {
        let mut turn = Turn::new();
        let mut last_len = 0;
        for piece in ["The", " OUAF", " process"] {
            turn.append(piece);
            assert!(turn.transcript().len() >= last_len);
            last_len = turn.transcript().len();
        }
        assert_eq!(turn.transcript(), "The OUAF process");
        assert_eq!(turn.state(), TurnState::Streaming);
    }

    #[test]
    fn transcript_freezes_at_completion() {
        let mut turn = Turn::new();
        turn.append("done");
        turn.complete();
        turn.append(" extra");
        assert_eq!(turn.transcript(), "done");
        assert_eq!(turn.state(), TurnState::Completed);
    }

    #[test]
    fn stop_on_empty_turn_leaves_marker() {
        let mut turn = Turn::new();
        turn.begin();
        turn.stop();
        assert_eq!(turn.transcript(), STOPPED_FALLBACK);
        assert_eq!(turn.state(), TurnState::Stopped);
    }

    #[test]
    fn stop_after_content_keeps_partial_text() {
        let mut turn = Turn::new();
        turn.append("partial answer");
        turn.stop();
        assert_eq!(turn.transcript(), "partial answer");
    }

    #[test]
    fn terminal_states_do_not_transition() {
        let mut turn = Turn::new();
        turn.fail();
        turn.complete();
        turn.stop();
        assert_eq!(turn.state(), TurnState::Failed);
    }
}
