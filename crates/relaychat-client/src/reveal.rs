//! Paced reveal of a growing transcript.
//!
//! Network arrival is bursty; the reveal runs on its own clock. The
//! scheduler owns the displayed prefix and advances it toward the
//! authoritative transcript one increment at a time, tracking a moving
//! target. Pacing is presentation only; the transcript stays
//! authoritative.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;

use crate::consumer::TurnUpdate;

/// Delay before the first tick of a new turn.
pub const START_DELAY: Duration = Duration::from_millis(200);

/// How the next increment is selected.
///
/// One variant per pacing style; each is a pure function from the
/// remaining text to an increment plus a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealStyle {
    /// One word per tick.
    Word,
    /// A short random run of characters (2–4) per tick.
    Burst,
    /// Up to three words per tick, faded in before merging.
    Chunked,
    /// One character per tick.
    #[default]
    Smooth,
}

impl RevealStyle {
    fn base_delay(self) -> Duration {
        let millis = match self {
            RevealStyle::Word => 20,
            RevealStyle::Burst => 18,
            RevealStyle::Chunked => 60,
            RevealStyle::Smooth => 14,
        };
        Duration::from_millis(millis)
    }

    fn max_jitter_ms(self) -> u64 {
        match self {
            RevealStyle::Chunked => 25,
            _ => 20,
        }
    }

    /// Fade window a pending increment is held for before merging.
    pub fn fade(self) -> Option<Duration> {
        match self {
            RevealStyle::Chunked => Some(Duration::from_millis(200)),
            _ => None,
        }
    }
}

/// One scheduled step: what was revealed and when to tick again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    pub increment: String,
    pub delay: Duration,
}

/// Displayed-prefix state machine.
///
/// `stable + pending` is what the user sees; it never exceeds the target
/// transcript and catches up to it asynchronously.
#[derive(Debug)]
pub struct RevealScheduler {
    style: RevealStyle,
    stable: String,
    pending: String,
}

impl RevealScheduler {
    pub fn new(style: RevealStyle) -> Self {
        Self {
            style,
            stable: String::new(),
            pending: String::new(),
        }
    }

    pub fn style(&self) -> RevealStyle {
        self.style
    }

    pub fn displayed(&self) -> String {
        format!("{}{}", self.stable, self.pending)
    }

    pub fn displayed_len(&self) -> usize {
        self.stable.len() + self.pending.len()
    }

    pub fn is_caught_up(&self, target: &str) -> bool {
        self.displayed_len() >= target.len()
    }

    /// Discard all state; used on turn replacement or style change.
    pub fn reset(&mut self) {
        self.stable.clear();
        self.pending.clear();
    }

    /// Merge a faded pending increment into the stable prefix.
    pub fn commit_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.stable.push_str(&pending);
    }

    /// Take one step toward `target`; `None` once caught up.
    ///
    /// The displayed prefix is always a prefix of `target` because the
    /// transcript is append-only, so byte offsets line up across calls
    /// even while the target is still growing.
    pub fn step<R: Rng>(&mut self, target: &str, rng: &mut R) -> Option<RevealStep> {
        // Any previous fade window has elapsed by the next tick.
        self.commit_pending();

        if self.displayed_len() >= target.len() {
            return None;
        }
        let remaining = &target[self.displayed_len()..];

        let increment = next_increment(self.style, remaining, rng);
        let jitter = Duration::from_millis(rng.random_range(0..=self.style.max_jitter_ms()));
        let mut delay = self.style.base_delay() + jitter + punctuation_pause(&increment);

        match self.style.fade() {
            Some(fade) => {
                delay += fade;
                self.pending = increment.clone();
            }
            None => self.stable.push_str(&increment),
        }

        Some(RevealStep { increment, delay })
    }
}

fn next_increment<R: Rng>(style: RevealStyle, remaining: &str, rng: &mut R) -> String {
    match style {
        RevealStyle::Smooth => first_chars(remaining, 1),
        RevealStyle::Burst => first_chars(remaining, rng.random_range(2..=4)),
        RevealStyle::Word => next_words(remaining, 1),
        RevealStyle::Chunked => next_words(remaining, 3),
    }
}

/// First `count` characters, whole characters only.
fn first_chars(remaining: &str, count: usize) -> String {
    remaining.chars().take(count).collect()
}

/// Leading whitespace plus up to `max_words` whitespace-delimited words,
/// with the whitespace between them. Trailing whitespace stays behind for
/// the next step.
fn next_words(remaining: &str, max_words: usize) -> String {
    let mut end = 0;
    let mut last_word_end = 0;
    let mut words = 0;
    let mut in_word = false;

    for (i, c) in remaining.char_indices() {
        if c.is_whitespace() {
            if in_word {
                in_word = false;
                words += 1;
                last_word_end = i;
                if words == max_words {
                    break;
                }
            }
        } else {
            in_word = true;
        }
        end = i + c.len_utf8();
    }
    if in_word {
        words += 1;
        last_word_end = end;
    }

    if words == 0 {
        // Nothing but whitespace left: reveal it all.
        remaining.to_string()
    } else {
        remaining[..last_word_end].to_string()
    }
}

/// Extra pause after sentence- or clause-ending punctuation and line
/// breaks, to mimic natural pacing.
fn punctuation_pause(increment: &str) -> Duration {
    let mut extra = 0;
    if let Some(last) = increment.trim_end().chars().last() {
        if matches!(last, '.' | '!' | '?') {
            extra += 170;
        }
        if matches!(last, ';' | ':') {
            extra += 100;
        }
    }
    if increment.contains('\n') {
        extra += 150;
    }
    Duration::from_millis(extra)
}

/// Drive a scheduler against a live transcript feed.
///
/// `render` runs with the full displayed text after every visible change.
/// The loop keeps up with a growing target and ends once the displayed
/// prefix has converged on a frozen transcript.
pub async fn run_reveal<F>(
    mut scheduler: RevealScheduler,
    mut updates: watch::Receiver<TurnUpdate>,
    mut render: F,
) where
    F: FnMut(&str),
{
    tokio::time::sleep(START_DELAY).await;
    // Not the thread-local rng: this future must be Send.
    let mut rng = StdRng::from_os_rng();

    loop {
        let snapshot = updates.borrow().clone();
        match scheduler.step(&snapshot.transcript, &mut rng) {
            Some(step) => {
                render(&scheduler.displayed());
                tokio::time::sleep(step.delay).await;
            }
            None => {
                if snapshot.state.is_terminal() {
                    break;
                }
                // Caught up but the turn is still streaming: wait for
                // the transcript to grow.
                if updates.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    scheduler.commit_pending();
    render(&scheduler.displayed());
}
