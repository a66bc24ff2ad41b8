//! # Frame-Driven Animation
//!
//! Every animation here is a pure function of wall-clock time. Nothing owns a
//! timer. The event loop calls in with the current `Instant` on each frame,
//! and the value for that instant is computed from the start time and
//! duration. Two consequences:
//!
//! - Ticks can arrive at any cadence and values still progress monotonically.
//! - Once the duration has elapsed the exact end value is returned, never an
//!   approximation left over from the last frame.
//!
//! Superseded animations are stopped through their `CancelToken`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Duration of the closeness counter and meter fill animations.
pub const DEFAULT_COUNTER_DURATION: Duration = Duration::from_millis(800);
/// Lifetime of the floating "+N"/"-N" indicator.
pub const DEFAULT_INDICATOR_DURATION: Duration = Duration::from_millis(1500);
/// Delay between revealed characters of an assistant reply.
pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(50);

/// How far (in rows) the delta indicator drifts before it disappears.
pub const INDICATOR_RISE_ROWS: f64 = 2.0;

/// Timing knobs, resolved from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTimings {
    pub counter: Duration,
    pub indicator: Duration,
    pub typing_interval: Duration,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            counter: DEFAULT_COUNTER_DURATION,
            indicator: DEFAULT_INDICATOR_DURATION,
            typing_interval: DEFAULT_TYPING_INTERVAL,
        }
    }
}

/// Linear interpolation from `start` to `end`.
///
/// Returns exactly `end` once `elapsed >= duration` (or when `duration` is zero).
pub fn interpolate(start: f64, end: f64, elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() || elapsed >= duration {
        return end;
    }
    let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
    start + (end - start) * progress
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A linear transition between two values.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    token: CancelToken,
}

impl Tween {
    pub fn new(from: f64, to: f64, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
            token: CancelToken::new(),
        }
    }

    /// A tween that is already at rest on `value`.
    pub fn fixed(value: f64, now: Instant) -> Self {
        Self::new(value, value, now, Duration::ZERO)
    }

    /// Value at `now`. Cancellation does not affect the value; owners read it
    /// one last time and then replace the tween.
    pub fn value_at(&self, now: Instant) -> f64 {
        interpolate(
            self.from,
            self.to,
            now.saturating_duration_since(self.started),
            self.duration,
        )
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Done when cancelled or when the full duration has elapsed.
    pub fn is_finished(&self, now: Instant) -> bool {
        self.token.is_cancelled() || now.saturating_duration_since(self.started) >= self.duration
    }
}

/// The floating "+N" / "-N" that drifts upward and fades after a change.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaIndicator {
    pub delta: i32,
    started: Instant,
    duration: Duration,
}

impl DeltaIndicator {
    pub fn new(delta: i32, started: Instant, duration: Duration) -> Self {
        Self {
            delta,
            started,
            duration,
        }
    }

    /// "+15" for gains, "-15" for losses.
    pub fn label(&self) -> String {
        if self.delta > 0 {
            format!("+{}", self.delta)
        } else {
            self.delta.to_string()
        }
    }

    pub fn is_gain(&self) -> bool {
        self.delta > 0
    }

    /// 1.0 when shown, 0.0 when fully faded.
    pub fn opacity_at(&self, now: Instant) -> f64 {
        interpolate(1.0, 0.0, self.elapsed(now), self.duration)
    }

    /// Upward drift in rows, 0 at start.
    pub fn rise_at(&self, now: Instant) -> f64 {
        interpolate(0.0, INDICATOR_RISE_ROWS, self.elapsed(now), self.duration)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.duration
    }

    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }
}

/// Character-by-character reveal of a reply at a fixed cadence.
#[derive(Debug, Clone)]
pub struct Reveal {
    text: String,
    char_count: usize,
    started: Instant,
    interval: Duration,
    token: CancelToken,
}

impl Reveal {
    pub fn new(text: impl Into<String>, started: Instant, interval: Duration) -> Self {
        let text = text.into();
        let char_count = text.chars().count();
        Self {
            text,
            char_count,
            started,
            interval,
            token: CancelToken::new(),
        }
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Characters visible at `now`: one per elapsed interval.
    pub fn shown_chars(&self, now: Instant) -> usize {
        if self.token.is_cancelled() || self.interval.is_zero() {
            return self.char_count;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let steps = elapsed.as_nanos() / self.interval.as_nanos();
        usize::try_from(steps)
            .unwrap_or(usize::MAX)
            .min(self.char_count)
    }

    /// The prefix of the reply visible at `now`, cut on a char boundary.
    pub fn visible_text(&self, now: Instant) -> &str {
        let shown = self.shown_chars(now);
        match self.text.char_indices().nth(shown) {
            Some((byte_idx, _)) => &self.text[..byte_idx],
            None => &self.text,
        }
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.shown_chars(now) >= self.char_count
    }

    /// Jump to the end: every subsequent read returns the full text.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}
