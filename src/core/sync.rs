//! # State Synchronizer
//!
//! Reconciles server state snapshots with what the affection panel shows.
//!
//! ```text
//! WireGameState ──normalise──▶ Snapshot ──apply(now)──▶ StateSync
//!                                                       ├── number: Tween   (800ms)
//!                                                       ├── fill:   Tween   (800ms)
//!                                                       ├── indicator       (1.5s)
//!                                                       ├── tier, labels
//!                                                       └── mirror: GameState
//! ```
//!
//! The first snapshot of a session lands instantly. Later snapshots animate
//! when closeness changed. Labels and tier update immediately in every case.

use std::time::Instant;

use log::debug;
use serde_json::Value;

use crate::api::WireGameState;
use crate::core::animation::{AnimationTimings, DeltaIndicator, Tween};

/// Closeness used when the server sends nothing usable.
pub const DEFAULT_CLOSENESS: i32 = 30;
pub const DEFAULT_RELATIONSHIP: &str = "初始阶段";
pub const DEFAULT_SCENE: &str = "学校 - 百团大战";

pub const MIN_CLOSENESS: i32 = 0;
pub const MAX_CLOSENESS: i32 = 100;

/// Colour band of the affection meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Critical,
    Low,
    Mid,
    High,
}

impl Tier {
    /// Thresholds are closed on the lower bound: 50 is `Mid`, 49 is `Low`.
    pub fn for_closeness(closeness: i32) -> Tier {
        if closeness >= 80 {
            Tier::High
        } else if closeness >= 50 {
            Tier::Mid
        } else if closeness >= 30 {
            Tier::Low
        } else {
            Tier::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Critical => "critical",
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

/// Parse a closeness value the way the server's JS clients always have:
/// leading integer of a number or numeric string, anything else is the default.
/// Values outside `[0, 100]` also fall back to the default.
pub fn parse_closeness(value: Option<&Value>) -> i32 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => leading_integer(s),
        _ => None,
    };
    match parsed {
        Some(n) if (MIN_CLOSENESS as i64..=MAX_CLOSENESS as i64).contains(&n) => n as i32,
        _ => DEFAULT_CLOSENESS,
    }
}

/// `"  45.7 pts"` → 45, `"-3"` → -3, `"abc"` → None.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Absurdly long digit runs saturate rather than fail; they are out of range anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A normalised snapshot: every field has a concrete value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub closeness: i32,
    pub relationship: String,
    pub scene: String,
}

impl Snapshot {
    pub fn from_wire(state: &WireGameState) -> Self {
        let relationship = non_empty(&state.relationship_state)
            .or_else(|| non_empty(&state.relationship))
            .unwrap_or(DEFAULT_RELATIONSHIP);
        let scene = non_empty(&state.scene).unwrap_or(DEFAULT_SCENE);
        Self {
            closeness: parse_closeness(state.closeness.as_ref()),
            relationship: relationship.to_string(),
            scene: scene.to_string(),
        }
    }
}

/// Client-held mirror of the server's game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub closeness: i32,
    pub relationship_label: String,
    pub scene: String,
    pub initialized: bool,
    pub started: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            closeness: DEFAULT_CLOSENESS,
            relationship_label: DEFAULT_RELATIONSHIP.to_string(),
            scene: DEFAULT_SCENE.to_string(),
            initialized: false,
            started: false,
        }
    }
}

/// How a snapshot was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// First snapshot of the session, shown without animation.
    Initial,
    /// Closeness changed; counter, fill and indicator are animating.
    Animated { from: i32, to: i32 },
    /// Closeness unchanged; labels and tier refreshed only.
    Unchanged,
}

/// Owns the displayed affection state and the `GameState` mirror.
#[derive(Debug, Clone)]
pub struct StateSync {
    timings: AnimationTimings,
    number: Option<Tween>,
    fill: Option<Tween>,
    indicator: Option<DeltaIndicator>,
    tier: Tier,
    mirror: GameState,
}

impl StateSync {
    pub fn new(timings: AnimationTimings) -> Self {
        Self {
            timings,
            number: None,
            fill: None,
            indicator: None,
            tier: Tier::for_closeness(DEFAULT_CLOSENESS),
            mirror: GameState::default(),
        }
    }

    /// Apply a server snapshot at `now`.
    pub fn apply(&mut self, state: &WireGameState, now: Instant) -> SyncOutcome {
        let old = self.displayed_closeness(now);
        let snapshot = Snapshot::from_wire(state);
        let new = snapshot.closeness;

        let outcome = if !self.mirror.initialized {
            self.set_at_rest(new, now);
            SyncOutcome::Initial
        } else if new != old {
            self.animate(old, new, now);
            SyncOutcome::Animated { from: old, to: new }
        } else {
            self.set_at_rest(new, now);
            SyncOutcome::Unchanged
        };

        self.tier = Tier::for_closeness(new);
        debug!(
            "Applied state: closeness {} -> {} ({:?}), tier {}",
            old,
            new,
            outcome,
            self.tier.label()
        );

        self.mirror = GameState {
            closeness: new,
            relationship_label: snapshot.relationship,
            scene: snapshot.scene,
            initialized: true,
            started: self.mirror.started,
        };
        outcome
    }

    fn set_at_rest(&mut self, value: i32, now: Instant) {
        self.cancel_running();
        self.number = Some(Tween::fixed(value as f64, now));
        self.fill = Some(Tween::fixed(value as f64, now));
    }

    fn animate(&mut self, old: i32, new: i32, now: Instant) {
        self.cancel_running();
        self.number = Some(Tween::new(old as f64, new as f64, now, self.timings.counter));
        self.fill = Some(Tween::new(old as f64, new as f64, now, self.timings.counter));
        self.indicator = Some(DeltaIndicator::new(new - old, now, self.timings.indicator));
    }

    fn cancel_running(&mut self) {
        for tween in self.number.iter().chain(self.fill.iter()) {
            tween.cancel();
        }
    }

    /// The integer currently on screen; 30 before anything was applied.
    pub fn displayed_closeness(&self, now: Instant) -> i32 {
        self.number
            .as_ref()
            .map(|t| t.value_at(now).round() as i32)
            .unwrap_or(DEFAULT_CLOSENESS)
    }

    /// Meter fill in percent (0.0..=100.0).
    pub fn fill_percent(&self, now: Instant) -> f64 {
        self.fill
            .as_ref()
            .map(|t| t.value_at(now))
            .unwrap_or(DEFAULT_CLOSENESS as f64)
            .clamp(MIN_CLOSENESS as f64, MAX_CLOSENESS as f64)
    }

    /// The delta indicator, if it is still visible at `now`.
    pub fn indicator(&self, now: Instant) -> Option<&DeltaIndicator> {
        self.indicator.as_ref().filter(|ind| !ind.is_expired(now))
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn state(&self) -> &GameState {
        &self.mirror
    }

    pub fn mark_started(&mut self) {
        self.mirror.started = true;
    }

    /// True while any counter, fill or indicator animation is still moving.
    pub fn is_animating(&self, now: Instant) -> bool {
        let tween_running = |t: &Option<Tween>| t.as_ref().is_some_and(|t| !t.is_finished(now));
        tween_running(&self.number) || tween_running(&self.fill) || self.indicator(now).is_some()
    }

    /// Drop the indicator once it has faded out.
    pub fn tick(&mut self, now: Instant) {
        if self.indicator.as_ref().is_some_and(|ind| ind.is_expired(now)) {
            self.indicator = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn wire(closeness: Value, relationship: Option<&str>, scene: Option<&str>) -> WireGameState {
        WireGameState {
            closeness: Some(closeness),
            relationship_state: relationship.map(str::to_string),
            scene: scene.map(str::to_string),
            ..Default::default()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// A synchronizer that has already shown `closeness` once.
    fn initialized_at(closeness: i32, t0: Instant) -> StateSync {
        let mut sync = StateSync::new(AnimationTimings::default());
        sync.apply(&wire(json!(closeness), None, None), t0);
        sync
    }

    #[test]
    fn tier_thresholds_cover_full_range() {
        for c in 0..=100 {
            let expected = match c {
                80..=100 => Tier::High,
                50..=79 => Tier::Mid,
                30..=49 => Tier::Low,
                _ => Tier::Critical,
            };
            assert_eq!(Tier::for_closeness(c), expected, "closeness {c}");
        }
    }

    #[test]
    fn tier_boundaries_closed_on_lower_bound() {
        assert_eq!(Tier::for_closeness(50), Tier::Mid);
        assert_eq!(Tier::for_closeness(49), Tier::Low);
        assert_eq!(Tier::for_closeness(80), Tier::High);
        assert_eq!(Tier::for_closeness(30), Tier::Low);
        assert_eq!(Tier::for_closeness(29), Tier::Critical);
    }

    #[test]
    fn parse_closeness_variants() {
        assert_eq!(parse_closeness(Some(&json!(45))), 45);
        assert_eq!(parse_closeness(Some(&json!(45.9))), 45);
        assert_eq!(parse_closeness(Some(&json!("62"))), 62);
        assert_eq!(parse_closeness(Some(&json!(" 7 points"))), 7);
        assert_eq!(parse_closeness(Some(&json!(0))), 0);
        assert_eq!(parse_closeness(Some(&json!(100))), 100);
        assert_eq!(parse_closeness(Some(&json!(100.5))), 100);
        assert_eq!(parse_closeness(Some(&json!(150))), DEFAULT_CLOSENESS);
        assert_eq!(parse_closeness(Some(&json!("-20"))), DEFAULT_CLOSENESS);
        assert_eq!(parse_closeness(Some(&json!("101"))), DEFAULT_CLOSENESS);
        assert_eq!(parse_closeness(Some(&json!("abc"))), DEFAULT_CLOSENESS);
        assert_eq!(parse_closeness(Some(&json!(null))), DEFAULT_CLOSENESS);
        assert_eq!(parse_closeness(Some(&json!([1]))), DEFAULT_CLOSENESS);
        assert_eq!(parse_closeness(None), DEFAULT_CLOSENESS);
    }

    #[test]
    fn snapshot_label_fallbacks() {
        let state = WireGameState {
            relationship: Some("熟人".into()),
            ..Default::default()
        };
        let snap = Snapshot::from_wire(&state);
        assert_eq!(snap.relationship, "熟人");
        assert_eq!(snap.scene, DEFAULT_SCENE);

        let snap = Snapshot::from_wire(&WireGameState {
            relationship_state: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(snap.relationship, DEFAULT_RELATIONSHIP);
        assert_eq!(snap.closeness, DEFAULT_CLOSENESS);
    }

    #[test]
    fn first_apply_is_instant_and_initializes() {
        let t0 = Instant::now();
        let mut sync = StateSync::new(AnimationTimings::default());
        assert!(!sync.state().initialized);

        let outcome = sync.apply(&wire(json!(65), Some("朋友"), Some("图书馆")), t0);

        assert_eq!(outcome, SyncOutcome::Initial);
        assert_eq!(sync.displayed_closeness(t0), 65);
        assert_eq!(sync.fill_percent(t0), 65.0);
        assert!(sync.indicator(t0).is_none());
        assert!(!sync.is_animating(t0));
        assert_eq!(sync.tier(), Tier::Mid);
        assert!(sync.state().initialized);
        assert_eq!(sync.state().relationship_label, "朋友");
        assert_eq!(sync.state().scene, "图书馆");
    }

    #[test]
    fn unchanged_closeness_refreshes_labels_without_animation() {
        let t0 = Instant::now();
        let mut sync = initialized_at(30, t0);

        let outcome = sync.apply(&wire(json!(30), Some("熟人"), Some("操场")), t0 + ms(10));

        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert!(!sync.is_animating(t0 + ms(10)));
        assert!(sync.indicator(t0 + ms(10)).is_none());
        assert_eq!(sync.tier(), Tier::Low);
        assert_eq!(sync.state().relationship_label, "熟人");
        assert_eq!(sync.state().scene, "操场");
    }

    #[test]
    fn increase_shows_positive_delta_and_animates() {
        let t0 = Instant::now();
        let mut sync = initialized_at(30, t0);

        let outcome = sync.apply(&wire(json!(45), None, None), t0);

        assert_eq!(outcome, SyncOutcome::Animated { from: 30, to: 45 });
        assert_eq!(sync.indicator(t0).unwrap().label(), "+15");
        assert_eq!(sync.displayed_closeness(t0), 30);
        assert_eq!(sync.fill_percent(t0 + ms(400)), 37.5);
        assert_eq!(sync.displayed_closeness(t0 + ms(800)), 45);
        assert_eq!(sync.fill_percent(t0 + ms(800)), 45.0);
        assert_eq!(sync.state().closeness, 45);
        // Indicator outlives the counter.
        assert!(sync.indicator(t0 + ms(1000)).is_some());
        assert!(sync.indicator(t0 + ms(1500)).is_none());
        assert!(!sync.is_animating(t0 + ms(1500)));
    }

    #[test]
    fn decrease_shows_negative_delta() {
        let t0 = Instant::now();
        let mut sync = initialized_at(45, t0);

        sync.apply(&wire(json!(30), None, None), t0);

        assert_eq!(sync.indicator(t0).unwrap().label(), "-15");
        assert_eq!(sync.tier(), Tier::Low);
    }

    #[test]
    fn missing_new_closeness_defaults_to_thirty_and_animates() {
        let t0 = Instant::now();
        let mut sync = initialized_at(60, t0);

        let outcome = sync.apply(&WireGameState::default(), t0);

        assert_eq!(outcome, SyncOutcome::Animated { from: 60, to: 30 });
        assert_eq!(sync.state().closeness, 30);
    }

    #[test]
    fn out_of_range_closeness_counts_as_default() {
        let t0 = Instant::now();
        let mut sync = initialized_at(30, t0);

        let outcome = sync.apply(&wire(json!(150), None, None), t0);

        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert!(sync.indicator(t0).is_none());
        assert_eq!(sync.displayed_closeness(t0), 30);

        let outcome = sync.apply(&wire(json!("-20"), None, None), t0);
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(sync.state().closeness, 30);
    }

    #[test]
    fn mid_animation_update_starts_from_displayed_value() {
        let t0 = Instant::now();
        let mut sync = initialized_at(30, t0);
        sync.apply(&wire(json!(50), None, None), t0);

        // Halfway through, the counter shows 40.
        let t1 = t0 + ms(400);
        let outcome = sync.apply(&wire(json!(60), None, None), t1);

        assert_eq!(outcome, SyncOutcome::Animated { from: 40, to: 60 });
        assert_eq!(sync.indicator(t1).unwrap().label(), "+20");
        assert_eq!(sync.displayed_closeness(t1 + ms(800)), 60);
    }

    #[test]
    fn started_survives_state_overwrite() {
        let t0 = Instant::now();
        let mut sync = StateSync::new(AnimationTimings::default());
        sync.mark_started();
        sync.apply(&wire(json!(40), None, None), t0);
        assert!(sync.state().started);
    }

    #[test]
    fn tick_drops_expired_indicator() {
        let t0 = Instant::now();
        let mut sync = initialized_at(30, t0);
        sync.apply(&wire(json!(35), None, None), t0);
        sync.tick(t0 + ms(2000));
        assert!(sync.indicator.is_none());
    }
}
