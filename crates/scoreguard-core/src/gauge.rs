//! Score gauge view state
//!
//! A [`GaugeView`] is the owner of the two gauge animations. Showing a new
//! result restarts both; unmounting cancels both so nothing keeps producing
//! frames for a discarded view.

use serde::Serialize;
use std::sync::Arc;

use crate::animation::{AnimationDriver, AnimationKey, FrameClock, Interpolation};
use crate::config::AnimationSettings;
use crate::score::{color_tier, percentage, ScoreResult, ScoreTier};

const COUNTER_KEY: &str = "gauge.counter";
const ARC_KEY: &str = "gauge.arc";

/// What the gauge draws on one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualState {
    /// Arc fill, `[0, 100]`
    pub percent: f64,
    pub color: ScoreTier,
    pub displayed_count: i64,
}

impl VisualState {
    /// Resting state once both animations have completed
    pub fn settled(score: i64) -> Self {
        Self {
            percent: percentage(score),
            color: color_tier(score),
            displayed_count: score,
        }
    }
}

pub struct GaugeView {
    driver: AnimationDriver,
    settings: AnimationSettings,
    result: Option<ScoreResult>,
    state: Option<VisualState>,
    counter: AnimationKey,
    arc: AnimationKey,
}

impl GaugeView {
    pub fn new(clock: Arc<dyn FrameClock>, settings: AnimationSettings) -> Self {
        Self {
            driver: AnimationDriver::new(clock),
            settings,
            result: None,
            state: None,
            counter: AnimationKey::new(COUNTER_KEY),
            arc: AnimationKey::new(ARC_KEY),
        }
    }

    /// Display a new result, restarting both animations
    pub fn show(&mut self, result: ScoreResult) {
        let score = result.score;
        let target_percent = percentage(score);

        self.driver.start(
            self.counter.clone(),
            Interpolation::count_up(score, self.settings.count_up()),
        );
        self.driver.start(
            self.arc.clone(),
            Interpolation::arc_fill(
                target_percent,
                self.settings.arc_delay(),
                self.settings.arc_fill(),
            ),
        );

        self.state = Some(VisualState {
            percent: 0.0,
            color: color_tier(score),
            displayed_count: 0,
        });
        self.result = Some(result);
    }

    /// Advance one frame; `None` while nothing is shown
    pub fn frame(&mut self) -> Option<VisualState> {
        let mut state = self.state?;
        for frame in self.driver.tick() {
            if frame.key == self.counter {
                state.displayed_count = frame.value as i64;
            } else if frame.key == self.arc {
                state.percent = frame.value;
            }
        }
        self.state = Some(state);
        Some(state)
    }

    /// Jump both animations to their end values
    pub fn finish(&mut self) -> Option<VisualState> {
        self.driver.cancel_all();
        let settled = VisualState::settled(self.result.as_ref()?.score);
        self.state = Some(settled);
        Some(settled)
    }

    /// Tear the view down
    pub fn unmount(&mut self) {
        self.driver.cancel_all();
        self.result = None;
        self.state = None;
    }

    pub fn is_animating(&self) -> bool {
        !self.driver.is_idle()
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    pub fn state(&self) -> Option<VisualState> {
        self.state
    }
}
