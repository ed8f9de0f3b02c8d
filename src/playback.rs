//! Playback: the timer-driven frame advance.
//!
//! The controller is a pure state machine — play state, speed, period —
//! with `tick()` as its only clock input, so tests drive it without
//! wall-clock waits. The async driver in `run()` is the one place a real
//! timer exists, and it owns the loop: pausing or resetting is observed
//! before the next tick, so no stray advance fires after a stop.

use std::time::Duration;

use tokio::time::sleep;

use crate::session::RaceSession;

/// Timer period at 1.0x speed.
pub const BASE_PERIOD_MS: u64 = 1500;

/// Speed slider bounds.
pub const MIN_SPEED: f64 = 0.2;
pub const MAX_SPEED: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Session plus playback state, the unit a dashboard instance owns.
#[derive(Debug)]
pub struct Playback {
    session: RaceSession,
    state: PlayState,
    speed: f64,
}

impl Playback {
    pub fn new(session: RaceSession) -> Self {
        Self { session, state: PlayState::Stopped, speed: 1.0 }
    }

    pub fn session(&self) -> &RaceSession {
        &self.session
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Tick period for the current speed. Applies from the next scheduled
    /// tick; an already-sleeping tick keeps its old period.
    pub fn period(&self) -> Duration {
        Duration::from_millis((BASE_PERIOD_MS as f64 / self.speed) as u64)
    }

    pub fn play(&mut self) {
        self.state = PlayState::Playing;
    }

    /// Idempotent.
    pub fn pause(&mut self) {
        self.state = PlayState::Stopped;
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            PlayState::Stopped => PlayState::Playing,
            PlayState::Playing => PlayState::Stopped,
        };
    }

    /// Clamped to the slider range.
    pub fn set_speed(&mut self, factor: f64) {
        self.speed = factor.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Stop, rewind to frame 0, and drop all frame-over-frame history.
    pub fn reset(&mut self) {
        self.state = PlayState::Stopped;
        self.session.reset();
    }

    /// Seek without changing play state.
    pub fn seek(&mut self, frame: usize) {
        self.session.seek(frame);
    }

    /// One scheduler tick: advance when playing, and hold-and-pause on the
    /// last frame instead of wrapping to the start.
    pub fn tick(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        self.session.advance();
        if self.session.current_frame() + 1 >= self.session.frame_count() {
            self.state = PlayState::Stopped;
        }
    }

    /// Drive the race to its end (or until something pauses it). Period is
    /// re-read every iteration so speed changes apply on the next tick.
    pub async fn run(&mut self) {
        while self.is_playing() {
            sleep(self.period()).await;
            self.tick();
        }
    }
}
