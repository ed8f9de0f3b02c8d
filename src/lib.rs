//! secrace: a racing leaderboard engine for security metrics.
//!
//! The pipeline is frame-oriented: a dataset of per-project vulnerability
//! records becomes a sorted date index, each date aggregates into per-team
//! totals, teams rank by vulnerability count, and frame-over-frame deltas
//! drive callouts, streaks and achievements. Playback advances frames on a
//! speed-scaled timer.

pub mod achievements;
pub mod aggregate;
pub mod callout;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod playback;
pub mod rank;
pub mod record;
pub mod session;
