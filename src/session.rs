//! The race session: single owner of all mutable frame state.
//!
//! Everything the dashboard mutates — current frame, previous-frame
//! snapshot, streak counters — lives here, behind one owner, so two
//! sessions (or a test and a binary) can never interfere. A frame
//! transition runs the full aggregate → rank → callouts → streaks →
//! achievements → snapshot-commit sequence atomically; reads between
//! transitions are pure.

use indexmap::IndexMap;

use crate::achievements::{self, Achievement};
use crate::aggregate::{aggregate, TeamAggregate};
use crate::callout::{compute_callouts, Callouts, FrameSnapshot, StreakState};
use crate::dataset::Dataset;
use crate::rank::{rank, top, BarScale, RankedTeam, TeamMood, DISPLAY_TOP_N};

/// Everything computed for the committed frame. Reads are served from this;
/// nothing is recomputed until the next transition.
#[derive(Debug, Clone)]
struct FrameView {
    date: String,
    teams: IndexMap<String, TeamAggregate>,
    ranked: Vec<RankedTeam>,
    scale: BarScale,
    callouts: Callouts,
    achievements: Vec<Achievement>,
}

#[derive(Debug)]
pub struct RaceSession {
    dataset: Dataset,
    frame: usize,
    prev: FrameSnapshot,
    streaks: StreakState,
    view: FrameView,
}

impl RaceSession {
    /// Build a session and commit frame 0. The dataset was validated
    /// non-empty at load, so frame 0 always exists.
    pub fn new(dataset: Dataset) -> Self {
        let mut session = Self {
            dataset,
            frame: 0,
            prev: FrameSnapshot::default(),
            streaks: StreakState::default(),
            view: FrameView {
                date: String::new(),
                teams: IndexMap::new(),
                ranked: Vec::new(),
                scale: BarScale { max_vulns: 0, min_vulns: 0 },
                callouts: Callouts::default(),
                achievements: Vec::new(),
            },
        };
        session.commit(0);
        session
    }

    /// Process and commit one frame. Runs exactly once per transition —
    /// re-reading the committed view never touches the snapshot, so deltas
    /// survive repeated renders of the same frame.
    fn commit(&mut self, frame: usize) {
        let frame = self.dataset.clamp_frame(frame);
        let date = self
            .dataset
            .date_for(frame)
            .expect("clamped frame is always in range")
            .to_string();

        let teams = aggregate(&self.dataset, &date);
        let ranked = rank(&teams);
        let scale = BarScale::from_ranked(&ranked);
        let callouts = compute_callouts(&ranked, &self.prev);
        self.streaks.update(&ranked, &self.prev);
        let achievements = achievements::detect(&ranked, &self.prev, &self.streaks);

        self.prev = FrameSnapshot::capture(&ranked);
        self.frame = frame;
        self.view = FrameView { date, teams, ranked, scale, callouts, achievements };
    }

    /// Advance one frame, clamped at the end. Returns false when already on
    /// the last frame (the caller's cue to auto-pause).
    pub fn advance(&mut self) -> bool {
        if self.frame >= self.dataset.last_frame() {
            return false;
        }
        self.commit(self.frame + 1);
        true
    }

    /// Jump to an arbitrary frame; out-of-range values clamp. Seeking is a
    /// frame transition like any other and commits a snapshot.
    pub fn seek(&mut self, frame: usize) {
        self.commit(frame);
    }

    /// Back to frame 0 with no history: the next frame's deltas are all
    /// zero and every streak restarts.
    pub fn reset(&mut self) {
        self.prev.clear();
        self.streaks.clear();
        self.commit(0);
    }

    // --- read API -----------------------------------------------------

    pub fn frame_count(&self) -> usize {
        self.dataset.frame_count()
    }

    pub fn current_frame(&self) -> usize {
        self.frame
    }

    pub fn current_date(&self) -> &str {
        &self.view.date
    }

    /// (1-based checkpoint, total, completed fraction).
    pub fn progress(&self) -> (usize, usize, f64) {
        let total = self.frame_count();
        (self.frame + 1, total, (self.frame + 1) as f64 / total as f64)
    }

    /// Full ranked leaderboard for the committed frame.
    pub fn ranked_teams(&self) -> &[RankedTeam] {
        &self.view.ranked
    }

    /// Display slice of the leaderboard.
    pub fn top_teams(&self) -> &[RankedTeam] {
        top(&self.view.ranked, DISPLAY_TOP_N)
    }

    /// Project-level breakdown for one team. `None` when the team has no
    /// records on the current date; a stale selection is recoverable, not
    /// an error.
    pub fn team_detail(&self, team: &str) -> Option<&TeamAggregate> {
        self.view.teams.get(team)
    }

    pub fn callouts(&self) -> &Callouts {
        &self.view.callouts
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.view.achievements
    }

    pub fn streak(&self, team: &str) -> u32 {
        self.streaks.get(team)
    }

    pub fn bar_scale(&self) -> BarScale {
        self.view.scale
    }

    pub fn mood(&self, team: &str) -> Option<TeamMood> {
        self.view
            .teams
            .get(team)
            .map(|agg| TeamMood::classify(agg.vuln_total_team))
    }
}
