//! Frame-over-frame deltas: callouts, snapshots and improvement streaks.
//!
//! All comparisons run against the snapshot committed by the previous frame
//! transition. The snapshot is overwritten exactly once per transition —
//! never per read — so repeated reads of the same frame cannot collapse the
//! deltas to zero.

use std::collections::HashMap;

use serde::Serialize;

use crate::rank::RankedTeam;

/// Rank improvement threshold for the dark-horse callout.
const DARK_HORSE_JUMP: i64 = 3;

/// What the previous frame looked like. Empty until the first frame commits
/// and after a reset, which is exactly the "every delta is zero" state.
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    pub rankings: HashMap<String, usize>,
    pub scores: HashMap<String, i64>,
    /// Vulnerability totals, the signal the streak tracker compares. Score
    /// deltas are not a proxy for this; a team can gain score while gaining
    /// vulnerabilities.
    pub vulns: HashMap<String, u32>,
}

impl FrameSnapshot {
    pub fn capture(ranked: &[RankedTeam]) -> Self {
        let mut snap = Self::default();
        for row in ranked {
            snap.rankings.insert(row.team.clone(), row.position);
            snap.scores.insert(row.team.clone(), row.security_score);
            snap.vulns.insert(row.team.clone(), row.vuln_total_team);
        }
        snap
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }

    pub fn clear(&mut self) {
        self.rankings.clear();
        self.scores.clear();
        self.vulns.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub team: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DarkHorse {
    pub team: String,
    pub improvement: i64,
}

/// The three independent per-frame facts shown next to the chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Callouts {
    pub top_mover: Option<Mover>,
    pub slowest_mover: Option<Mover>,
    pub dark_horse: Option<DarkHorse>,
}

/// Compare the current ranked list against the previous snapshot.
///
/// Iteration is in rank order. Teams absent from the snapshot count as
/// zero-delta, so a first-seen team cannot be a mover. Tie-breaks are part
/// of the contract: top mover keeps the first team at the max (`>`), the
/// slowest mover keeps the last team at the min (`<=`), and at most one
/// dark horse is reported — the first team whose rank improved by
/// `DARK_HORSE_JUMP` or more.
pub fn compute_callouts(ranked: &[RankedTeam], prev: &FrameSnapshot) -> Callouts {
    let mut out = Callouts::default();
    let mut max_delta = i64::MIN;
    let mut min_delta = i64::MAX;

    for row in ranked {
        let prev_score = prev.scores.get(&row.team).copied().unwrap_or(row.security_score);
        let delta = row.security_score - prev_score;

        if delta > max_delta {
            max_delta = delta;
            out.top_mover = Some(Mover { team: row.team.clone(), delta });
        }
        if delta <= min_delta {
            min_delta = delta;
            out.slowest_mover = Some(Mover { team: row.team.clone(), delta });
        }

        let prev_rank = prev.rankings.get(&row.team).copied().unwrap_or(row.position);
        let improvement = prev_rank as i64 - row.position as i64;
        if improvement >= DARK_HORSE_JUMP && out.dark_horse.is_none() {
            out.dark_horse = Some(DarkHorse { team: row.team.clone(), improvement });
        }
    }

    out
}

/// Consecutive frames of strictly decreasing vulnerability totals, per team.
#[derive(Debug, Clone, Default)]
pub struct StreakState {
    counts: HashMap<String, u32>,
}

impl StreakState {
    pub fn get(&self, team: &str) -> u32 {
        self.counts.get(team).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// One pass per frame transition: decrease extends the streak, increase
    /// resets it, no change (including first sighting) leaves it alone.
    pub fn update(&mut self, ranked: &[RankedTeam], prev: &FrameSnapshot) {
        for row in ranked {
            let prev_vulns = prev.vulns.get(&row.team).copied().unwrap_or(row.vuln_total_team);
            if row.vuln_total_team < prev_vulns {
                *self.counts.entry(row.team.clone()).or_insert(0) += 1;
            } else if row.vuln_total_team > prev_vulns {
                self.counts.insert(row.team.clone(), 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team: &str, position: usize, score: i64, vulns: u32) -> RankedTeam {
        RankedTeam {
            team: team.to_string(),
            position,
            security_score: score,
            vuln_total_team: vulns,
        }
    }

    #[test]
    fn first_frame_has_all_zero_deltas() {
        let ranked = vec![row("Alpha", 1, 80, 3), row("Bravo", 2, 60, 9)];
        let callouts = compute_callouts(&ranked, &FrameSnapshot::default());
        // Every delta is zero; first team wins top mover, last wins slowest.
        assert_eq!(callouts.top_mover, Some(Mover { team: "Alpha".into(), delta: 0 }));
        assert_eq!(callouts.slowest_mover, Some(Mover { team: "Bravo".into(), delta: 0 }));
        assert_eq!(callouts.dark_horse, None);
    }

    #[test]
    fn top_mover_keeps_first_at_max() {
        let prev = FrameSnapshot::capture(&[row("Alpha", 1, 70, 3), row("Bravo", 2, 50, 9)]);
        let ranked = vec![row("Alpha", 1, 80, 3), row("Bravo", 2, 60, 9)];
        let callouts = compute_callouts(&ranked, &prev);
        // Both moved +10; Alpha is encountered first and keeps the title.
        assert_eq!(callouts.top_mover.unwrap().team, "Alpha");
    }

    #[test]
    fn slowest_mover_keeps_last_at_min() {
        let prev = FrameSnapshot::capture(&[row("Alpha", 1, 70, 3), row("Bravo", 2, 50, 9)]);
        let ranked = vec![row("Alpha", 1, 80, 3), row("Bravo", 2, 60, 9)];
        let callouts = compute_callouts(&ranked, &prev);
        // Ties fall through the <= comparison; the last team iterated wins.
        assert_eq!(callouts.slowest_mover.unwrap().team, "Bravo");
    }

    #[test]
    fn dark_horse_needs_three_positions_and_reports_once() {
        let prev = FrameSnapshot::capture(&[
            row("Alpha", 1, 80, 1),
            row("Bravo", 4, 60, 9),
            row("Charlie", 5, 55, 11),
        ]);
        let ranked = vec![
            row("Bravo", 1, 60, 2),
            row("Charlie", 2, 55, 3),
            row("Alpha", 3, 80, 8),
        ];
        let callouts = compute_callouts(&ranked, &prev);
        // Bravo improved 4-1=3, Charlie 5-2=3; Bravo iterates first.
        let dh = callouts.dark_horse.unwrap();
        assert_eq!(dh.team, "Bravo");
        assert_eq!(dh.improvement, 3);
    }

    #[test]
    fn new_team_cannot_be_a_mover() {
        let prev = FrameSnapshot::capture(&[row("Alpha", 1, 70, 3)]);
        let ranked = vec![row("Newbie", 1, 95, 1), row("Alpha", 2, 75, 3)];
        let callouts = compute_callouts(&ranked, &prev);
        // Newbie's delta defaults to zero; Alpha's +5 takes top mover.
        assert_eq!(callouts.top_mover.unwrap().team, "Alpha");
    }

    #[test]
    fn streaks_count_strict_decreases_only() {
        let mut streaks = StreakState::default();
        let f0 = vec![row("Alpha", 1, 80, 5)];
        streaks.update(&f0, &FrameSnapshot::default());
        assert_eq!(streaks.get("Alpha"), 0, "first sighting is not a decrease");

        let snap0 = FrameSnapshot::capture(&f0);
        let f1 = vec![row("Alpha", 1, 90, 3)];
        streaks.update(&f1, &snap0);
        assert_eq!(streaks.get("Alpha"), 1);

        let snap1 = FrameSnapshot::capture(&f1);
        let f2 = vec![row("Alpha", 1, 90, 3)];
        streaks.update(&f2, &snap1);
        assert_eq!(streaks.get("Alpha"), 1, "no change leaves streak untouched");

        let snap2 = FrameSnapshot::capture(&f2);
        let f3 = vec![row("Alpha", 1, 85, 7)];
        streaks.update(&f3, &snap2);
        assert_eq!(streaks.get("Alpha"), 0, "any increase resets to zero");
    }

    #[test]
    fn snapshot_clear_returns_to_empty() {
        let mut snap = FrameSnapshot::capture(&[row("Alpha", 1, 80, 3)]);
        assert!(!snap.is_empty());
        snap.clear();
        assert!(snap.is_empty());
    }
}
