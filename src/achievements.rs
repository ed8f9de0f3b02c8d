//! Per-frame achievement detection.
//!
//! Pure derivation over the committed frame and the previous snapshot; the
//! session collects these once per transition and hands them to whatever
//! wants to celebrate. Nothing here renders, beeps, or throws confetti.

use serde::Serialize;

use crate::callout::{FrameSnapshot, StreakState};
use crate::rank::RankedTeam;

/// Vulnerability thresholds that count as milestones when crossed downward.
const MILESTONES: [u32; 4] = [70, 50, 35, 20];

/// A streak long enough to celebrate.
const HOT_STREAK_LEN: u32 = 3;

/// Rank jump that counts as a comeback.
const COMEBACK_JUMP: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Achievement {
    /// Zero vulnerabilities, newly so.
    PerfectSecurity { team: String },
    /// Vulnerability total dropped from above a threshold to at or below
    /// it. Inclusive on the landing side, like the mood bands.
    Milestone { team: String, below: u32 },
    /// Rank improved by three or more positions.
    Comeback { team: String, positions: i64 },
    /// Third consecutive frame of decreasing vulnerabilities.
    HotStreak { team: String, length: u32 },
    /// Took first place from another team.
    FirstPlace { team: String },
}

impl Achievement {
    pub fn team(&self) -> &str {
        match self {
            Achievement::PerfectSecurity { team }
            | Achievement::Milestone { team, .. }
            | Achievement::Comeback { team, .. }
            | Achievement::HotStreak { team, .. }
            | Achievement::FirstPlace { team } => team,
        }
    }
}

/// Detect achievements for the frame described by `ranked`, relative to the
/// previous snapshot. `streaks` must already reflect this frame's update.
pub fn detect(
    ranked: &[RankedTeam],
    prev: &FrameSnapshot,
    streaks: &StreakState,
) -> Vec<Achievement> {
    let mut found = Vec::new();

    for row in ranked {
        let prev_vulns = prev.vulns.get(&row.team).copied();

        if row.vuln_total_team == 0 && prev_vulns != Some(0) {
            found.push(Achievement::PerfectSecurity { team: row.team.clone() });
        }

        // Milestones need a known previous value; the previous total must be
        // strictly above the threshold so hovering at one fires nothing, but
        // landing exactly on it counts.
        if let Some(pv) = prev_vulns {
            if let Some(&below) = MILESTONES
                .iter()
                .filter(|&&t| pv > t && row.vuln_total_team <= t)
                .min()
            {
                found.push(Achievement::Milestone { team: row.team.clone(), below });
            }
        }

        let prev_rank = prev.rankings.get(&row.team).copied().unwrap_or(row.position);
        let improvement = prev_rank as i64 - row.position as i64;
        if improvement >= COMEBACK_JUMP {
            found.push(Achievement::Comeback {
                team: row.team.clone(),
                positions: improvement,
            });
        }

        if streaks.get(&row.team) == HOT_STREAK_LEN {
            found.push(Achievement::HotStreak {
                team: row.team.clone(),
                length: HOT_STREAK_LEN,
            });
        }

        // No first-place handover exists on the very first frame.
        if row.position == 1
            && !prev.is_empty()
            && prev.rankings.get(&row.team).copied() != Some(1)
        {
            found.push(Achievement::FirstPlace { team: row.team.clone() });
        }
    }

    found
}
