//! Ranking and the display geometry derived from it.

use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::TeamAggregate;

/// How many teams the bar chart shows. Ranking itself is never truncated.
pub const DISPLAY_TOP_N: usize = 10;

/// One row of the ranked leaderboard. Light view over the aggregate map;
/// project-level detail stays in the map.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTeam {
    pub team: String,
    /// 1-based. Fewer vulnerabilities ranks higher.
    pub position: usize,
    pub security_score: i64,
    pub vuln_total_team: u32,
}

/// Sort all teams by vulnerability total ascending, ties broken by team id
/// ascending for determinism, and assign 1-based positions.
pub fn rank(teams: &IndexMap<String, TeamAggregate>) -> Vec<RankedTeam> {
    let mut rows: Vec<RankedTeam> = teams
        .iter()
        .map(|(team, agg)| RankedTeam {
            team: team.clone(),
            position: 0,
            security_score: agg.security_score,
            vuln_total_team: agg.vuln_total_team,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.vuln_total_team
            .cmp(&b.vuln_total_team)
            .then_with(|| a.team.cmp(&b.team))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx + 1;
    }
    rows
}

/// Display slice of the leaderboard.
pub fn top(ranked: &[RankedTeam], n: usize) -> &[RankedTeam] {
    &ranked[..ranked.len().min(n)]
}

/// Bar-width scale. Computed over ALL teams, not the displayed slice, so the
/// scale stays stable when a team drops out of the top N.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BarScale {
    pub max_vulns: u32,
    pub min_vulns: u32,
}

impl BarScale {
    pub fn from_ranked(ranked: &[RankedTeam]) -> Self {
        let max_vulns = ranked.iter().map(|r| r.vuln_total_team).max().unwrap_or(0);
        let min_vulns = ranked.iter().map(|r| r.vuln_total_team).min().unwrap_or(0);
        Self { max_vulns, min_vulns }
    }

    /// Bar width as a percentage of the chart, floored at 5% so a clean
    /// team still renders a visible bar.
    pub fn width_pct(&self, vulns: u32) -> f64 {
        if self.max_vulns == 0 {
            return 5.0;
        }
        (vulns as f64 / self.max_vulns as f64 * 100.0).max(5.0)
    }

    /// True for the team(s) carrying the most vulnerabilities.
    pub fn is_worst(&self, vulns: u32) -> bool {
        self.max_vulns > 0 && vulns == self.max_vulns
    }
}

/// Qualitative read of a team's vulnerability load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMood {
    Excellent,
    Good,
    Moderate,
    Strained,
    Critical,
}

impl TeamMood {
    pub fn classify(vuln_total: u32) -> Self {
        match vuln_total {
            0..=20 => TeamMood::Excellent,
            21..=35 => TeamMood::Good,
            36..=50 => TeamMood::Moderate,
            51..=70 => TeamMood::Strained,
            _ => TeamMood::Critical,
        }
    }
}
