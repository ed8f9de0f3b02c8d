//! Per-date team aggregation.
//!
//! One `TeamAggregate` per team per frame, recomputed fresh each time and
//! discarded after the frame is committed. The map preserves first-appearance
//! order of teams in the filtered dataset; downstream tie-breaks depend on
//! stable iteration order, so this is an `IndexMap`, not a `HashMap`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::MetricRecord;

/// Per-team rollup of all project records for a single date.
#[derive(Debug, Clone, Serialize)]
pub struct TeamAggregate {
    /// Rounded arithmetic mean of project scores.
    pub security_score: i64,
    /// Sum of the four severity totals. The externally supplied
    /// `vuln_total_team` field is never copied here; exports have shipped
    /// values that disagree with their own severity counts.
    pub vuln_total_team: u32,
    pub total_critical: u32,
    pub total_high: u32,
    pub total_medium: u32,
    pub total_low: u32,
    /// Contributing project records, in dataset order.
    pub projects: Vec<MetricRecord>,
}

/// Group records for `date` by team and roll up severity sums and the
/// average score. A team exists in the output iff at least one record was
/// folded into it, so the mean is always over a non-empty set.
pub fn aggregate(dataset: &Dataset, date: &str) -> IndexMap<String, TeamAggregate> {
    let mut teams: IndexMap<String, TeamAggregate> = IndexMap::new();

    for rec in dataset.records_for_date(date) {
        let agg = teams
            .entry(rec.team.clone())
            .or_insert_with(|| TeamAggregate {
                security_score: 0,
                vuln_total_team: 0,
                total_critical: 0,
                total_high: 0,
                total_medium: 0,
                total_low: 0,
                projects: Vec::new(),
            });
        agg.total_critical += rec.critical_count;
        agg.total_high += rec.high_count;
        agg.total_medium += rec.medium_count;
        agg.total_low += rec.low_count;
        agg.projects.push(rec.clone());
    }

    for agg in teams.values_mut() {
        let sum: f64 = agg.projects.iter().map(|p| p.security_score).sum();
        // Round half away from zero, matching f64::round.
        agg.security_score = (sum / agg.projects.len() as f64).round() as i64;
        agg.vuln_total_team =
            agg.total_critical + agg.total_high + agg.total_medium + agg.total_low;
    }

    teams
}
