//! Raw metric records as they appear in the input JSON.

use serde::{Deserialize, Serialize};

/// One project's vulnerability snapshot on one date.
///
/// `medium_count` and `low_count` are absent in older exports and default
/// to zero. `vuln_total_team` is carried by some exports but can diverge
/// from the severity sums; aggregation ignores it and recomputes the team
/// total from the four severity counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub date: String,
    pub team: String,
    pub project: String,
    pub security_score: f64,
    pub critical_count: u32,
    pub high_count: u32,
    #[serde(default)]
    pub medium_count: u32,
    #[serde(default)]
    pub low_count: u32,
    /// Display-only per-project total, when the export provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vuln_total_project: Option<u32>,
    /// Externally supplied team total. Untrusted; see aggregate.rs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vuln_total_team: Option<u32>,
}

impl MetricRecord {
    /// Sum of the four severity counts for this single project.
    pub fn severity_total(&self) -> u32 {
        self.critical_count + self.high_count + self.medium_count + self.low_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_medium_and_low_default_to_zero() {
        let json = r#"{
            "date": "2024-01-01",
            "team": "Alpha",
            "project": "api-gateway",
            "security_score": 80.0,
            "critical_count": 2,
            "high_count": 3
        }"#;
        let rec: MetricRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.medium_count, 0);
        assert_eq!(rec.low_count, 0);
        assert_eq!(rec.vuln_total_project, None);
        assert_eq!(rec.severity_total(), 5);
    }

    #[test]
    fn external_team_total_is_preserved_but_optional() {
        let json = r#"{
            "date": "2024-01-01",
            "team": "Alpha",
            "project": "api-gateway",
            "security_score": 80.0,
            "critical_count": 1,
            "high_count": 0,
            "medium_count": 2,
            "low_count": 4,
            "vuln_total_team": 99
        }"#;
        let rec: MetricRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.vuln_total_team, Some(99));
        // The severity sum disagrees with the supplied total; callers
        // must use the computed value.
        assert_eq!(rec.severity_total(), 7);
    }
}
