//! Smoke tests: end-to-end validation against the bundled dataset.
//!
//! These run the full aggregate/rank/callout pipeline over data/metrics.json
//! and check the invariants that unit tests only cover on tiny fixtures.

use std::path::Path;

use secrace::aggregate::aggregate;
use secrace::dataset::{analyze_file, file_sha256, Dataset};
use secrace::playback::Playback;
use secrace::rank::rank;
use secrace::session::RaceSession;

const DATASET: &str = "data/metrics.json";

fn load() -> Option<Dataset> {
    if !Path::new(DATASET).exists() {
        eprintln!("SKIP: {} not found", DATASET);
        return None;
    }
    Some(Dataset::load(Path::new(DATASET)).expect("bundled dataset must load"))
}

// ---------------------------------------------------------------------------
// S01: dataset loads and the frame index is sorted and distinct
// ---------------------------------------------------------------------------
#[test]
fn s01_frame_index_sorted_distinct() {
    let Some(ds) = load() else { return };
    assert!(ds.frame_count() > 1, "need multiple frames for a race");
    for pair in ds.dates().windows(2) {
        assert!(pair[0] < pair[1], "dates out of order: {:?}", pair);
    }
}

// ---------------------------------------------------------------------------
// S02: severity counts are conserved through aggregation on every date
// ---------------------------------------------------------------------------
#[test]
fn s02_aggregation_conserves_counts() {
    let Some(ds) = load() else { return };
    for date in ds.dates() {
        let teams = aggregate(&ds, date);
        let team_total: u64 = teams.values().map(|t| t.vuln_total_team as u64).sum();
        let record_total: u64 = ds
            .records_for_date(date)
            .map(|r| r.severity_total() as u64)
            .sum();
        assert_eq!(team_total, record_total, "count leak on {}", date);

        for (name, agg) in &teams {
            let project_sum: u32 = agg.projects.iter().map(|p| p.severity_total()).sum();
            assert_eq!(project_sum, agg.vuln_total_team, "{} on {}", name, date);
        }
    }
}

// ---------------------------------------------------------------------------
// S03: ranking is a total order on every frame
// ---------------------------------------------------------------------------
#[test]
fn s03_ranking_is_total_order() {
    let Some(ds) = load() else { return };
    for date in ds.dates() {
        let ranked = rank(&aggregate(&ds, date));
        for (idx, row) in ranked.iter().enumerate() {
            assert_eq!(row.position, idx + 1, "positions must be dense and 1-based");
        }
        for pair in ranked.windows(2) {
            let ordered = pair[0].vuln_total_team < pair[1].vuln_total_team
                || (pair[0].vuln_total_team == pair[1].vuln_total_team
                    && pair[0].team < pair[1].team);
            assert!(ordered, "rank order violated on {}: {:?}", date, pair);
        }
    }
}

// ---------------------------------------------------------------------------
// S04: full playthrough is deterministic
// ---------------------------------------------------------------------------
#[test]
fn s04_deterministic_playthrough() {
    let Some(ds) = load() else { return };
    let run = |ds: Dataset| {
        let mut s = RaceSession::new(ds);
        let mut trace = Vec::new();
        loop {
            trace.push((
                s.current_date().to_string(),
                s.ranked_teams().iter().map(|r| r.team.clone()).collect::<Vec<_>>(),
                s.callouts().clone(),
                s.achievements().to_vec(),
            ));
            if !s.advance() {
                break;
            }
        }
        trace
    };
    assert_eq!(run(ds.clone()), run(ds), "two playthroughs diverged");
}

// ---------------------------------------------------------------------------
// S05: seek to any frame matches advancing to it step by step
// ---------------------------------------------------------------------------
#[test]
fn s05_seek_matches_final_frame_state() {
    let Some(ds) = load() else { return };
    let last = ds.last_frame();

    let mut stepped = RaceSession::new(ds.clone());
    while stepped.advance() {}

    let mut seeked = RaceSession::new(ds);
    seeked.seek(last);

    // The committed frame view depends only on the dataset and the frame,
    // not on the path taken; history-dependent state (streaks) differs.
    assert_eq!(stepped.current_date(), seeked.current_date());
    let a: Vec<_> = stepped.ranked_teams().iter().map(|r| (&r.team, r.vuln_total_team)).collect();
    let b: Vec<_> = seeked.ranked_teams().iter().map(|r| (&r.team, r.vuln_total_team)).collect();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// S06: reset produces the no-history state
// ---------------------------------------------------------------------------
#[test]
fn s06_reset_clears_all_history() {
    let Some(ds) = load() else { return };
    let teams: Vec<String> = rank(&aggregate(&ds, &ds.dates()[0].clone()))
        .iter()
        .map(|r| r.team.clone())
        .collect();

    let mut s = RaceSession::new(ds);
    while s.advance() {}
    s.reset();

    assert_eq!(s.current_frame(), 0);
    assert_eq!(s.callouts().top_mover.as_ref().map(|m| m.delta), Some(0));
    assert_eq!(s.callouts().dark_horse, None);
    for team in &teams {
        assert_eq!(s.streak(team), 0, "{} kept a streak across reset", team);
    }
}

// ---------------------------------------------------------------------------
// S07: playback ticks to the end and auto-pauses, never wrapping
// ---------------------------------------------------------------------------
#[test]
fn s07_playback_holds_at_last_frame() {
    let Some(ds) = load() else { return };
    let last = ds.last_frame();
    let mut p = Playback::new(RaceSession::new(ds));
    p.play();
    for _ in 0..(last + 10) {
        p.tick();
    }
    assert_eq!(p.session().current_frame(), last);
    assert!(!p.is_playing(), "playback must pause at the end");
}

// ---------------------------------------------------------------------------
// S08: manifest analysis passes clean on the bundled dataset
// ---------------------------------------------------------------------------
#[test]
fn s08_bundled_dataset_is_clean() {
    if !Path::new(DATASET).exists() {
        eprintln!("SKIP: {} not found", DATASET);
        return;
    }
    let (manifest, report) = analyze_file(Path::new(DATASET), 0).expect("analysis must succeed");
    assert_eq!(report.duplicate_keys, 0, "{:?}", report.warnings);
    assert_eq!(report.scores_out_of_range, 0, "{:?}", report.warnings);
    assert_eq!(report.unparsable_dates, 0, "{:?}", report.warnings);
    assert_eq!(manifest.record_count, report.records);
    assert_eq!(manifest.hash_sha256.len(), 64);

    let h1 = file_sha256(Path::new(DATASET)).unwrap();
    let h2 = file_sha256(Path::new(DATASET)).unwrap();
    assert_eq!(h1, h2, "hash must be reproducible");
}

// ---------------------------------------------------------------------------
// S09: streaks only grow on strict decreases across a real playthrough
// ---------------------------------------------------------------------------
#[test]
fn s09_streaks_track_decreases() {
    let Some(ds) = load() else { return };
    let mut s = RaceSession::new(ds);
    let mut prev_vulns: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    let mut prev_streaks: std::collections::HashMap<String, u32> = std::collections::HashMap::new();

    loop {
        for row in s.ranked_teams() {
            let streak = s.streak(&row.team);
            if let (Some(&pv), Some(&ps)) =
                (prev_vulns.get(&row.team), prev_streaks.get(&row.team))
            {
                if row.vuln_total_team < pv {
                    assert_eq!(streak, ps + 1, "{} decrease must extend streak", row.team);
                } else if row.vuln_total_team > pv {
                    assert_eq!(streak, 0, "{} increase must reset streak", row.team);
                } else {
                    assert_eq!(streak, ps, "{} no-change must keep streak", row.team);
                }
            }
            prev_vulns.insert(row.team.clone(), row.vuln_total_team);
            prev_streaks.insert(row.team.clone(), streak);
        }
        if !s.advance() {
            break;
        }
    }
}
