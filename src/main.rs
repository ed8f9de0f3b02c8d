use std::path::Path;
use std::process::ExitCode;

use tokio::time::sleep;

use secrace::config::Config;
use secrace::dataset::Dataset;
use secrace::logging::{self, log, obj, v_num, v_str, Domain, Level};
use secrace::playback::Playback;
use secrace::rank::TeamMood;
use secrace::session::RaceSession;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("config", serde_json::to_value(&cfg).unwrap_or_default())]),
    );

    let dataset = match Dataset::load(Path::new(&cfg.dataset_path)) {
        Ok(ds) => ds,
        Err(err) => {
            eprintln!("no data to race: {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    logging::log_dataset_loaded(&cfg.dataset_path, dataset.records().len(), dataset.frame_count());

    let mut playback = Playback::new(RaceSession::new(dataset));
    playback.set_speed(cfg.speed);

    render(playback.session());
    if !cfg.autoplay {
        return ExitCode::SUCCESS;
    }

    playback.play();
    logging::log_playback("play", playback.session().current_frame(), playback.speed());
    while playback.is_playing() {
        sleep(playback.period()).await;
        playback.tick();
        render(playback.session());
    }
    logging::log_playback("finished", playback.session().current_frame(), playback.speed());

    ExitCode::SUCCESS
}

/// One frame of the race, rendered as text bars.
fn render(session: &RaceSession) {
    let (at, total, _) = session.progress();
    println!("\n== {}  (checkpoint {} of {}) ==", session.current_date(), at, total);

    let scale = session.bar_scale();
    for row in session.top_teams() {
        let width = scale.width_pct(row.vuln_total_team);
        let bar = "#".repeat((width / 2.0).round() as usize);
        let mood = session
            .mood(&row.team)
            .unwrap_or(TeamMood::Excellent);
        let streak = session.streak(&row.team);
        let streak_tag = if streak > 0 { format!("  streak {}", streak) } else { String::new() };
        println!(
            "{:>2}. {:<16} {:<50} {:>3} vulns  score {:>3}  [{:?}]{}",
            row.position, row.team, bar, row.vuln_total_team, row.security_score, mood, streak_tag
        );
    }

    let callouts = session.callouts();
    if let Some(m) = &callouts.top_mover {
        println!("  top mover:     {} ({:+})", m.team, m.delta);
    }
    if let Some(m) = &callouts.slowest_mover {
        println!("  slowest mover: {} ({:+})", m.team, m.delta);
    }
    if let Some(dh) = &callouts.dark_horse {
        println!("  dark horse:    {} (up {} places)", dh.team, dh.improvement);
    }
    for a in session.achievements() {
        println!("  achievement:   {} -> {:?}", a.team(), a);
    }

    logging::log_frame(
        session.current_frame(),
        session.current_date(),
        session.ranked_teams().first().map(|r| r.team.as_str()),
    );
    logging::log_callouts(session.current_frame(), callouts);
    if let Some(leader) = session.ranked_teams().first() {
        log(
            Level::Debug,
            Domain::Frame,
            "leader",
            obj(&[
                ("team", v_str(&leader.team)),
                ("vulns", v_num(leader.vuln_total_team as f64)),
            ]),
        );
    }
}
