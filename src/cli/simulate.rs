use clipstep::config::Config;
use clipstep::transport::format_timecode;
use clipstep::transport::script::{ScriptReport, TouchScript, run_script};
use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;

pub fn handle_simulate(script_path: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let path = Path::new(script_path);
    if !path.exists() {
        return Err(format!("Script does not exist: {}", path.display()).into());
    }

    let config = Config::load()?;
    let script = TouchScript::load(path)
        .map_err(|e| format!("Failed to read touch script {}: {e}", path.display()))?;

    let report = run_script(
        &script,
        config.gesture_settings(),
        config.transport_settings(),
        config.frames_per_tap,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, config.frame_rate, script.events.len());
    }

    Ok(())
}

fn print_report(report: &ScriptReport, frame_rate: f64, touch_count: usize) {
    println!(
        "{} {} touch events → {} gestures",
        "▶".cyan(),
        touch_count.to_string().bold(),
        report.gestures.len().to_string().cyan().bold()
    );

    if report.gestures.is_empty() {
        println!("{} No gestures recognized", "⚠".yellow());
    }

    for recorded in &report.gestures {
        println!(
            "  {:>6}ms  {}",
            recorded.at_ms.to_string().dimmed(),
            recorded.gesture.green()
        );
    }

    let state = &report.final_state;
    println!("\n{}", "Final state:".yellow().bold());
    println!(
        "  position: {} (frame {}/{})",
        format_timecode(state.current_time, frame_rate).cyan(),
        state.current_frame,
        state.total_frames
    );
    println!(
        "  playing: {}  rate: {}x  volume: {:.2}{}",
        state.is_playing,
        state.playback_rate,
        state.volume,
        if state.is_muted { " (muted)" } else { "" }
    );
    if report.favorites > 0 {
        println!("  favorites toggled: {}", report.favorites.to_string().yellow());
    }
}
