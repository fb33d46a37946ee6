use clipstep::config::Config;
use std::error::Error;
use std::path::Path;
use std::process::Command;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current clipstep configuration:");
    println!("  frame_rate: {}", config.frame_rate);
    println!("  playback_speeds: {:?}", config.playback_speeds);
    println!("  frames_per_tap: {}", config.frames_per_tap);
    println!("  scrub_sensitivity: {}", config.scrub_sensitivity);
    println!("  edge_safe_zone_px: {}", config.edge_safe_zone_px);
    println!("  min_drag_distance_px: {}", config.min_drag_distance_px);
    println!("  long_press_ms: {}", config.long_press_ms);
    println!("  tap_max_ms: {}", config.tap_max_ms);
    println!("  double_tap_ms: {}", config.double_tap_ms);
    println!("  tap_feedback_ms: {}", config.tap_feedback_ms);

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}

pub fn handle_config_edit() -> Result<(), Box<dyn Error>> {
    if !Config::exists()? {
        return Err("clipstep not initialized. Run 'clipstep init' first.".into());
    }

    let config_path = Config::config_path()?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    println!("Editing {} with {}", config_path.display(), editor);

    let status = Command::new(&editor).arg(&config_path).status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            format!("Editor '{editor}' not found. Set $EDITOR to a valid editor path.")
        } else {
            format!("Failed to launch editor '{editor}': {e}")
        }
    })?;
    if !status.success() {
        return Err(format!("Editor '{editor}' exited with {status}").into());
    }

    let config = check_edited(&config_path)?;
    println!(
        "Configuration saved: {} fps, {} playback speeds, {}ms long press",
        config.frame_rate,
        config.playback_speeds.len(),
        config.long_press_ms
    );

    Ok(())
}

/// Re-read an edited config file, naming the file and the offending key on
/// failure so the user knows what to fix.
fn check_edited(path: &Path) -> Result<Config, String> {
    Config::load_from(path).map_err(|e| format!("Invalid configuration in {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_edited_accepts_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "frame_rate = 30.0\nplayback_speeds = [1.0, 2.0]\n").unwrap();

        let config = check_edited(&path).unwrap();
        assert_eq!(config.frame_rate, 30.0);
        assert_eq!(config.playback_speeds, vec![1.0, 2.0]);
    }

    #[test]
    fn test_check_edited_names_bad_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "scrub_sensitivity = 0.0\n").unwrap();

        let err = check_edited(&path).unwrap_err();
        assert!(err.contains("scrub_sensitivity must be positive"));
        assert!(err.contains(&path.display().to_string()));
    }

    #[test]
    fn test_check_edited_reports_syntax_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "frame_rate = \n").unwrap();

        let err = check_edited(&path).unwrap_err();
        assert!(err.starts_with("Invalid configuration in"));
    }
}
