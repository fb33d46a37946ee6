use clipstep::config::Config;
use std::error::Error;

pub fn handle_play(duration: f64, fps: Option<f64>) -> Result<(), Box<dyn Error>> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(format!("Clip duration must be positive, got {duration}").into());
    }

    let mut config = Config::load()?;
    if let Some(fps) = fps {
        config.frame_rate = fps;
        config.validate()?;
    }

    #[cfg(feature = "player")]
    {
        crate::player::run(&config, duration)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = config;
        use owo_colors::OwoColorize;
        println!("{} {}", "🎬".cyan(), "Transport Player".bold());
        println!();
        println!(
            "{} The terminal player requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install clipstep --features player".cyan());
        println!();
        println!("Or if building from source:");
        println!("  {}", "cargo build --release --features player".cyan());
        println!();
        println!(
            "Touch scripts can still be replayed with {}",
            "clipstep simulate <script.json>".cyan()
        );

        Ok(())
    }
}
