use clipstep::config::Config;
use std::error::Error;

pub fn handle_init() -> Result<(), Box<dyn Error>> {
    // Check if already initialized
    if Config::exists()? {
        return Err(
            "clipstep is already initialized. Use 'clipstep config set <key> <value>' to change settings."
                .into(),
        );
    }

    let config = Config::new();
    config.save()?;

    println!("clipstep initialized successfully!");
    println!(
        "Frame rate: {} fps, {} frames per tap",
        config.frame_rate, config.frames_per_tap
    );
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );

    Ok(())
}
