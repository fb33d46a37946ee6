pub mod app;
pub mod goto_dialog;
pub mod ui;

use std::error::Error;

use clipstep::config::Config;

pub fn run(config: &Config, clip_duration: f64) -> Result<(), Box<dyn Error>> {
    app::run_with_clip(config, clip_duration)
}
