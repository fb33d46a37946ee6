//! Main application state and control flow for the terminal player.
//!
//! The terminal stands in for a touch surface: left-button press, drag and
//! release become touch start, move and end. Only presses inside the
//! touch surface area start a touch; positions are taken relative to that
//! area, with each cell scaled to `CELL_WIDTH_PX` by `CELL_HEIGHT_PX`
//! pixels. Gestures and keyboard shortcuts both go through
//! the command dispatcher into a playback controller driving a clock-based
//! clip. The event loop sleeps until the next redraw or the next gesture
//! deadline, whichever comes first.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::cell::Cell;
use std::error::Error;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clipstep::config::Config;
use clipstep::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use clipstep::transport::{
    ClockMedia, CommandDispatcher, GestureRecognizer, KeyInput, PlaybackController,
    PlaybackSnapshot, TouchEvent, TouchPhase, key_command,
};

use super::goto_dialog::GotoDialog;
use super::ui;

const REDRAW_INTERVAL: Duration = Duration::from_millis(50);
const VOLUME_STEP: f64 = 0.1;

pub struct App {
    pub should_quit: bool,
    pub controller: PlaybackController<ClockMedia>,
    pub recognizer: GestureRecognizer,
    dispatcher: CommandDispatcher<Box<dyn FnMut()>>,
    favorite: Rc<Cell<bool>>,
    pub goto_dialog: Option<GotoDialog>,
    /// Last drawn touch surface, in terminal cells
    pub touch_surface: Rect,
    last_tick: Instant,
}

impl App {
    pub fn new(config: &Config, clip_duration: f64) -> Self {
        let mut media = ClockMedia::new(clip_duration);
        media.load();

        let favorite = Rc::new(Cell::new(false));
        let flag = Rc::clone(&favorite);
        let on_favorite: Box<dyn FnMut()> = Box::new(move || {
            flag.set(!flag.get());
            info!("Favorite {}", if flag.get() { "set" } else { "cleared" });
        });

        Self {
            should_quit: false,
            controller: PlaybackController::new(media, config.transport_settings()),
            recognizer: GestureRecognizer::new(config.gesture_settings()),
            dispatcher: CommandDispatcher::new(config.frames_per_tap, on_favorite),
            favorite,
            goto_dialog: None,
            touch_surface: Rect::default(),
            last_tick: Instant::now(),
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite.get()
    }

    pub fn surface_width(&self) -> f64 {
        self.touch_surface.width as f64 * CELL_WIDTH_PX
    }

    fn on_touch_surface(&self, column: u16, row: u16) -> bool {
        let area = self.touch_surface;
        column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.controller.state();
        PlaybackSnapshot {
            current_time: state.current_time,
            duration: state.duration,
        }
    }

    /// Advance the clip clock to `now`, reconcile media events and fire any
    /// gesture timers that have come due.
    pub fn tick(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = self.last_tick.max(now);

        self.controller.media_mut().advance(elapsed);
        while let Some(media_event) = self.controller.media_mut().poll_event() {
            self.controller.handle_media_event(media_event);
        }

        let snapshot = self.snapshot();
        if let Some(gesture) = self.recognizer.tick(now, snapshot) {
            self.dispatcher.dispatch(gesture, &mut self.controller);
        }
    }

    /// How long the event loop may block before something needs doing.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        match self.recognizer.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(REDRAW_INTERVAL),
            None => REDRAW_INTERVAL,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let mut phase = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => TouchPhase::Start,
            MouseEventKind::Drag(MouseButton::Left) => TouchPhase::Move,
            MouseEventKind::Up(MouseButton::Left) => TouchPhase::End,
            _ => return,
        };

        // The prompt is modal; only a touch already in flight gets to end
        if self.goto_dialog.is_some() {
            if phase != TouchPhase::End {
                return;
            }
            phase = TouchPhase::Cancel;
        }

        if phase == TouchPhase::Start && !self.on_touch_surface(mouse.column, mouse.row) {
            debug!(
                "Press at ({}, {}) outside touch surface, ignored",
                mouse.column, mouse.row
            );
            return;
        }

        self.tick(now);
        let area = self.touch_surface;
        let touch = TouchEvent {
            phase,
            x: (mouse.column as f64 - area.x as f64) * CELL_WIDTH_PX,
            y: (mouse.row as f64 - area.y as f64) * CELL_HEIGHT_PX,
            surface_width: self.surface_width(),
            at: now,
        };
        if let Some(gesture) = self.recognizer.handle(touch) {
            self.dispatcher.dispatch(gesture, &mut self.controller);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let text_entry_focused = self.goto_dialog.is_some();
        if let Some(command) = key_command(key_input(key.code), text_entry_focused) {
            self.dispatcher.dispatch_key(command, &mut self.controller);
            return;
        }

        if text_entry_focused {
            self.handle_goto_keys(key);
        } else {
            self.handle_player_keys(key);
        }
    }

    fn handle_player_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('[') => self.controller.set_loop_start_here(),
            KeyCode::Char(']') => self.controller.set_loop_end_here(),
            KeyCode::Char('x') => self.controller.clear_loop_region(),
            KeyCode::Char('l') => self.controller.toggle_looping(),
            KeyCode::Char('s') => self.controller.cycle_playback_rate(),
            KeyCode::Char('m') => self.controller.toggle_mute(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.controller.adjust_volume(VOLUME_STEP),
            KeyCode::Char('-') => self.controller.adjust_volume(-VOLUME_STEP),
            KeyCode::Char('g') => {
                let last_frame = self.controller.state().total_frames;
                self.goto_dialog = Some(GotoDialog::new(last_frame));
            }
            _ => {}
        }
    }

    fn handle_goto_keys(&mut self, key: KeyEvent) {
        let Some(dialog) = self.goto_dialog.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.goto_dialog = None,
            KeyCode::Backspace => dialog.pop_char(),
            KeyCode::Char(c) => dialog.push_char(c),
            KeyCode::Enter => {
                if let Some(frame) = dialog.target_frame() {
                    info!("Jumping to frame {frame}");
                    self.controller.seek_to_frame(frame);
                }
                self.goto_dialog = None;
            }
            _ => {}
        }
    }

    /// Cancel gesture timers and drop observers. Nothing fires afterwards.
    pub fn shutdown(&mut self) {
        self.recognizer.dispose();
        self.controller.detach();
    }
}

fn key_input(code: KeyCode) -> KeyInput {
    match code {
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        _ => KeyInput::Other,
    }
}

pub fn run_with_clip(config: &Config, clip_duration: f64) -> Result<(), Box<dyn Error>> {
    init_logging()?;
    info!(
        "Starting clipstep player: {clip_duration:.1}s clip at {} fps",
        config.frame_rate
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, clip_duration);
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        log::error!("Player exited with error: {e}");
        eprintln!("Error: {e}");
        return Err(e);
    }

    info!("Player closed");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|f| {
            app.touch_surface = ui::touch_surface_area(f.area());
            ui::draw(f, app);
        })?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    use simplelog::{CombinedLogger, LevelFilter, WriteLogger};
    use std::fs::File;

    let log_file = std::env::temp_dir().join("clipstep.log");
    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Debug,
        simplelog::Config::default(),
        File::create(log_file)?,
    )])?;

    Ok(())
}
