use std::rc::Rc;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};

use clipstep::transport::{PlayerState, TapZone, format_timecode};

use super::app::App;
use super::goto_dialog::GotoDialog;

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    draw_main_ui(f, app);

    if let Some(ref dialog) = app.goto_dialog {
        draw_goto_dialog(f, size, dialog);
    }
}

fn main_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Transport info
            Constraint::Length(3), // Progress bar
            Constraint::Min(5),    // Touch surface
            Constraint::Length(4), // Controls (two rows)
        ])
        .split(area)
}

/// Screen area that accepts mouse input as touches.
pub fn touch_surface_area(area: Rect) -> Rect {
    main_layout(area)[3]
}

fn draw_main_ui(f: &mut Frame, app: &App) {
    let chunks = main_layout(f.area());

    let mut title = vec![Span::styled(
        "🎬 clipstep",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if app.is_favorite() {
        title.push(Span::styled("  ★", Style::default().fg(Color::Yellow)));
    }
    let title = Paragraph::new(Line::from(title)).alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    draw_transport_info(f, chunks[1], app);
    draw_progress_with_marks(f, chunks[2], app);
    draw_touch_surface(f, chunks[3], app);
    draw_controls(f, chunks[4], app);
}

fn draw_transport_info(f: &mut Frame, area: Rect, app: &App) {
    let state = app.controller.state();
    let fps = app.controller.settings().frame_rate;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(28)])
        .split(area);

    let mut info = vec![
        Span::styled(
            if state.is_playing { "▶ " } else { "⏸ " },
            Style::default().fg(if state.is_playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::raw(format!(
            "{} / {}",
            format_timecode(state.current_time, fps),
            format_timecode(state.duration, fps)
        )),
        Span::styled(
            format!("  frame {}/{}", state.current_frame, state.total_frames),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.recognizer.is_scrubbing() {
        info.push(Span::styled(
            format!("  scrub {:+.2}s", app.recognizer.touch_state().scrub_delta),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(info)), chunks[0]);

    f.render_widget(
        Paragraph::new(Line::from(audio_spans(state))).alignment(Alignment::Right),
        chunks[1],
    );

    let border = Block::default().borders(Borders::BOTTOM);
    f.render_widget(border, area);
}

fn audio_spans(state: &PlayerState) -> Vec<Span<'static>> {
    let volume = if state.is_muted {
        Span::styled("muted", Style::default().fg(Color::Red))
    } else {
        Span::raw(format!("vol {:>3.0}%", state.volume * 100.0))
    };
    vec![
        Span::styled(
            format!("{}x", state.playback_rate),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        volume,
    ]
}

fn draw_progress_with_marks(f: &mut Frame, area: Rect, app: &App) {
    let state = app.controller.state();
    let progress_percent = (state.progress() * 100.0) as u16;

    let label_style = if progress_percent >= 50 {
        Style::default()
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut label = format!("{progress_percent}%");
    if let Some(length) = state.loop_length() {
        label.push_str(&format!(" [loop {length:.2}s]"));
    }

    let progress_widget = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(progress_percent.min(100))
        .label(Span::styled(label, label_style));
    f.render_widget(progress_widget, area);

    if state.duration <= 0.0 {
        return;
    }

    let inner_area = area.inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });
    let bar_width = inner_area.width;

    for (mark, color) in [
        (state.loop_start, Color::Green),
        (state.loop_end, Color::Red),
    ] {
        let Some(mark) = mark else { continue };
        let offset = ((mark / state.duration) * bar_width as f64) as u16;
        if offset < bar_width {
            let marker = Paragraph::new("┃").style(
                Style::default()
                    .fg(if state.is_looping { Color::Magenta } else { color })
                    .add_modifier(Modifier::BOLD),
            );
            let marker_area = Rect {
                x: inner_area.x + offset,
                y: inner_area.y,
                width: 1,
                height: 1,
            };
            f.render_widget(marker, marker_area);
        }
    }
}

/// Three columns mirroring the tap zones, flashing the last zone tapped.
fn draw_touch_surface(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    let flashed = if app.recognizer.show_tap_feedback() {
        app.recognizer.last_tap_zone()
    } else {
        None
    };

    let center_label = if app.controller.state().is_playing {
        "⏸ pause"
    } else {
        "▶ play"
    };
    for (idx, (zone, label)) in [
        (TapZone::Left, "◀◀ back"),
        (TapZone::Center, center_label),
        (TapZone::Right, "fwd ▶▶"),
    ]
    .into_iter()
    .enumerate()
    {
        let style = if flashed == Some(zone) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let pane = Paragraph::new(label)
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(pane, chunks[idx]);
    }
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let state = app.controller.state();

    let control_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let controls_row1 = vec![
        if state.is_playing {
            Span::styled("[space]", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("[space]", Style::default().fg(Color::Green))
        },
        Span::raw(if state.is_playing {
            " pause  "
        } else {
            " play  "
        }),
        Span::styled("[,.←→]", Style::default().fg(Color::Magenta)),
        Span::raw(" step  "),
        Span::styled("[g]", Style::default().fg(Color::Blue)),
        Span::raw(" go to frame  "),
        Span::styled("[q]", Style::default().fg(Color::Red)),
        Span::raw(" quit"),
    ];

    let controls_row2 = vec![
        Span::styled("[[]", Style::default().fg(Color::Green)),
        Span::raw(" in  "),
        Span::styled("[]]", Style::default().fg(Color::Green)),
        Span::raw(" out  "),
        Span::styled("[x]", Style::default().fg(Color::Yellow)),
        Span::raw(" clear  "),
        if state.is_looping {
            Span::styled(
                "[l]",
                Style::default().fg(Color::Magenta).bg(Color::DarkGray),
            )
        } else {
            Span::styled("[l]", Style::default().fg(Color::Magenta))
        },
        Span::raw(if state.is_looping {
            " loop ●  "
        } else {
            " loop  "
        }),
        Span::styled("[s]", Style::default().fg(Color::Cyan)),
        Span::raw(" speed  "),
        Span::styled("[m+-]", Style::default().fg(Color::Cyan)),
        Span::raw(" volume"),
    ];

    let controls_widget1 = Paragraph::new(Line::from(controls_row1)).alignment(Alignment::Center);
    let controls_widget2 = Paragraph::new(Line::from(controls_row2)).alignment(Alignment::Center);

    // Add top border only on first row
    let border_widget = Block::default().borders(Borders::TOP);
    f.render_widget(border_widget, area);

    f.render_widget(controls_widget1, control_chunks[0]);
    f.render_widget(controls_widget2, control_chunks[1]);
}

fn draw_goto_dialog(f: &mut Frame, area: Rect, dialog: &GotoDialog) {
    // Create a centered modal
    let modal_width = 40.min(area.width.saturating_sub(4));
    let modal_height = 5.min(area.height.saturating_sub(4));

    let modal_area = Rect {
        x: (area.width - modal_width) / 2,
        y: (area.height - modal_height) / 2,
        width: modal_width,
        height: modal_height,
    };

    f.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Go To Frame ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let lines = vec![
        Line::from(vec![
            Span::raw("Frame: "),
            Span::styled(
                format!("{}█", dialog.input),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("  (0-{})", dialog.max_frame),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled("[enter]", Style::default().fg(Color::Green)),
            Span::raw(" jump  "),
            Span::styled("[esc]", Style::default().fg(Color::Red)),
            Span::raw(" cancel"),
        ]),
    ];

    let body = Paragraph::new(lines).block(block);
    f.render_widget(body, modal_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstep::config::Config;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_draws_timecode_and_frames() {
        let mut app = App::new(&Config::default(), 60.0);
        app.controller.seek(61.5 / 2.0);
        let screen = render(&app);
        assert!(screen.contains("00:30:18 / 01:00:00"));
        assert!(screen.contains("frame 738/1440"));
    }

    #[test]
    fn test_touch_surface_sits_below_progress() {
        let area = touch_surface_area(Rect::new(0, 0, 100, 24));
        assert_eq!(area, Rect::new(1, 9, 98, 10));
    }

    #[test]
    fn test_draws_goto_dialog() {
        let mut app = App::new(&Config::default(), 60.0);
        app.goto_dialog = Some(GotoDialog::new(1440));
        let screen = render(&app);
        assert!(screen.contains("Go To Frame"));
    }

    #[test]
    fn test_audio_spans_show_mute() {
        let state = PlayerState {
            is_muted: true,
            ..Default::default()
        };
        let text: String = audio_spans(&state)
            .iter()
            .map(|span| span.content.to_string())
            .collect();
        assert!(text.contains("muted"));
        assert!(text.starts_with("1x"));
    }
}
