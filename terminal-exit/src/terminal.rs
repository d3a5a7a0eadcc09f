//! Interactive terminal console.
//!
//! Output scrolls like a normal terminal: boxes, gauges and text are inserted
//! above a small inline viewport. The viewport holds the input prompt and,
//! during a strike, the live bar. Raw mode is only on while a strike sweep
//! runs, so ordinary line input keeps the terminal's own editing.

use crate::ui::{faces, theme::GameTheme};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::warn;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap};
use ratatui::{Terminal, TerminalOptions, Viewport};
use std::io::{self, BufRead, Stdout};
use std::time::{Duration, Instant};
use terminal_exit_core::{Console, GameSession, HitClass, Mood, StrikeBar, Tone};

const VIEWPORT_HEIGHT: u16 = 3;

/// Play a session in the terminal.
pub fn run_terminal(session: &mut GameSession) -> anyhow::Result<()> {
    let mut console = TerminalConsole::new()?;
    session.run(&mut console);
    console.finish()?;
    Ok(())
}

pub struct TerminalConsole {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: GameTheme,
    raw: bool,
    cancelled: bool,
    last_bar: Option<Line<'static>>,
}

impl TerminalConsole {
    pub fn new() -> io::Result<Self> {
        let terminal = Terminal::with_options(
            CrosstermBackend::new(io::stdout()),
            TerminalOptions {
                viewport: Viewport::Inline(VIEWPORT_HEIGHT),
            },
        )?;
        Ok(Self {
            terminal,
            theme: GameTheme::default(),
            raw: false,
            cancelled: false,
            last_bar: None,
        })
    }

    /// Leave the terminal the way we found it.
    pub fn finish(&mut self) -> io::Result<()> {
        self.set_raw(false)?;
        self.terminal.clear()
    }

    fn set_raw(&mut self, on: bool) -> io::Result<()> {
        if on != self.raw {
            if on {
                enable_raw_mode()?;
            } else {
                disable_raw_mode()?;
            }
            self.raw = on;
        }
        Ok(())
    }

    fn width(&self) -> u16 {
        self.terminal.size().map(|size| size.width).unwrap_or(80).max(1)
    }

    /// Insert a widget of the given height above the viewport.
    fn insert<W: Widget>(&mut self, height: u16, widget: W) {
        let result = self.terminal.insert_before(height, |buf: &mut Buffer| {
            let area = buf.area;
            widget.render(area, buf);
        });
        if let Err(e) = result {
            warn!("Failed to draw to terminal: {e}");
        }
    }

    fn insert_line(&mut self, line: Line<'static>) {
        let width = usize::from(self.width());
        let rows = line.width().div_ceil(width).max(1);
        let height = u16::try_from(rows).unwrap_or(u16::MAX);
        self.insert(height, Paragraph::new(line).wrap(Wrap { trim: false }));
    }

    fn strike_line(&self, bar: &StrikeBar) -> Line<'static> {
        let cells: Vec<Span<'static>> = (0..bar.width())
            .map(|pos| {
                let is_cursor = pos == bar.cursor();
                let glyph = if is_cursor {
                    "|"
                } else {
                    match bar.zone_at(pos) {
                        Some(_) => "█",
                        None => "─",
                    }
                };
                Span::styled(glyph, self.theme.zone_style(bar.zone_at(pos), is_cursor))
            })
            .collect();
        let mut spans = vec![Span::raw("  [")];
        spans.extend(cells);
        spans.push(Span::raw("]"));
        Line::from(spans)
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        if self.raw {
            let _ = disable_raw_mode();
        }
    }
}

impl Console for TerminalConsole {
    fn show_face(&mut self, mood: Mood) {
        let art = faces::face(mood);
        let lines: Vec<Line<'static>> = art.iter().map(|row| Line::from(*row)).collect();
        let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));
        let face = Paragraph::new(lines)
            .style(self.theme.tone_style(Tone::Companion))
            .block(block);
        self.insert(height, FixedWidth::new(face, 24));
    }

    fn show_box(&mut self, title: &str, lines: &[String], tone: Tone) {
        let body: Vec<Line<'static>> = lines.iter().map(|l| Line::from(l.clone())).collect();
        let height = u16::try_from(body.len() + 2).unwrap_or(u16::MAX);
        let block = Block::default()
            .title(Span::styled(format!(" {title} "), self.theme.title_style(tone)))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(tone != Tone::Info));
        let widget = Paragraph::new(body).block(block);
        self.insert(height, FixedWidth::new(widget, 60));
    }

    fn show_bar(&mut self, label: &str, current: i32, max: i32, tone: Tone) {
        let ratio = if max > 0 {
            (f64::from(current) / f64::from(max)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(self.theme.hp_color(ratio)))
            .label(Span::styled(
                format!("{label}: {current}/{max}"),
                self.theme.tone_style(tone),
            ))
            .ratio(ratio);
        self.insert(1, FixedWidth::new(gauge, 40));
    }

    fn say(&mut self, text: &str, tone: Tone) {
        let line = Line::from(Span::styled(text.to_string(), self.theme.tone_style(tone)));
        self.insert_line(line);
    }

    fn render_strike(&mut self, bar: &StrikeBar) {
        let line = self.strike_line(bar);
        let hint = Line::from(Span::styled(
            "  ENTER or SPACE to strike, ESC to give up",
            self.theme.tone_style(Tone::Warn),
        ));
        self.last_bar = Some(line.clone());
        let result = self.terminal.draw(|frame| {
            frame.render_widget(Paragraph::new(vec![line, hint]), frame.area());
        });
        if let Err(e) = result {
            warn!("Failed to draw strike bar: {e}");
        }
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = self.set_raw(false) {
            warn!("Failed to leave raw mode: {e}");
        }
        let prompt_line = format!("{prompt} ");
        let column = u16::try_from(prompt_line.chars().count()).unwrap_or(0);
        let style = self.theme.tone_style(Tone::Companion);
        let drawn = self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Paragraph::new(Span::styled(prompt_line, style)), area);
            frame.set_cursor_position((area.x + column, area.y));
        });
        if let Err(e) = drawn {
            warn!("Failed to draw prompt: {e}");
        }

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input);
        if let Err(e) = self.terminal.clear() {
            warn!("Failed to clear prompt: {e}");
        }
        match read {
            Ok(0) => None,
            Ok(_) => {
                let input = input.trim_end_matches(['\r', '\n']).to_string();
                self.say(&format!("{prompt} {input}"), Tone::Info);
                Some(input)
            }
            Err(e) => {
                warn!("Error reading input: {e}");
                None
            }
        }
    }

    fn poll_strike(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match event::poll(remaining) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => match strike_key(&key) {
                        StrikeKey::Fire => return true,
                        StrikeKey::Cancel => {
                            self.cancelled = true;
                            return false;
                        }
                        StrikeKey::Ignore => {}
                    },
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Error reading key: {e}");
                        return false;
                    }
                },
                Ok(false) => return false,
                Err(e) => {
                    warn!("Error polling input: {e}");
                    return false;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
        }
    }

    fn strike_cancelled(&self) -> bool {
        self.cancelled
    }

    fn begin_strike(&mut self, _bar: &StrikeBar) {
        self.last_bar = None;
        self.cancelled = false;
        if let Err(e) = self.set_raw(true) {
            warn!("Failed to enter raw mode: {e}");
        }
    }

    fn end_strike(&mut self, _result: HitClass) {
        if let Err(e) = self.set_raw(false) {
            warn!("Failed to leave raw mode: {e}");
        }
        if let Err(e) = self.terminal.clear() {
            warn!("Failed to clear strike bar: {e}");
        }
        if let Some(line) = self.last_bar.take() {
            self.insert_line(line);
        }
    }
}

/// What a key press means during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrikeKey {
    Fire,
    Cancel,
    Ignore,
}

/// Raw mode swallows the interrupt signal, so Ctrl-C arrives as a key.
fn strike_key(key: &KeyEvent) -> StrikeKey {
    if key.kind != KeyEventKind::Press {
        return StrikeKey::Ignore;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => StrikeKey::Fire,
        KeyCode::Esc => StrikeKey::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => StrikeKey::Cancel,
        _ => StrikeKey::Ignore,
    }
}

/// Renders a widget no wider than `max_width` columns.
struct FixedWidth<W> {
    inner: W,
    max_width: u16,
}

impl<W> FixedWidth<W> {
    fn new(inner: W, max_width: u16) -> Self {
        Self { inner, max_width }
    }
}

impl<W: Widget> Widget for FixedWidth<W> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = Rect {
            width: area.width.min(self.max_width),
            ..area
        };
        self.inner.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_strike_keys() {
        assert_eq!(strike_key(&press(KeyCode::Enter, KeyModifiers::NONE)), StrikeKey::Fire);
        assert_eq!(strike_key(&press(KeyCode::Char(' '), KeyModifiers::NONE)), StrikeKey::Fire);
        assert_eq!(strike_key(&press(KeyCode::Esc, KeyModifiers::NONE)), StrikeKey::Cancel);
        assert_eq!(
            strike_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            StrikeKey::Cancel
        );
        assert_eq!(strike_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)), StrikeKey::Ignore);
        assert_eq!(strike_key(&press(KeyCode::Char('x'), KeyModifiers::NONE)), StrikeKey::Ignore);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut key = press(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(strike_key(&key), StrikeKey::Ignore);
    }

    #[test]
    fn test_fixed_width_clips_area() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 1));
        FixedWidth::new(Paragraph::new("abcdefghij"), 4).render(buf.area, &mut buf);
        assert_eq!(buf[(3, 0)].symbol(), "d");
        assert_eq!(buf[(4, 0)].symbol(), " ");
    }
}
