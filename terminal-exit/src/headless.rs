//! Headless mode for TERMINAL.EXIT.
//!
//! This module provides a plain text interface for running the game without
//! a TUI. It's designed for scripted play and automated testing.
//!
//! The protocol is line-oriented:
//! - Prompts end with a space and are flushed before input is read
//! - Tagged lines (`[GOOD]`, `[BAD]`, `[WARN]`, `[ENEMY]`, `[STRIKE]`) carry game events
//! - The strike minigame asks for a target position instead of reacting to
//!   timing; the sweep fires when the cursor reaches it

use crate::ui::faces;
use log::warn;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use terminal_exit_core::{Console, GameSession, HitClass, Mood, StrikeBar, Tone};

/// Run the game in headless mode on stdin/stdout.
pub fn run_headless(session: &mut GameSession) {
    println!("=== TERMINAL.EXIT Headless Mode ===");
    println!("Move with north/south/east/west, pick options by number.");
    println!("In combat, strikes ask for a target position on the bar.");
    println!();

    let stdin = io::stdin();
    let mut console = HeadlessConsole::new(stdin.lock(), io::stdout());
    session.run(&mut console);
}

/// A console over any reader and writer.
pub struct HeadlessConsole<R, W> {
    input: R,
    output: W,
    target: Option<u32>,
    cursor: u32,
}

impl<R: BufRead, W: Write> HeadlessConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            target: None,
            cursor: 0,
        }
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{text}") {
            warn!("Error writing output: {e}");
        }
    }

    fn next_line(&mut self, prompt: &str) -> Option<String> {
        let prompted = write!(self.output, "{prompt} ").and_then(|()| self.output.flush());
        if let Err(e) = prompted {
            warn!("Error writing prompt: {e}");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!("Error reading input: {e}");
                None
            }
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

fn tone_tag(tone: Tone) -> &'static str {
    match tone {
        Tone::Info | Tone::Companion => "",
        Tone::Good => "[GOOD] ",
        Tone::Bad => "[BAD] ",
        Tone::Warn => "[WARN] ",
        Tone::Enemy => "[ENEMY] ",
    }
}

impl<R: BufRead, W: Write> Console for HeadlessConsole<R, W> {
    fn show_face(&mut self, mood: Mood) {
        for row in faces::face(mood) {
            self.emit(row.trim_end());
        }
    }

    fn show_box(&mut self, title: &str, lines: &[String], _tone: Tone) {
        self.emit(&format!("=== {title} ==="));
        for line in lines {
            self.emit(&format!("  {line}"));
        }
    }

    fn show_bar(&mut self, label: &str, current: i32, max: i32, tone: Tone) {
        self.emit(&format!("{}{label}: {current}/{max}", tone_tag(tone)));
    }

    fn say(&mut self, text: &str, tone: Tone) {
        self.emit(&format!("{}{text}", tone_tag(tone)));
    }

    fn render_strike(&mut self, bar: &StrikeBar) {
        self.cursor = bar.cursor();
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.next_line(prompt)
    }

    fn poll_strike(&mut self, _timeout: Duration) -> bool {
        self.target == Some(self.cursor)
    }

    fn begin_strike(&mut self, bar: &StrikeBar) {
        self.emit(&format!("[STRIKE] {}", bar.render_text()));
        let last = bar.width().saturating_sub(1);
        let prompt = format!("Target position (0-{last}):");
        self.target = loop {
            let Some(line) = self.next_line(&prompt) else {
                break None;
            };
            match line.trim().parse::<u32>() {
                Ok(pos) if pos <= last => break Some(pos),
                _ => self.emit(&format!("[WARN] Enter a number from 0 to {last}.")),
            }
        };
    }

    fn end_strike(&mut self, result: HitClass) {
        self.target = None;
        self.emit(&format!("[STRIKE] {result:?} at {}", self.cursor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminal_exit_core::{GameConfig, StrikeConfig};

    fn console(input: &str) -> HeadlessConsole<&[u8], Vec<u8>> {
        HeadlessConsole::new(input.as_bytes(), Vec::new())
    }

    fn text(console: HeadlessConsole<&[u8], Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_read_line_and_eof() {
        let mut c = console("north\r\n");
        assert_eq!(c.read_line(">").as_deref(), Some("north"));
        assert_eq!(c.read_line(">"), None);
        assert!(text(c).starts_with("> "));
    }

    #[test]
    fn test_tagged_output() {
        let mut c = console("");
        c.say("You took 5 damage!", Tone::Bad);
        c.show_bar("Player HP", 95, 100, Tone::Good);
        c.show_box("ITEMS", &["1. Health Potion".to_string()], Tone::Info);
        let out = text(c);
        assert!(out.contains("[BAD] You took 5 damage!"));
        assert!(out.contains("[GOOD] Player HP: 95/100"));
        assert!(out.contains("=== ITEMS ===\n  1. Health Potion"));
    }

    #[test]
    fn test_strike_fires_at_target() {
        let config = StrikeConfig::default().with_base_start(10, 10);
        let mut bar = StrikeBar::new(&config, &[], &mut terminal_exit_core::RngRoller::seeded(1));
        let mut c = console("abc\n99\n12\n");
        assert_eq!(bar.run(&mut c, &config), HitClass::Base);
        let out = text(c);
        assert!(out.contains("Enter a number from 0 to 29."));
        assert!(out.contains("[STRIKE] Base at 12"));
    }

    #[test]
    fn test_strike_without_input_misses() {
        let config = GameConfig::default().strike.with_max_ticks(50);
        let mut bar = StrikeBar::new(&config, &[], &mut terminal_exit_core::RngRoller::seeded(1));
        let mut c = console("");
        assert_eq!(bar.run(&mut c, &config), HitClass::Miss);
    }
}
