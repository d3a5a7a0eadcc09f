//! Color theme and styling for the terminal front end

use ratatui::style::{Color, Modifier, Style};
use terminal_exit_core::{Tone, ZoneKind};

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // HP colors
    pub hp_healthy: Color,
    pub hp_wounded: Color,
    pub hp_critical: Color,

    // Text colors
    pub good_text: Color,
    pub bad_text: Color,
    pub warn_text: Color,
    pub companion_text: Color,
    pub enemy_text: Color,

    // Strike bar colors
    pub zone_empty: Color,
    pub zone_base: Color,
    pub zone_bonus: Color,
    pub cursor: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            hp_healthy: Color::Green,
            hp_wounded: Color::Yellow,
            hp_critical: Color::Red,

            good_text: Color::LightGreen,
            bad_text: Color::LightRed,
            warn_text: Color::Yellow,
            companion_text: Color::Cyan,
            enemy_text: Color::Magenta,

            zone_empty: Color::DarkGray,
            zone_base: Color::Green,
            zone_bonus: Color::Yellow,
            cursor: Color::White,
        }
    }
}

impl GameTheme {
    /// Get style for a line of output
    pub fn tone_style(&self, tone: Tone) -> Style {
        match tone {
            Tone::Info => Style::default().fg(self.foreground),
            Tone::Good => Style::default()
                .fg(self.good_text)
                .add_modifier(Modifier::BOLD),
            Tone::Bad => Style::default()
                .fg(self.bad_text)
                .add_modifier(Modifier::BOLD),
            Tone::Warn => Style::default().fg(self.warn_text),
            Tone::Companion => Style::default()
                .fg(self.companion_text)
                .add_modifier(Modifier::ITALIC),
            Tone::Enemy => Style::default().fg(self.enemy_text),
        }
    }

    /// Get HP bar color based on ratio
    pub fn hp_color(&self, ratio: f64) -> Color {
        if ratio > 0.5 {
            self.hp_healthy
        } else if ratio > 0.25 {
            self.hp_wounded
        } else {
            self.hp_critical
        }
    }

    /// Get style for one cell of the strike bar
    pub fn zone_style(&self, zone: Option<ZoneKind>, is_cursor: bool) -> Style {
        if is_cursor {
            return Style::default()
                .fg(self.cursor)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let color = match zone {
            Some(ZoneKind::Base) => self.zone_base,
            Some(ZoneKind::Bonus) => self.zone_bonus,
            None => self.zone_empty,
        };
        Style::default().fg(color)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get title style
    pub fn title_style(&self, tone: Tone) -> Style {
        self.tone_style(tone).add_modifier(Modifier::BOLD)
    }
}
