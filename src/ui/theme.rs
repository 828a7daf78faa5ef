//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::config::ThemeChoice;
use crate::surface::{Rgb, Tone};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Plain table values.
    pub text: Color,
    /// Table labels.
    pub label: Color,
    /// Successful request counts and closed breakers.
    pub success: Color,
    pub short_circuited: Color,
    pub bad_request: Color,
    pub timeout: Color,
    pub rejected: Color,
    /// Failures and open breakers.
    pub failure: Color,
    /// Sparkline bars.
    pub sparkline: Color,
    /// Style for the tile title.
    pub title: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Style for the help overlay heading.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Whether black should be drawn as the terminal foreground.
    invert_black: bool,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            border: Color::Gray,
            text: Color::White,
            label: Color::Gray,
            success: Color::Green,
            short_circuited: Color::Blue,
            bad_request: Color::LightCyan,
            timeout: Color::Rgb(0xFF, 0x99, 0x00),
            rejected: Color::Magenta,
            failure: Color::Red,
            sparkline: Color::LightBlue,
            title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
            invert_black: true,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            border: Color::DarkGray,
            text: Color::Black,
            label: Color::DarkGray,
            success: Color::Green,
            short_circuited: Color::Blue,
            bad_request: Color::Cyan,
            timeout: Color::Rgb(0xFF, 0x99, 0x00),
            rejected: Color::Magenta,
            failure: Color::Red,
            sparkline: Color::Blue,
            title: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
            invert_black: false,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Build the theme named in the settings.
    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Auto => Self::auto_detect(),
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
        }
    }

    /// Terminal colour for a surface colour.
    ///
    /// Black is unreadable on a dark background, so it follows the text colour.
    pub fn rgb(&self, rgb: Rgb) -> Color {
        if rgb == Rgb::BLACK && self.invert_black {
            return self.text;
        }
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }

    /// Style for a table value of the given tone.
    pub fn tone_style(&self, tone: Tone) -> Style {
        let color = match tone {
            Tone::Plain => self.text,
            Tone::Success | Tone::Closed => self.success,
            Tone::ShortCircuited => self.short_circuited,
            Tone::BadRequest => self.bad_request,
            Tone::Timeout => self.timeout,
            Tone::Rejected => self.rejected,
            Tone::Failure => self.failure,
            Tone::Open => return Style::default().fg(self.failure).add_modifier(Modifier::BOLD),
            Tone::Custom(rgb) => self.rgb(rgb),
        };
        Style::default().fg(color)
    }
}
