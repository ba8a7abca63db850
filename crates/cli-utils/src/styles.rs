//! Cli styles for [clap].

use clap::builder::{
    Styles,
    styling::{AnsiColor, Color, Style},
};

/// Help output colours.
#[derive(Debug, Clone, Copy)]
pub struct CliStyles;

impl CliStyles {
    /// Returns the [`Styles`] used by the `evmbench` command.
    pub const fn init() -> Styles {
        Styles::styled()
            .usage(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
            .header(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
            .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
            .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
            .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
            .valid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Green))))
            .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
    }
}
