//! Shared UI theme constants.

use ratatui::style::Color;

// Series colours
pub const LATENCY: Color = Color::Rgb(207, 123, 39);
pub const DOWNLOAD: Color = Color::Rgb(50, 101, 168);
pub const UPLOAD: Color = Color::Rgb(50, 168, 82);
pub const POWER: Color = Color::Rgb(168, 50, 145);
pub const OBSTRUCTION: Color = Color::Rgb(237, 82, 74);

pub const AXIS: Color = Color::Rgb(170, 170, 180);
pub const ALERT: Color = Color::Red;
pub const OK: Color = Color::Green;
