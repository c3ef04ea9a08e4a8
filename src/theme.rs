use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::analysis::TokenKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub ui: UiColors,
    pub syntax: SyntaxColors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiColors {
    pub background: ThemeColor,
    pub foreground: ThemeColor,
    pub border: ThemeColor,
    pub title: ThemeColor,
    pub line_numbers: ThemeColor,
    pub line_numbers_current: ThemeColor,

    // Cursor line and cursor cell differ per mode
    pub cursor_line_normal: ThemeColor,
    pub cursor_line_insert: ThemeColor,
    pub cursor_normal: ThemeColor,
    pub cursor_insert: ThemeColor,
    pub cursor_fg: ThemeColor,

    // Footer
    pub status_bar_bg: ThemeColor,
    pub status_bar_fg: ThemeColor,
    pub mode_normal_bg: ThemeColor,
    pub mode_normal_fg: ThemeColor,
    pub mode_insert_bg: ThemeColor,
    pub mode_insert_fg: ThemeColor,
    pub stale: ThemeColor,

    // Output pane
    pub output_stdout: ThemeColor,
    pub output_stderr: ThemeColor,
    pub output_error: ThemeColor,
    pub output_info: ThemeColor,

    pub diagnostic_error: ThemeColor,
    pub diagnostic_warning: ThemeColor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxColors {
    pub keyword: ThemeColor,     // const, function, return, true, null
    pub type_kw: ThemeColor,     // number, string, boolean, any
    pub identifier: ThemeColor,
    pub function: ThemeColor,    // identifier followed by `(`
    pub punctuation: ThemeColor, // operators and brackets
    pub number: ThemeColor,
    pub string: ThemeColor,
    pub template: ThemeColor,
    pub regex: ThemeColor,
    pub comment: ThemeColor,
    pub unknown: ThemeColor,
}

impl SyntaxColors {
    pub fn color_for(&self, kind: TokenKind) -> &ThemeColor {
        match kind {
            TokenKind::Keyword => &self.keyword,
            TokenKind::TypeKeyword => &self.type_kw,
            TokenKind::Punctuation => &self.punctuation,
            TokenKind::Number => &self.number,
            TokenKind::String => &self.string,
            TokenKind::Template => &self.template,
            TokenKind::Regex => &self.regex,
            TokenKind::Comment => &self.comment,
            TokenKind::Unknown => &self.unknown,
            TokenKind::Identifier | TokenKind::Whitespace | TokenKind::NewLine => {
                &self.identifier
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    Rgb { r: u8, g: u8, b: u8 },
    Named(String),
}

impl ThemeColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    pub fn to_color(&self) -> Color {
        match self {
            ThemeColor::Rgb { r, g, b } => Color::Rgb(*r, *g, *b),
            ThemeColor::Named(name) => match name.to_lowercase().as_str() {
                "black" => Color::Black,
                "red" => Color::Red,
                "green" => Color::Green,
                "yellow" => Color::Yellow,
                "blue" => Color::Blue,
                "magenta" => Color::Magenta,
                "cyan" => Color::Cyan,
                "white" => Color::White,
                "gray" | "grey" => Color::Gray,
                "darkgray" | "darkgrey" => Color::DarkGray,
                "reset" => Color::Reset,
                _ => parse_hex(name).unwrap_or(Color::White),
            },
        }
    }
}

/// `#RRGGBB`
fn parse_hex(name: &str) -> Option<Color> {
    let hex = name.strip_prefix('#').filter(|h| h.len() == 6)?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: String::from("dark"),
            ui: UiColors {
                background: ThemeColor::rgb(30, 30, 30),
                foreground: ThemeColor::rgb(212, 212, 212),
                border: ThemeColor::rgb(60, 60, 60),
                title: ThemeColor::rgb(100, 149, 237),
                line_numbers: ThemeColor::rgb(90, 90, 90),
                line_numbers_current: ThemeColor::rgb(200, 200, 200),

                cursor_line_normal: ThemeColor::rgb(40, 40, 40),
                cursor_line_insert: ThemeColor::rgb(28, 44, 40),
                cursor_normal: ThemeColor::rgb(86, 156, 214),
                cursor_insert: ThemeColor::rgb(78, 201, 176),
                cursor_fg: ThemeColor::rgb(30, 30, 30),

                status_bar_bg: ThemeColor::rgb(25, 25, 25),
                status_bar_fg: ThemeColor::rgb(150, 150, 150),
                mode_normal_bg: ThemeColor::rgb(86, 156, 214),
                mode_normal_fg: ThemeColor::rgb(30, 30, 30),
                mode_insert_bg: ThemeColor::rgb(78, 201, 176),
                mode_insert_fg: ThemeColor::rgb(30, 30, 30),
                stale: ThemeColor::rgb(214, 157, 86),

                output_stdout: ThemeColor::rgb(212, 212, 212),
                output_stderr: ThemeColor::rgb(244, 135, 113),
                output_error: ThemeColor::rgb(244, 71, 71),
                output_info: ThemeColor::rgb(86, 156, 214),

                diagnostic_error: ThemeColor::rgb(244, 71, 71),
                diagnostic_warning: ThemeColor::rgb(229, 192, 123),
            },
            syntax: SyntaxColors {
                keyword: ThemeColor::rgb(86, 156, 214),     // Blue
                type_kw: ThemeColor::rgb(78, 201, 176),     // Teal
                identifier: ThemeColor::rgb(156, 220, 254), // Light blue
                function: ThemeColor::rgb(220, 220, 170),   // Yellow
                punctuation: ThemeColor::rgb(212, 212, 212),
                number: ThemeColor::rgb(181, 206, 168),     // Light green
                string: ThemeColor::rgb(206, 145, 120),     // Orange/brown
                template: ThemeColor::rgb(206, 145, 120),
                regex: ThemeColor::rgb(209, 105, 105),
                comment: ThemeColor::rgb(106, 153, 85),     // Green
                unknown: ThemeColor::rgb(244, 71, 71),
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: String::from("light"),
            ui: UiColors {
                background: ThemeColor::rgb(255, 255, 255),
                foreground: ThemeColor::rgb(30, 30, 30),
                border: ThemeColor::rgb(200, 200, 200),
                title: ThemeColor::rgb(0, 122, 204),
                line_numbers: ThemeColor::rgb(150, 150, 150),
                line_numbers_current: ThemeColor::rgb(30, 30, 30),

                cursor_line_normal: ThemeColor::rgb(240, 240, 240),
                cursor_line_insert: ThemeColor::rgb(232, 246, 236),
                cursor_normal: ThemeColor::rgb(0, 122, 204),
                cursor_insert: ThemeColor::rgb(22, 163, 74),
                cursor_fg: ThemeColor::rgb(255, 255, 255),

                status_bar_bg: ThemeColor::rgb(240, 240, 240),
                status_bar_fg: ThemeColor::rgb(80, 80, 80),
                mode_normal_bg: ThemeColor::rgb(0, 122, 204),
                mode_normal_fg: ThemeColor::rgb(255, 255, 255),
                mode_insert_bg: ThemeColor::rgb(22, 163, 74),
                mode_insert_fg: ThemeColor::rgb(255, 255, 255),
                stale: ThemeColor::rgb(234, 88, 12),

                output_stdout: ThemeColor::rgb(30, 30, 30),
                output_stderr: ThemeColor::rgb(220, 38, 38),
                output_error: ThemeColor::rgb(185, 28, 28),
                output_info: ThemeColor::rgb(0, 122, 204),

                diagnostic_error: ThemeColor::rgb(220, 38, 38),
                diagnostic_warning: ThemeColor::rgb(180, 140, 0),
            },
            syntax: SyntaxColors {
                keyword: ThemeColor::rgb(0, 0, 255),       // Blue
                type_kw: ThemeColor::rgb(38, 127, 153),    // Teal
                identifier: ThemeColor::rgb(0, 16, 128),
                function: ThemeColor::rgb(121, 94, 38),    // Brown
                punctuation: ThemeColor::rgb(30, 30, 30),
                number: ThemeColor::rgb(9, 134, 88),       // Green
                string: ThemeColor::rgb(163, 21, 21),      // Red/brown
                template: ThemeColor::rgb(163, 21, 21),
                regex: ThemeColor::rgb(129, 31, 63),
                comment: ThemeColor::rgb(0, 128, 0),       // Green
                unknown: ThemeColor::rgb(220, 38, 38),
            },
        }
    }

    pub fn gruvbox() -> Self {
        Self {
            name: String::from("gruvbox"),
            ui: UiColors {
                background: ThemeColor::rgb(40, 40, 40),
                foreground: ThemeColor::rgb(235, 219, 178),
                border: ThemeColor::rgb(80, 73, 69),
                title: ThemeColor::rgb(215, 153, 33),
                line_numbers: ThemeColor::rgb(124, 111, 100),
                line_numbers_current: ThemeColor::rgb(250, 189, 47),

                cursor_line_normal: ThemeColor::rgb(60, 56, 54),
                cursor_line_insert: ThemeColor::rgb(50, 54, 40),
                cursor_normal: ThemeColor::rgb(131, 165, 152),
                cursor_insert: ThemeColor::rgb(184, 187, 38),
                cursor_fg: ThemeColor::rgb(40, 40, 40),

                status_bar_bg: ThemeColor::rgb(50, 48, 47),
                status_bar_fg: ThemeColor::rgb(168, 153, 132),
                mode_normal_bg: ThemeColor::rgb(131, 165, 152),
                mode_normal_fg: ThemeColor::rgb(40, 40, 40),
                mode_insert_bg: ThemeColor::rgb(184, 187, 38),
                mode_insert_fg: ThemeColor::rgb(40, 40, 40),
                stale: ThemeColor::rgb(254, 128, 25),

                output_stdout: ThemeColor::rgb(235, 219, 178),
                output_stderr: ThemeColor::rgb(251, 73, 52),
                output_error: ThemeColor::rgb(204, 36, 29),
                output_info: ThemeColor::rgb(131, 165, 152),

                diagnostic_error: ThemeColor::rgb(251, 73, 52),
                diagnostic_warning: ThemeColor::rgb(250, 189, 47),
            },
            syntax: SyntaxColors {
                keyword: ThemeColor::rgb(251, 73, 52),      // Red
                type_kw: ThemeColor::rgb(254, 128, 25),     // Orange
                identifier: ThemeColor::rgb(131, 165, 152), // Aqua
                function: ThemeColor::rgb(250, 189, 47),    // Yellow
                punctuation: ThemeColor::rgb(235, 219, 178),
                number: ThemeColor::rgb(211, 134, 155),     // Purple
                string: ThemeColor::rgb(184, 187, 38),      // Green
                template: ThemeColor::rgb(184, 187, 38),
                regex: ThemeColor::rgb(142, 192, 124),
                comment: ThemeColor::rgb(146, 131, 116),    // Gray
                unknown: ThemeColor::rgb(204, 36, 29),
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::dark(),
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["dark", "light", "gruvbox"]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
