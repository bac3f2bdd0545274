use colored::{Color, ColoredString, Colorize};

use crate::testing::Outcome;

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

/// `(basic, truecolor)` pair per outcome. MLE gets its own shade even though nothing
/// produces it, so a custom report can still tell it apart from TLE.
fn outcome_palette(outcome: Outcome) -> (Color, (u8, u8, u8)) {
    use Outcome::*;
    match outcome {
        OK => (Color::Green, (30, 180, 40)),
        WA => (Color::Yellow, (210, 138, 4)),
        TLE => (Color::Red, (220, 42, 42)),
        MLE => (Color::BrightRed, (235, 96, 60)),
        RE => (Color::Magenta, (171, 40, 200)),
    }
}

impl ColorTheme for Outcome {
    fn color(&self) -> Color {
        let (basic, (r, g, b)) = outcome_palette(*self);
        if is_truecolor_supported() {
            Color::TrueColor { r, g, b }
        } else {
            basic
        }
    }
}

/// Widest outcome code (`TLE`, `MLE`); shorter codes are padded so badges line up in
/// the spinner lines and the summary table.
pub const BADGE_CODE_WIDTH: usize = 3;

fn badge_text(outcome: Outcome) -> String {
    format!(" {:<width$} ", outcome.to_string(), width = BADGE_CODE_WIDTH)
}

/// Bold, fixed-width badge such as ` OK  ` or ` TLE ` on the outcome's color.
pub fn outcome_icon(outcome: Outcome) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    badge_text(outcome)
        .on_color(outcome.color())
        .bold()
        .color(fg)
}
