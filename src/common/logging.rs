//! Coloured console output for the interactive session.
//!
//! Diagnostics go through the `log` macros; these are only for text meant
//! for the person at the terminal.

pub use colored::Color;
use colored::{ColoredString, Colorize};

pub fn paint(text: String, color: Color) -> ColoredString {
    text.color(color)
}

#[macro_export]
macro_rules! eprint_red {
    ($($arg:tt)*) => {
        eprintln!("{}", $crate::common::logging::paint(format!($($arg)*), $crate::common::logging::Color::Red));
    };
}

#[macro_export]
macro_rules! print_yellow {
    ($($arg:tt)*) => {
        println!("{}", $crate::common::logging::paint(format!($($arg)*), $crate::common::logging::Color::Yellow));
    };
}

#[macro_export]
macro_rules! print_blue {
    ($($arg:tt)*) => {
        println!("{}", $crate::common::logging::paint(format!($($arg)*), $crate::common::logging::Color::Blue));
    };
}
