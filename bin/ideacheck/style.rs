//! Terminal styling for ideacheck output

use ideacheck::{JobPhase, Trend};

/// ANSI color codes
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

use colors::*;

pub fn style_bold(s: &str) -> String {
    format!("{}{}{}", BOLD, s, RESET)
}

pub fn style_dim(s: &str) -> String {
    format!("{}{}{}", DIM, s, RESET)
}

pub fn style_cyan(s: &str) -> String {
    format!("{}{}{}", CYAN, s, RESET)
}

pub fn icon_success() -> String {
    format!("{}✓{}", GREEN, RESET)
}

pub fn icon_error() -> String {
    format!("{}✗{}", RED, RESET)
}

pub fn icon_warning() -> String {
    format!("{}⚠{}", YELLOW, RESET)
}

pub fn icon_info() -> String {
    format!("{}ℹ{}", BLUE, RESET)
}

pub fn print_success(msg: &str) {
    println!("{} {}", icon_success(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}{}{}", icon_error(), RED, msg, RESET);
}

pub fn print_warning(msg: &str) {
    println!("{} {}{}{}", icon_warning(), YELLOW, msg, RESET);
}

pub fn print_info(msg: &str) {
    println!("{} {}", icon_info(), msg);
}

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}{} {} {}{}",
        BOLD,
        CYAN,
        title,
        "─".repeat(50usize.saturating_sub(title.len())),
        RESET
    );
    println!();
}

pub fn print_section(title: &str) {
    println!();
    println!("  {}{}{}", BOLD, title, RESET);
    println!("  {}", style_dim(&"─".repeat(40)));
}

pub fn print_key_value(key: &str, value: &str) {
    println!("  {}{}:{} {}", GRAY, key, RESET, value);
}

pub fn print_key_value_colored(key: &str, value: &str, color: &str) {
    println!("  {}{}:{} {}{}{}", GRAY, key, RESET, color, value, RESET);
}

/// Bar for a 0-100 percentage
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width) / 100;
    let empty = width - filled;

    format!(
        "{}{}{}{}{}",
        GREEN,
        "█".repeat(filled),
        GRAY,
        "░".repeat(empty),
        RESET
    )
}

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
}

/// Color for a 0-5 score
pub fn score_color(score: f64) -> &'static str {
    if score >= 4.0 {
        GREEN
    } else if score >= 2.5 {
        YELLOW
    } else {
        RED
    }
}

pub fn phase_color(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Idle => GRAY,
        JobPhase::Pending => YELLOW,
        JobPhase::InProgress => CYAN,
        JobPhase::Completed => GREEN,
        JobPhase::Failed => RED,
    }
}

pub fn trend_icon(trend: Trend) -> String {
    match trend {
        Trend::Improved => format!("{}▲{}", GREEN, RESET),
        Trend::Declined => format!("{}▼{}", RED, RESET),
        Trend::Unchanged => format!("{}={}", GRAY, RESET),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_width() {
        let bar = progress_bar(50, 20);
        assert_eq!(bar.matches('█').count(), 10);
        assert_eq!(bar.matches('░').count(), 10);

        let full = progress_bar(100, 20);
        assert_eq!(full.matches('█').count(), 20);
        assert_eq!(full.matches('░').count(), 0);
    }

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(spinner_frame(0), spinner_frame(10));
    }

    #[test]
    fn test_score_color_bands() {
        assert_eq!(score_color(4.2), GREEN);
        assert_eq!(score_color(3.0), YELLOW);
        assert_eq!(score_color(1.0), RED);
    }
}
