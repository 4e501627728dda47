//! Terminal styling utilities for the run output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

use crate::pipeline::ExperimentConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");
pub static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ┏━┓┏━╸╻  ┏━┓┏━╸╻╺┳╸
    ┣┳┛┣╸ ┃  ┃ ┃┃╺┓┃ ┃
    ╹┗╸┗━╸┗━╸┗━┛┗━┛╹ ╹
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Logistic regression under class resampling").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config: &ExperimentConfig, report_path: Option<&Path>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let methods = config
        .methods
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ");
    let report = report_path
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "(disabled)".to_string());

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:  {:<39}│",
        FOLDER,
        truncate_path(&config.input, 38)
    );
    println!("    │  {} Report: {:<39}│", SAVE, report);
    println!("    ├{}┤", line);
    println!(
        "    │  {} Seed:        {:<34}│",
        DICE,
        style(config.seed).yellow()
    );
    println!(
        "    │  {} Split:       {:<34}│",
        SCALE,
        style(format!(
            "{:.0}% train / {:.0}% test",
            config.train_ratio * 100.0,
            (1.0 - config.train_ratio) * 100.0
        ))
        .yellow()
    );
    println!(
        "    │  {} Runs:        {:<34}│",
        ROCKET,
        style(truncate_string(&methods, 34)).yellow()
    );
    println!(
        "    │  {} Positive:    {:<34}│",
        TARGET,
        style(format!("class {}", config.positive_class.label())).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("    {} {}", WARN, style(message).yellow());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {} {}",
        CLOCK,
        style(format!("{:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("relogit run complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "...hijkl");
    }
}
