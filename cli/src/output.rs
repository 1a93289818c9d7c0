//! Output formatting utilities for CLI commands

use colored::Colorize;

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Bold section heading
pub fn heading(msg: &str) {
    println!("{}", msg.bold());
}

/// Indented `name  description` line with a dimmed detail suffix
pub fn item(name: &str, description: &str, detail: &str) {
    if detail.is_empty() {
        println!("  {:<16} {}", name.cyan(), description);
    } else {
        println!("  {:<16} {} {}", name.cyan(), description, detail.dimmed());
    }
}
