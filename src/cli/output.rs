//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use itertools::Itertools;

use crate::domain::{ChatMessage, Sender, TreeLayout};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print neutral status (blue bullet), e.g. "not found"
pub fn notice(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "•".blue(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print prompt without newline (cyan)
pub fn prompt(msg: &(impl std::fmt::Display + ?Sized)) {
    print!("{} ", msg.to_string().cyan());
    io::stdout().flush().ok();
}

/// Read one trimmed line from stdin after a prompt.
pub fn read_line(msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<String> {
    prompt(msg);
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Ask a yes/no question; anything but y/yes is a no.
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = read_line(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Render a chat message as a single line.
pub fn chat_message(message: &ChatMessage) {
    let time = message.timestamp.format("%H:%M");
    match message.sender {
        Sender::User => println!("{} {} {}", time.to_string().dimmed(), "you:".cyan().bold(), message.text),
        Sender::Bot => println!("{} {} {}", time.to_string().dimmed(), "bot:".magenta().bold(), message.text),
    }
}

/// Format a layout as aligned node and edge tables.
pub fn format_layout(layout: &TreeLayout, highlight: Option<&str>) -> String {
    if layout.is_empty() {
        return "(empty tree)".to_string();
    }
    let width = layout.nodes.iter().map(|n| n.id.len()).max().unwrap_or(1);

    let nodes = layout
        .nodes
        .iter()
        .map(|n| {
            let marker = if Some(n.id.as_str()) == highlight { "*" } else { " " };
            format!(
                "{} {:>width$}  x={:>9.2}  y={:>7.2}",
                marker,
                n.label,
                n.position.x,
                n.position.y,
                width = width
            )
        })
        .join("\n");

    let edges = layout
        .edges
        .iter()
        .map(|e| format!("  {} -> {}", e.source, e.target))
        .join("\n");

    if edges.is_empty() {
        format!("nodes:\n{}", nodes)
    } else {
        format!("nodes:\n{}\nedges:\n{}", nodes, edges)
    }
}
