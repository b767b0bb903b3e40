//! CLI output formatting.
//!
//! Output is content-first: each article leads with its position and title,
//! with slug, date and pin count on indented context lines.
//!
//! ```text
//! Articles
//! 001 Casa observatório na Mata Atlântica (3 pins)
//!     Slug: casa-observatorio-mata-atlantica
//!     Published: 2024-08-12 · 8 min
//!
//! 3 articles, 7 pins
//! ```
//!
//! Each command has a `format_*` function returning lines, for testability,
//! and a `print_*` wrapper that writes them to stdout.

use crate::store::seed::SeedReport;
use crate::types::Article;

const INDENT: &str = "    ";

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

/// Header plus context lines for one article.
fn article_lines(position: usize, article: &Article, pins: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{:03} {} ({})",
        position,
        article.title,
        plural(pins, "pin", "pins")
    )];
    lines.push(format!("{INDENT}Slug: {}", article.slug));
    let date = article.published_at.as_deref().unwrap_or("—");
    match article.reading_time {
        Some(minutes) => lines.push(format!("{INDENT}Published: {date} · {minutes} min")),
        None => lines.push(format!("{INDENT}Published: {date}")),
    }
    lines
}

/// The `list` command: every article with its pin count.
pub fn format_inventory(rows: &[(Article, usize)]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["No articles yet. Run `habitare seed` for demo content.".to_string()];
    }
    let mut lines = vec!["Articles".to_string()];
    for (idx, (article, pins)) in rows.iter().enumerate() {
        lines.extend(article_lines(idx + 1, article, *pins));
    }
    let total_pins: usize = rows.iter().map(|(_, pins)| pins).sum();
    lines.push(String::new());
    lines.push(format!(
        "{}, {}",
        plural(rows.len(), "article", "articles"),
        plural(total_pins, "pin", "pins")
    ));
    lines
}

pub fn print_inventory(rows: &[(Article, usize)]) {
    for line in format_inventory(rows) {
        println!("{line}");
    }
}

/// The `seed` command.
pub fn format_seed_report(report: Option<&SeedReport>) -> Vec<String> {
    match report {
        Some(r) => vec![format!(
            "Seeded {}, {}, {}",
            plural(r.articles, "article", "articles"),
            plural(r.sections, "section", "sections"),
            plural(r.pins, "pin", "pins")
        )],
        None => vec!["Database already has articles; nothing seeded.".to_string()],
    }
}

pub fn print_seed_report(report: Option<&SeedReport>) {
    for line in format_seed_report(report) {
        println!("{line}");
    }
}
