//! Plain-text rendering of views for the terminal.

use std::fmt::Write;

use paperwise_client::api::Field;
use paperwise_client::views::{ChatMessage, PaperCard, PaperDetailView, Role};
use paperwise_client::User;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// One paper card, numbered from 1.
pub fn card(number: usize, card: &PaperCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}[{}] {}{}", BOLD, number, card.title(), RESET);
    if let Some(authors) = card.authors_line() {
        let _ = writeln!(out, "    {}", authors);
    }
    let excerpt = card.summary_excerpt();
    if !excerpt.is_empty() {
        let _ = writeln!(out, "    {}", excerpt);
    }

    let paper = card.paper();
    let mut meta = Vec::new();
    if let Some(link) = paper.link.as_deref().filter(|l| !l.is_empty()) {
        meta.push(link.to_string());
    }
    if let Some(source) = paper.source.as_deref() {
        meta.push(source.to_string());
    }
    if card.is_bookmarked() {
        meta.push(format!("{}* Bookmarked{}", YELLOW, RESET));
    }
    if !meta.is_empty() {
        let _ = writeln!(out, "    {}{}{}", DIM, meta.join("  |  "), RESET);
    }
    out
}

pub fn cards(cards: &[PaperCard]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, c)| card(i + 1, c))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn fields(fields: &[Field]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:<20} {:<24} DESCRIPTION", "ID", "NAME");
    for field in fields {
        let _ = writeln!(out, "  {:<20} {:<24} {}", field.id, field.name, field.description);
    }
    out
}

pub fn history(entries: &[String], popular: &[&str]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        let _ = writeln!(out, "No recent searches.");
    } else {
        let _ = writeln!(out, "{}Recent searches{}", BOLD, RESET);
        for entry in entries {
            let _ = writeln!(out, "  - {}", entry);
        }
    }
    let _ = writeln!(out, "\n{}Popular searches{}", BOLD, RESET);
    let _ = writeln!(out, "  {}", popular.join(", "));
    out
}

pub fn user(user: &User) -> String {
    format!("Name:  {}\nEmail: {}\n", user.name, user.email)
}

pub fn explanation(view: &PaperDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}{}{}", BOLD, view.title(), RESET);
    if let Some(paper) = view.paper() {
        if !paper.authors.is_empty() {
            let _ = writeln!(out, "By {}", paper.authors.join(", "));
        }
        if let Some(source) = paper.source.as_deref() {
            let _ = writeln!(out, "{}[{}]{}", DIM, source, RESET);
        }
    }

    match view.explanation() {
        Some(explanation) => {
            let _ = writeln!(out, "\n{}Simple Explanation{}", BOLD, RESET);
            let _ = writeln!(out, "{}", explanation.explanation);
            if !view.key_points().is_empty() {
                let _ = writeln!(out, "\n{}Key Points{}", BOLD, RESET);
                for point in view.key_points() {
                    let _ = writeln!(out, "  - {}", point);
                }
            }
        }
        None => {
            let _ = writeln!(out, "\nNo explanation available. Please try again.");
        }
    }
    if let Some(error) = view.error() {
        let _ = writeln!(out, "\n{}{}{}", RED, error, RESET);
    }
    out
}

pub fn message(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!(
        "{}{} {}{}\n{}\n",
        DIM,
        message.sent_at.format("%H:%M"),
        who,
        RESET,
        message.content
    )
}

pub fn error(message: &str) -> String {
    format!("{}{}{}", RED, message, RESET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperwise_client::api::Paper;

    fn paper(summary: &str) -> Paper {
        Paper {
            title: "Surface Codes".to_string(),
            authors: vec!["Fowler".to_string()],
            summary: summary.to_string(),
            link: Some("http://arxiv.org/abs/1208.0928".to_string()),
            source: Some("arXiv".to_string()),
            ..Paper::default()
        }
    }

    #[test]
    fn test_card_shows_title_and_excerpt() {
        let long = "Logical qubits. ".repeat(20);
        let rendered = card(1, &PaperCard::listing(paper(&long)));

        assert!(rendered.contains("[1] Surface Codes"));
        assert!(rendered.contains("By Fowler"));
        let excerpt_line = rendered.lines().nth(2).unwrap().trim();
        assert!(excerpt_line.ends_with("..."));
        assert!(excerpt_line.chars().count() <= 150);
        assert!(!rendered.contains("Bookmarked"));
    }

    #[test]
    fn test_cards_numbered() {
        let list: Vec<PaperCard> = (0..3).map(|_| PaperCard::listing(paper("Short."))).collect();
        let rendered = cards(&list);
        assert!(rendered.contains("[1] "));
        assert!(rendered.contains("[3] "));
        assert_eq!(rendered.matches("Surface Codes").count(), 3);
    }

    #[test]
    fn test_history_lists_entries() {
        let rendered = history(&["ml".to_string(), "ai".to_string()], &["robotics"]);
        assert!(rendered.contains("  - ml\n  - ai"));
        assert!(rendered.contains("robotics"));

        assert!(history(&[], &[]).starts_with("No recent searches."));
    }
}
