//! Text rendering of both screens. Styling goes through crossterm and can be
//! switched off, which is also how tests read the output.

use std::fmt::Write as _;

use client_core::{AnnotatedText, AuthMode, Session, Workflow};
use crossterm::style::{Color, Stylize};
use shared::domain::{Language, RiskCategory, SimplificationLevel};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE: &str = "Legal Document Simplifier";
const NO_EXTRACTED: &str = "No text extracted";
const NO_SIMPLIFIED: &str = "No simplified text";
const NO_TRANSLATED: &str = "No translated text";
const MIN_COLUMN: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
    width: usize,
}

impl Renderer {
    pub fn new(color: bool, width: usize) -> Self {
        Self {
            color,
            width: width.max(MIN_COLUMN * 3 + 6),
        }
    }

    pub fn plain(width: usize) -> Self {
        Self::new(false, width)
    }

    fn heading(&self, title: &str) -> String {
        if self.color {
            title.bold().underlined().to_string()
        } else {
            format!("== {title} ==")
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dark_grey().to_string()
        } else {
            text.to_string()
        }
    }

    fn action(&self, name: &str, ready: bool) -> String {
        match (self.color, ready) {
            (true, true) => name.green().to_string(),
            (true, false) => name.dark_grey().to_string(),
            (false, true) => format!("{name} (ready)"),
            (false, false) => format!("{name} (unavailable)"),
        }
    }

    fn swatch(&self, category: RiskCategory, text: &str) -> String {
        let (r, g, b) = category.rgb();
        if self.color {
            text.with(Color::Rgb { r, g, b }).underlined().to_string()
        } else {
            format!("[{text}|{}]", category.as_str())
        }
    }

    pub fn auth_screen(&self, mode: AuthMode, error: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading(TITLE));
        let _ = writeln!(out, "{}", mode.title());
        match mode {
            AuthMode::Login => {
                let _ = writeln!(out, "  login <email> <password>");
                let hint = self.dim("Don't have an account? Type 'mode' to sign up");
                let _ = writeln!(out, "  {hint}");
            }
            AuthMode::Register => {
                let _ = writeln!(out, "  signup <email> <password> <full name>");
                let hint = self.dim("Already have an account? Type 'mode' to log in");
                let _ = writeln!(out, "  {hint}");
            }
        }
        if let Some(error) = error {
            let line = if self.color {
                error.red().to_string()
            } else {
                format!("error: {error}")
            };
            let _ = writeln!(out, "{line}");
        }
        out
    }

    pub fn header(&self, session: &Session) -> String {
        let mut line = format!("{TITLE} | user {}", session.user_id());
        if let Some(expires_at) = session.expires_at() {
            let _ = write!(line, " | session expires {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
        }
        if self.color {
            line.bold().to_string()
        } else {
            line
        }
    }

    pub fn workflow(&self, workflow: &Workflow) -> String {
        let mut out = String::new();
        if let Some(stage) = workflow.pending() {
            let _ = writeln!(out, "{}", self.dim(&format!("{stage} in progress...")));
        }

        let _ = writeln!(out, "{}", self.heading("Extracted Text"));
        match (workflow.source_name(), workflow.extracted_text()) {
            (Some(source), Some(text)) => {
                let _ = writeln!(out, "{}", self.dim(&format!("from {source}")));
                let _ = writeln!(out, "{}", or_placeholder(text, NO_EXTRACTED));
            }
            _ => {
                let hint = self.dim("Upload a document to begin (pdf, doc, docx, txt, png, jpg)");
                let _ = writeln!(out, "{hint}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}",
            self.heading("Simplification Level"),
            level_picker(workflow.level())
        );

        if let Some(simplification) = workflow.simplification() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.heading("Simplified Text"));
            let _ = writeln!(out, "{}", self.annotated(&simplification.annotated));
            let _ = writeln!(
                out,
                "{}",
                self.dim(&format!(
                    "{} words | level {}",
                    simplification.word_count(),
                    simplification.level
                ))
            );
            let categories = simplification.annotated.categories();
            if !categories.is_empty() {
                let _ = writeln!(out, "{}", self.legend_for(categories.into_iter()));
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}",
            self.heading("Translate To"),
            workflow
                .language()
                .map(Language::as_str)
                .unwrap_or("(none selected)")
        );
        if let (Some(language), Some(text)) =
            (workflow.translation_language(), workflow.translated_text())
        {
            let _ = writeln!(out, "{}", self.heading(&format!("Translated Text ({language})")));
            let _ = writeln!(out, "{text}");
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Actions: {} | {}",
            self.action("simplify", workflow.can_simplify()),
            self.action("translate", workflow.can_translate())
        );

        if workflow.compare_view() {
            let _ = writeln!(out);
            out.push_str(&self.compare(workflow));
        }
        out
    }

    pub fn annotated(&self, text: &AnnotatedText) -> String {
        text.segments()
            .iter()
            .map(|segment| match segment.category {
                Some(category) => self.swatch(category, &segment.text),
                None => segment.text.clone(),
            })
            .collect()
    }

    pub fn legend(&self) -> String {
        self.legend_for(RiskCategory::ALL.into_iter())
    }

    fn legend_for(&self, categories: impl Iterator<Item = RiskCategory>) -> String {
        let entries: Vec<String> = categories
            .map(|category| {
                let marker = if self.color {
                    let (r, g, b) = category.rgb();
                    "■".with(Color::Rgb { r, g, b }).to_string()
                } else {
                    category.color_hex().to_string()
                };
                format!("{marker} {}", category.label())
            })
            .collect();
        format!("Legend: {}", entries.join("  "))
    }

    /// Extracted, simplified and translated text in three columns.
    pub fn compare(&self, workflow: &Workflow) -> String {
        let column = (self.width - 6) / 3;
        let columns = [
            (
                "Extracted",
                wrap(
                    or_placeholder(workflow.extracted_text().unwrap_or_default(), NO_EXTRACTED),
                    column,
                ),
            ),
            (
                "Simplified",
                wrap(
                    or_placeholder(workflow.simplified_text().unwrap_or_default(), NO_SIMPLIFIED),
                    column,
                ),
            ),
            (
                "Translated",
                wrap(
                    or_placeholder(workflow.translated_text().unwrap_or_default(), NO_TRANSLATED),
                    column,
                ),
            ),
        ];

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading("Compare"));
        let titles: Vec<String> = columns
            .iter()
            .map(|(title, _)| pad(title, column))
            .collect();
        let _ = writeln!(out, "{}", titles.join(" | ").trim_end());
        let rows = columns.iter().map(|(_, lines)| lines.len()).max().unwrap_or(0);
        for row in 0..rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|(_, lines)| pad(lines.get(row).map(String::as_str).unwrap_or(""), column))
                .collect();
            let _ = writeln!(out, "{}", cells.join(" | ").trim_end());
        }
        out
    }
}

fn level_picker(selected: SimplificationLevel) -> String {
    SimplificationLevel::ALL
        .iter()
        .map(|level| {
            if *level == selected {
                format!("({level})")
            } else {
                level.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text}{}", " ".repeat(width.saturating_sub(text.width())))
}

/// Splits off the longest prefix of `word` that fits in `width` columns.
/// Zero-width marks stay with the character before them.
fn split_at_width(word: &str, width: usize) -> (&str, &str) {
    let mut used = 0;
    for (index, ch) in word.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width && used > 0 {
            return word.split_at(index);
        }
        used += w;
    }
    (word, "")
}

/// Greedy word wrap on terminal display width. Words wider than `width` are
/// split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for mut word in paragraph.split_whitespace() {
            while word.width() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let (head, tail) = split_at_width(word, width);
                lines.push(head.to_string());
                word = tail;
            }
            if word.is_empty() {
                continue;
            }
            let needed = current.width() + usize::from(!current.is_empty()) + word.width();
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}
