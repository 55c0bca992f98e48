//! Risk annotations as structured segments.
//!
//! Backend markup is parsed, never passed through: `<span>` tags naming a
//! known [`RiskCategory`] open a categorised run, every other tag is dropped
//! and `<script>`/`<style>` bodies are discarded along with their tags.

use std::{collections::BTreeSet, iter, sync::OnceLock};

use regex::{Captures, Regex};
use shared::{domain::RiskCategory, protocol::RiskSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub category: Option<RiskCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotatedText {
    segments: Vec<Segment>,
}

impl AnnotatedText {
    pub fn plain(text: &str) -> Self {
        let mut builder = SegmentBuilder::default();
        builder.push(text, None);
        builder.finish()
    }

    /// Picks the richest source available: markup, then offset spans, then the
    /// plain text itself.
    pub fn resolve(plain_text: &str, markup: Option<&str>, spans: &[RiskSpan]) -> Self {
        if let Some(markup) = markup.filter(|m| !m.trim().is_empty()) {
            return Self::from_markup(markup);
        }
        if !spans.is_empty() {
            return Self::from_spans(plain_text, spans);
        }
        Self::plain(plain_text)
    }

    pub fn from_markup(markup: &str) -> Self {
        let without_comments = comment_regex().replace_all(markup, "");
        let markup = without_comments.as_ref();

        let mut builder = SegmentBuilder::default();
        let mut open_spans: Vec<Option<RiskCategory>> = Vec::new();
        let mut skipping: Option<String> = None;
        let mut cursor = 0;

        for caps in tag_regex().captures_iter(markup) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let closing = caps.get(1).is_some();
            let name = caps
                .get(2)
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            let attrs = caps.get(3).map_or("", |m| m.as_str());

            if let Some(skipped) = &skipping {
                if closing && *skipped == name {
                    skipping = None;
                }
                cursor = whole.end();
                continue;
            }

            let active = innermost(&open_spans);
            builder.push(&decode_entities(&markup[cursor..whole.start()]), active);
            cursor = whole.end();

            match (closing, name.as_str()) {
                (false, "script" | "style") => skipping = Some(name),
                (false, "span") if !attrs.trim_end().ends_with('/') => {
                    open_spans.push(category_from_attrs(attrs));
                }
                (true, "span") => {
                    open_spans.pop();
                }
                (_, "br") => builder.push("\n", active),
                _ => {}
            }
        }

        if skipping.is_none() {
            builder.push(
                &decode_entities(&markup[cursor..]),
                innermost(&open_spans),
            );
        }
        builder.finish()
    }

    /// Builds segments from code-point offset spans. Spans that are out of
    /// range, overlap an earlier span, or do not match their quoted text are
    /// skipped.
    pub fn from_spans(text: &str, spans: &[RiskSpan]) -> Self {
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(iter::once(text.len()))
            .collect();

        let mut accepted: Vec<(usize, usize, RiskCategory)> = spans
            .iter()
            .filter_map(|span| {
                let category = span.category.parse::<RiskCategory>().ok()?;
                if span.start >= span.end || span.end >= offsets.len() {
                    return None;
                }
                let (start, end) = (offsets[span.start], offsets[span.end]);
                if text[start..end].to_lowercase() != span.text.to_lowercase() {
                    return None;
                }
                Some((start, end, category))
            })
            .collect();
        accepted.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut builder = SegmentBuilder::default();
        let mut cursor = 0;
        for (start, end, category) in accepted {
            if start < cursor {
                continue;
            }
            builder.push(&text[cursor..start], None);
            builder.push(&text[start..end], Some(category));
            cursor = end;
        }
        builder.push(&text[cursor..], None);
        builder.finish()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn categories(&self) -> BTreeSet<RiskCategory> {
        self.segments.iter().filter_map(|s| s.category).collect()
    }

    pub fn is_annotated(&self) -> bool {
        self.segments.iter().any(|s| s.category.is_some())
    }
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn push(&mut self, text: &str, category: Option<RiskCategory>) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.category == category => last.text.push_str(text),
            _ => self.segments.push(Segment {
                text: text.to_string(),
                category,
            }),
        }
    }

    fn finish(self) -> AnnotatedText {
        AnnotatedText {
            segments: self.segments,
        }
    }
}

fn innermost(open_spans: &[Option<RiskCategory>]) -> Option<RiskCategory> {
    open_spans.iter().rev().find_map(|category| *category)
}

fn category_from_attrs(attrs: &str) -> Option<RiskCategory> {
    attr_regex().captures_iter(attrs).find_map(|caps| {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        value
            .split_whitespace()
            .flat_map(|token| [token, token.trim_start_matches("risk-")])
            .find_map(|token| token.parse::<RiskCategory>().ok())
    })
}

fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity.strip_prefix('#').and_then(|code| {
                    let value = match code.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                        None => code.parse().ok()?,
                    };
                    char::from_u32(value)
                }),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"(?s)<\s*(/)?\s*([A-Za-z][A-Za-z0-9-]*)([^>]*)>").expect("tag pattern")
    })
}

fn attr_regex() -> &'static Regex {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    ATTR.get_or_init(|| {
        Regex::new(r#"(?i)\b(class|data-category|data-risk)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("attribute pattern")
    })
}

fn comment_regex() -> &'static Regex {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"))
}

fn entity_regex() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern")
    })
}
