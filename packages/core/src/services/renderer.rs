//! Markdown rendering collaborator
//!
//! The resolver only needs HTML plus the list of headings (for tables of
//! contents). [`PulldownRenderer`] is the default implementation; headings in its
//! output carry `id` attributes matching the anchors from
//! [`heading_anchors`](crate::derivation::heading_anchors).

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::derivation::{heading_anchors, HeadingMarker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    /// Headings in document order
    pub headings: Vec<HeadingMarker>,
}

pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> RenderedMarkdown;
}

/// CommonMark renderer with tables, strikethrough, footnotes and task lists
#[derive(Debug, Clone)]
pub struct PulldownRenderer {
    options: Options,
}

impl Default for PulldownRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl PulldownRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, markdown: &str) -> RenderedMarkdown {
        let events: Vec<Event<'_>> = Parser::new_ext(markdown, self.options).collect();

        // First pass: heading text
        let mut headings = Vec::new();
        let mut current: Option<(u8, String)> = None;
        for event in &events {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current = Some((level_number(*level), String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push_str(text);
                    }
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current.take() {
                        headings.push(HeadingMarker::new(level, text));
                    }
                }
                _ => {}
            }
        }

        // Second pass: attach anchors as heading ids
        let mut anchors = heading_anchors(&headings).into_iter();
        let events = events.into_iter().map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => Event::Start(Tag::Heading {
                level,
                id: anchors.next().map(CowStr::from).or(id),
                classes,
                attrs,
            }),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);

        RenderedMarkdown {
            html: out,
            headings,
        }
    }
}
