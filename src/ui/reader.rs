//! The reader pane: renders the selected discourse (or the idle placeholder).
//!
//! Composition and painting are split. [`compose`] is a pure function from a
//! discourse (or nothing) to a [`ReaderContent`]; the frame renderer paints
//! whatever it returns. Every call starts from an empty `ReaderContent`, so a
//! new selection fully replaces the previous rendering, so there is no partial
//! update to drift.

use crate::app::{App, ViewBindings};
use crate::catalog::Discourse;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Loading spinner frames, advanced by the tick handler.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// One rendered resource row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    /// First character of the kind name, upper-cased.
    pub badge: char,
    pub name: String,
    pub link: String,
}

/// Everything the reader pane shows, fully determined by one discourse and
/// the view bindings. Regions the session did not bind stay `None` and the
/// painter skips them.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderContent {
    pub title: String,
    pub date: String,
    pub reference: String,
    pub prompt: Option<String>,
    pub image_note: Option<String>,
    pub body: Vec<Line<'static>>,
    /// `None` when the resource region is unbound; `Some(empty)` renders the
    /// no-resources message.
    pub resources: Option<Vec<ResourceEntry>>,
}

/// Compose the reader content for a discourse, or the fixed idle placeholder
/// for `None`. The placeholder is reachable from every state and identical
/// on every call.
pub fn compose(item: Option<&Discourse>, bindings: &ViewBindings) -> ReaderContent {
    let Some(discourse) = item else {
        return ReaderContent {
            title: "Dialogues".to_string(),
            date: String::new(),
            reference: String::new(),
            prompt: bindings
                .prompt
                .then(|| "Select a discourse from the navigation panels.".to_string()),
            image_note: None,
            body: vec![Line::from("Choose a category to begin.")],
            resources: bindings.resources.then(Vec::new),
        };
    };

    let title = match discourse.title.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => "N/A".to_string(),
    };

    let prompt_subject = match discourse.title.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => "this topic",
    };

    ReaderContent {
        date: discourse.date_posted.clone().unwrap_or_default(),
        reference: discourse
            .reference
            .as_deref()
            .map(|r| format!("Reference: {}", r))
            .unwrap_or_default(),
        prompt: bindings
            .prompt
            .then(|| format!("Share your thoughts on '{}'.", prompt_subject)),
        image_note: if bindings.image {
            discourse
                .featured_image_url
                .as_deref()
                .map(|url| format!("[Image: {}]", url))
        } else {
            None
        },
        body: layout_body(
            discourse
                .body
                .as_deref()
                .unwrap_or("<p>Content not available.</p>"),
        ),
        resources: bindings.resources.then(|| {
            discourse
                .resources
                .iter()
                .map(|r| ResourceEntry {
                    badge: r.kind.badge(),
                    name: r.name.clone(),
                    link: r.link.clone().unwrap_or_default(),
                })
                .collect()
        }),
        title,
    }
}

/// Lay the body markup out as terminal lines.
///
/// The body is trusted backend content and is inserted verbatim: raw HTML
/// events pass straight through as text, nothing is stripped or escaped.
/// Markdown structure (paragraphs, headings, emphasis) is used only to place
/// line breaks and styling.
pub fn layout_body(markup: &str) -> Vec<Line<'static>> {
    let parser = Parser::new(markup);
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(markup.lines().count());
    let mut current_spans: Vec<Span<'static>> = Vec::with_capacity(4);
    let mut in_heading = false;
    let mut in_emphasis = false;
    let mut in_strong = false;

    let mut flush = |spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::End(TagEnd::Heading(_)) => {
                flush(&mut current_spans, &mut lines);
                in_heading = false;
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                flush(&mut current_spans, &mut lines);
                lines.push(Line::from(""));
            }
            Event::Start(Tag::Emphasis) => in_emphasis = true,
            Event::End(TagEnd::Emphasis) => in_emphasis = false,
            Event::Start(Tag::Strong) => in_strong = true,
            Event::End(TagEnd::Strong) => in_strong = false,
            Event::Html(html) => {
                // Block-level raw markup: verbatim, one line per source line.
                flush(&mut current_spans, &mut lines);
                for line in html.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            Event::InlineHtml(html) => {
                current_spans.push(Span::raw(html.into_string()));
            }
            Event::Text(text) => {
                let style = if in_heading {
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::Cyan)
                } else if in_strong {
                    Style::default().add_modifier(Modifier::BOLD)
                } else if in_emphasis {
                    Style::default().add_modifier(Modifier::ITALIC)
                } else {
                    Style::default()
                };
                current_spans.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                current_spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Event::SoftBreak => current_spans.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut current_spans, &mut lines),
            _ => {}
        }
    }

    flush(&mut current_spans, &mut lines);
    lines
}

/// Paint the reader pane.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let content = compose(app.displayed(), &app.bindings);

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(content.body.len() + 8);
    lines.push(Line::from(Span::styled(
        content.title,
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let mut meta = Vec::new();
    if !content.date.is_empty() {
        meta.push(content.date);
    }
    if !content.reference.is_empty() {
        meta.push(content.reference);
    }
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(
            meta.join("  |  "),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    if let Some(note) = content.image_note {
        lines.push(Line::from(Span::styled(
            note,
            Style::default().fg(Color::Blue),
        )));
        lines.push(Line::from(""));
    }

    lines.extend(content.body);

    if let Some(resources) = content.resources {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Resources",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if resources.is_empty() {
            lines.push(Line::from(Span::styled(
                "No resources are listed for this discourse.",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for entry in resources {
                let mut spans = vec![
                    Span::styled(
                        format!("[{}] ", entry.badge),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(entry.name, Style::default().add_modifier(Modifier::BOLD)),
                ];
                if !entry.link.is_empty() {
                    spans.push(Span::raw(": "));
                    spans.push(Span::styled(
                        entry.link,
                        Style::default().fg(Color::Blue),
                    ));
                }
                lines.push(Line::from(spans));
            }
        }
    }

    if let Some(prompt) = content.prompt {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            prompt,
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }

    let title = if app.loads_in_flight > 0 {
        format!(
            " Discourse {} ",
            SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
        )
    } else {
        " Discourse ".to_string()
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Resource, ResourceKind};

    fn bindings() -> ViewBindings {
        ViewBindings::default()
    }

    fn sample() -> Discourse {
        Discourse {
            id: "disc-1".to_string(),
            subcategory_id: Some(10),
            title: Some("On Light".to_string()),
            body: Some("<p>First.</p>\n<p>Second.</p>".to_string()),
            date_posted: Some("June 01, 2024".to_string()),
            reference: Some("DISC-2024".to_string()),
            featured_image_url: Some("/static/images/light.webp".to_string()),
            resources: vec![Resource {
                kind: ResourceKind::Scripture,
                name: "Psalm 19:1".to_string(),
                link: Some("https://example.com/ps19".to_string()),
            }],
        }
    }

    #[test]
    fn test_idle_render_is_idempotent() {
        let b = bindings();
        let first = compose(None, &b);
        let _interleaved = compose(Some(&sample()), &b);
        let second = compose(None, &b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_title_falls_back_to_na() {
        let b = bindings();
        let mut d = sample();
        d.title = Some(String::new());
        assert_eq!(compose(Some(&d), &b).title, "N/A");
        d.title = None;
        assert_eq!(compose(Some(&d), &b).title, "N/A");
    }

    #[test]
    fn test_reference_is_formatted() {
        let content = compose(Some(&sample()), &bindings());
        assert_eq!(content.reference, "Reference: DISC-2024");
    }

    #[test]
    fn test_prompt_uses_title() {
        let content = compose(Some(&sample()), &bindings());
        assert_eq!(
            content.prompt.as_deref(),
            Some("Share your thoughts on 'On Light'.")
        );

        let mut untitled = sample();
        untitled.title = None;
        let content = compose(Some(&untitled), &bindings());
        assert_eq!(
            content.prompt.as_deref(),
            Some("Share your thoughts on 'this topic'.")
        );
    }

    #[test]
    fn test_missing_body_degrades_to_placeholder() {
        let mut d = sample();
        d.body = None;
        let content = compose(Some(&d), &bindings());
        let flat: String = content
            .body
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(flat.contains("Content not available."));
    }

    #[test]
    fn test_raw_markup_passes_through_verbatim() {
        let lines = layout_body("<p class=\"x\">Alpha <b>beta</b></p>");
        let flat: String = lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        // Tags survive untouched; nothing is sanitized or escaped.
        assert!(flat.contains("<p class=\"x\">"));
        assert!(flat.contains("<b>"));
    }

    #[test]
    fn test_resource_badges() {
        let mut d = sample();
        d.resources.push(Resource {
            kind: ResourceKind::Other("Podcast".to_string()),
            name: "Ep 3".to_string(),
            link: None,
        });
        let content = compose(Some(&d), &bindings());
        let resources = content.resources.unwrap();
        assert_eq!(resources[0].badge, 'S');
        assert_eq!(resources[1].badge, 'P');
        assert_eq!(resources[1].link, "");
    }

    #[test]
    fn test_unbound_regions_are_skipped() {
        let b = ViewBindings {
            reader: true,
            image: false,
            resources: false,
            prompt: false,
        };
        let content = compose(Some(&sample()), &b);
        assert!(content.image_note.is_none());
        assert!(content.resources.is_none());
        assert!(content.prompt.is_none());
    }

    #[test]
    fn test_empty_resources_render_as_some_empty() {
        let mut d = sample();
        d.resources.clear();
        let content = compose(Some(&d), &bindings());
        assert_eq!(content.resources, Some(vec![]));
    }

    #[test]
    fn test_markdown_body_still_lays_out() {
        let lines = layout_body("# Heading\n\nPlain *emphasis* text");
        assert!(!lines.is_empty());
    }
}
