//! Conversation text extraction.
//!
//! Chat pages change their markup often, so no single selector is trusted.
//! A prioritized list is combined into one selector; if nothing matches,
//! the whole container's text is used instead.

use scraper::{ElementRef, Html, Selector};

/// Message selectors, most specific first.
pub const MESSAGE_SELECTORS: &[&str] = &[
    ".prose",                          // Claude web app
    ".chat-message-text",              // Generic chat class
    ".human-message, .claude-message", // Direct message classes
    "[data-message-author-role]",      // Attribute-based selection
    "main div div div div div p",      // Deep nested structure
];

/// Result of one extraction, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// Number of message nodes matched (0 means container fallback).
    pub matched: usize,
}

impl Extraction {
    /// Length in characters, the unit the estimator works in.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The combined message selector.
pub fn message_selector() -> Option<Selector> {
    Selector::parse(&MESSAGE_SELECTORS.join(", ")).ok()
}

/// Primary content region if present, else `<body>`, else the root element.
pub fn conversation_container(document: &Html) -> ElementRef<'_> {
    ["main", "body"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element())
}

/// Concatenated text of every descendant text node (`textContent`).
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Extract the conversation text from a parsed document.
pub fn extract(document: &Html) -> Extraction {
    let container = conversation_container(document);

    let parts: Vec<String> = match message_selector() {
        Some(sel) => container.select(&sel).map(text_content).collect(),
        None => Vec::new(),
    };

    log::debug!("Token Gauge: Found {} message elements", parts.len());

    if parts.is_empty() {
        return Extraction {
            text: text_content(container),
            matched: 0,
        };
    }

    Extraction {
        matched: parts.len(),
        text: parts.join(" "),
    }
}

/// Parse raw HTML and extract its conversation text.
pub fn extract_from_html(html: &str) -> Extraction {
    extract(&Html::parse_document(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_selector_parses() {
        assert!(message_selector().is_some());
    }

    #[test]
    fn matched_messages_are_joined_in_document_order() {
        let html = r#"
        <html><body><main>
            <nav>Sidebar chatter</nav>
            <div class="prose">Hello there</div>
            <div data-message-author-role="assistant">General Kenobi</div>
        </main></body></html>
        "#;
        let out = extract_from_html(html);
        assert_eq!(out.matched, 2);
        assert_eq!(out.text, "Hello there General Kenobi");
    }

    #[test]
    fn one_node_matching_several_selectors_counts_once() {
        let html = r#"<main><div class="prose chat-message-text">abc</div></main>"#;
        let out = extract_from_html(html);
        assert_eq!(out.matched, 1);
        assert_eq!(out.text, "abc");
    }

    #[test]
    fn nested_matches_are_all_included() {
        let html = r#"<main><div class="human-message"><span class="prose">hi</span>!</div></main>"#;
        let out = extract_from_html(html);
        assert_eq!(out.matched, 2);
        assert_eq!(out.text, "hi! hi");
    }

    #[test]
    fn falls_back_to_main_text() {
        let html = r#"
        <html><body><header>Title</header><main><section>Plain words</section></main></body></html>
        "#;
        let out = extract_from_html(html);
        assert_eq!(out.matched, 0);
        assert_eq!(out.text.trim(), "Plain words");
    }

    #[test]
    fn falls_back_to_body_without_main() {
        let html = "<html><body><p>Only body</p></body></html>";
        let out = extract_from_html(html);
        assert_eq!(out.matched, 0);
        assert!(out.text.contains("Only body"));
    }

    #[test]
    fn deep_structural_fallback_matches() {
        let html = "<main><div><div><div><div><div><p>deep</p></div></div></div></div></div></main>";
        let out = extract_from_html(html);
        assert_eq!(out.matched, 1);
        assert_eq!(out.text, "deep");
    }

    #[test]
    fn empty_page_is_empty_string() {
        let out = extract_from_html("<html><body></body></html>");
        assert!(out.is_empty());
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let out = extract_from_html(r#"<main><p class="prose">héllo</p></main>"#);
        assert_eq!(out.len(), 5);
    }
}
