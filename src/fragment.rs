//! Parsing of fetched lesson documents: only the `#description` subtree and
//! the page `<title>` survive; the rest of the document is discarded.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::NavError;

static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#description").expect("valid description selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid title selector"));
static QUIZ_FORM: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".quiz form").expect("valid quiz form selector"));
static IN_PAGE_ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href^='#']").expect("valid anchor selector"));
static ANY_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").expect("valid id selector"));
static SIDEBAR_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sidebar li").expect("valid sidebar selector"));

/// The extracted shape of a fetched lesson page.
#[derive(Debug, Clone, Serialize)]
pub struct LessonPage {
    /// Text of the document `<title>`, when one exists.
    pub title: Option<String>,
    /// Inner markup of the element with id `description`.
    pub content_html: String,
}

/// Extracts the lesson fragment and title from a full HTML document.
pub fn extract_lesson(html: &str) -> Result<LessonPage, NavError> {
    let doc = Html::parse_document(html);
    let content = doc
        .select(&DESCRIPTION)
        .next()
        .ok_or(NavError::ContentNotFound)?;
    let title = doc
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>());
    Ok(LessonPage {
        title,
        content_html: content.inner_html(),
    })
}

/// What the interactive-element pass found in a piece of markup: quiz forms
/// to intercept, in-page anchors to reroute, and the element ids anchors can
/// legitimately scroll to.
#[derive(Debug, Clone, Default)]
pub struct InteractiveScan {
    pub quiz_forms: usize,
    pub anchor_targets: Vec<String>,
    element_ids: HashSet<String>,
}

impl InteractiveScan {
    /// Scans a complete document (the initially rendered page).
    pub fn of_document(html: &str) -> Self {
        Self::scan(&Html::parse_document(html))
    }

    /// Scans swapped-in fragment markup.
    pub fn of_fragment(html: &str) -> Self {
        Self::scan(&Html::parse_fragment(html))
    }

    fn scan(doc: &Html) -> Self {
        let quiz_forms = doc.select(&QUIZ_FORM).count();
        let anchor_targets = doc
            .select(&IN_PAGE_ANCHOR)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| href.to_string())
            .collect();
        let element_ids = doc
            .select(&ANY_ID)
            .filter_map(|el| el.value().attr("id"))
            .map(|id| id.to_string())
            .collect();
        Self {
            quiz_forms,
            anchor_targets,
            element_ids,
        }
    }

    /// Whether an `#anchor` href points at an element present in the scanned
    /// markup. The leading `#` is ignored.
    pub fn has_target(&self, href: &str) -> bool {
        let id = href.strip_prefix('#').unwrap_or(href);
        !id.is_empty() && self.element_ids.contains(id)
    }
}

/// A sidebar row as found in the hosting page's markup. Items without a
/// `data-topic` attribute are inert.
#[derive(Debug, Clone, Serialize)]
pub struct SidebarItem {
    pub label: String,
    pub topic: Option<String>,
}

/// Collects the `.sidebar li` rows of a page, label text plus `data-topic`.
pub fn sidebar_items(html: &str) -> Vec<SidebarItem> {
    let doc = Html::parse_document(html);
    doc.select(&SIDEBAR_ITEM)
        .map(|el| SidebarItem {
            label: el.text().collect::<String>().trim().to_string(),
            topic: el.value().attr("data-topic").map(|t| t.to_string()),
        })
        .collect()
}

/// Flattens fragment markup to readable text for terminal output.
pub fn fragment_text(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let mut out = String::new();
    for piece in doc.root_element().text() {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(trimmed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LESSON: &str = r##"<!DOCTYPE html>
<html>
  <head><title>Loops in C++</title></head>
  <body>
    <nav>ignored chrome</nav>
    <div id="description">
      <h2 id="for-loops">For loops</h2>
      <p>Iterate with <code>for</code>.</p>
      <a href="#for-loops">jump</a>
      <a href="#missing">nowhere</a>
      <a href="other.html">external</a>
      <div class="quiz"><form><button>Submit</button></form></div>
    </div>
  </body>
</html>"##;

    #[test]
    fn extracts_description_and_title() {
        let page = extract_lesson(LESSON).unwrap();
        assert_eq!(page.title.as_deref(), Some("Loops in C++"));
        assert!(page.content_html.contains("For loops"));
        assert!(!page.content_html.contains("ignored chrome"));
    }

    #[test]
    fn missing_description_is_content_not_found() {
        let err = extract_lesson("<html><body><p>nothing here</p></body></html>").unwrap_err();
        assert!(matches!(err, NavError::ContentNotFound));
    }

    #[test]
    fn page_without_title_extracts_with_none() {
        let page =
            extract_lesson(r#"<html><body><div id="description">x</div></body></html>"#).unwrap();
        assert!(page.title.is_none());
    }

    #[test]
    fn scan_finds_quiz_forms_and_in_page_anchors() {
        let page = extract_lesson(LESSON).unwrap();
        let scan = InteractiveScan::of_fragment(&page.content_html);
        assert_eq!(scan.quiz_forms, 1);
        assert_eq!(scan.anchor_targets, vec!["#for-loops", "#missing"]);
        assert!(scan.has_target("#for-loops"));
        assert!(!scan.has_target("#missing"));
        assert!(!scan.has_target("#"));
    }

    #[test]
    fn forms_outside_a_quiz_are_not_intercepted() {
        let scan = InteractiveScan::of_fragment("<form></form><div class='quiz'></div>");
        assert_eq!(scan.quiz_forms, 0);
    }

    #[test]
    fn sidebar_items_keep_rows_without_a_topic() {
        let items = sidebar_items(
            r#"<ul class="sidebar">
                 <li>Python</li>
                 <li data-topic="python-intro">Introduction</li>
                 <li data-topic="python-loops">Loops</li>
               </ul>"#,
        );
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].label, "Python");
        assert!(items[0].topic.is_none());
        assert_eq!(items[1].topic.as_deref(), Some("python-intro"));
        assert_eq!(items[2].label, "Loops");
    }

    #[test]
    fn fragment_text_flattens_markup() {
        let text = fragment_text("<h2>For loops</h2><p>Iterate with <code>for</code>.</p>");
        assert_eq!(text, "For loops\nIterate with\nfor\n.");
    }
}
