//! Core navigation model for static curriculum sites: topic identifiers,
//! lesson-path resolution, and the shared error type.

pub mod client;
pub mod fragment;
pub mod history;
pub mod navigator;
#[cfg(feature = "serve")]
pub mod web;

use std::fmt;

/// Composite lesson key of the form `<language>-<lesson>`.
///
/// The language is everything before the first hyphen; the lesson slug keeps
/// any further hyphens (`"python-intro-part-2"` names the `python` lesson
/// file `intro-part-2.html`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    language: String,
    lesson: String,
}

impl Topic {
    /// Parses a topic identifier, rejecting ids without both segments.
    pub fn parse(id: &str) -> Result<Self, NavError> {
        let Some((language, lesson)) = id.split_once('-') else {
            return Err(NavError::InvalidTopic(id.to_string()));
        };
        if language.is_empty() || lesson.is_empty() {
            return Err(NavError::InvalidTopic(id.to_string()));
        }
        Ok(Self {
            language: language.to_string(),
            lesson: lesson.to_string(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn lesson(&self) -> &str {
        &self.lesson
    }

    /// Lesson file name: the slug suffixed with `.html`.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.lesson)
    }

    /// The full `<language>-<lesson>` identifier.
    pub fn id(&self) -> String {
        format!("{}-{}", self.language, self.lesson)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.language, self.lesson)
    }
}

/// Resolves a topic to a lesson URL relative to the current document path.
///
/// Outside `/curriculum/` the target is `curriculum/<lang>/<file>`. Inside,
/// the current language is the second-to-last path segment: same language
/// yields a sibling `<file>`, a different one `../<lang>/<file>`. Assumes
/// exactly one path segment between `/curriculum/` and the leaf; deeper
/// nesting mis-resolves and is left unspecified, matching the site layout.
pub fn resolve_url(topic: &Topic, current_path: &str) -> String {
    let file = topic.file_name();
    if !current_path.contains("/curriculum/") {
        return format!("curriculum/{}/{}", topic.language(), file);
    }
    let parts: Vec<&str> = current_path.split('/').collect();
    let current_lang = parts
        .get(parts.len().saturating_sub(2))
        .copied()
        .unwrap_or_default();
    if topic.language() == current_lang {
        file
    } else {
        format!("../{}/{}", topic.language(), file)
    }
}

/// Address pushed to history for a fetched lesson: the resolved URL with its
/// first `.html` occurrence stripped, rooted at `/`.
pub fn history_url(resolved: &str) -> String {
    format!("/{}", resolved.replacen(".html", "", 1))
}

/// Failures the load sequence can surface. All of them are non-fatal: the
/// navigator reports them through the error panel and keeps running.
#[derive(Debug)]
pub enum NavError {
    /// The lesson page answered with a non-success HTTP status.
    Fetch { status: u16 },
    /// The fetched document has no element with id `description`.
    ContentNotFound,
    Http(reqwest::Error),
    Url(url::ParseError),
    InvalidTopic(String),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::Fetch { status } => write!(f, "fetch error: HTTP status {status}"),
            NavError::ContentNotFound => write!(f, "content not found in loaded page"),
            NavError::Http(err) => write!(f, "http transport error: {err}"),
            NavError::Url(err) => write!(f, "url error: {err}"),
            NavError::InvalidTopic(id) => write!(f, "invalid topic identifier {id:?}"),
        }
    }
}

impl std::error::Error for NavError {}

impl From<reqwest::Error> for NavError {
    fn from(value: reqwest::Error) -> Self {
        NavError::Http(value)
    }
}

impl From<url::ParseError> for NavError {
    fn from(value: url::ParseError) -> Self {
        NavError::Url(value)
    }
}
