//! Snippet sanitization
//!
//! Snippets are copied verbatim out of source documents, which are often
//! HTML. They are cleaned on the way out of the index, never on the way in.

use lineage_domain::traits::SnippetSanitizer;
use regex::Regex;

/// Strips markup and control characters from snippets
///
/// HTML comments and tags are removed; control characters other than
/// newline and tab are dropped. Entities are left encoded. Plain text
/// passes through unchanged.
#[derive(Debug, Clone)]
pub struct HtmlSnippetSanitizer {
    comment: Regex,
    tag: Regex,
    control: Regex,
}

impl HtmlSnippetSanitizer {
    /// Compile the sanitizer's patterns
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            tag: Regex::new(r"</?[A-Za-z][^<>]*>")?,
            control: Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]")?,
        })
    }
}

impl SnippetSanitizer for HtmlSnippetSanitizer {
    fn sanitize(&self, snippet: &str) -> String {
        let without_comments = self.comment.replace_all(snippet, "");
        let without_tags = self.tag.replace_all(&without_comments, "");
        self.control.replace_all(&without_tags, "").into_owned()
    }
}
