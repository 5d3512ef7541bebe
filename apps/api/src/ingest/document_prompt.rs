// Turns extracted document text into a base prompt. The document is
// classified by keyword so the prompt asks for the right kind of post.

/// Characters of document content embedded in the prompt.
pub const PROMPT_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    Presentation,
    Report,
    Document,
}

/// First matching group wins; checked in declaration order.
const KEYWORDS: [(DocumentKind, &[&str]); 3] = [
    (
        DocumentKind::Resume,
        &["resume", "cv", "experience", "education", "skills"],
    ),
    (
        DocumentKind::Presentation,
        &["slide", "presentation", "agenda"],
    ),
    (
        DocumentKind::Report,
        &["report", "analysis", "findings", "conclusion"],
    ),
];

impl DocumentKind {
    /// Case-insensitive substring match, so "cv" also matches inside words.
    pub fn classify(content: &str) -> Self {
        let lower = content.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(kind, _)| *kind)
            .unwrap_or(DocumentKind::Document)
    }

    fn template(self) -> &'static str {
        match self {
            DocumentKind::Resume => {
                "Based on this resume/CV content, create a professional LinkedIn post highlighting:\n\
                 - Key achievements and skills\n\
                 - Career progression or milestones\n\
                 - Professional value proposition"
            }
            DocumentKind::Presentation => {
                "Based on this presentation, create a LinkedIn post that:\n\
                 - Summarizes the key insights\n\
                 - Highlights main takeaways\n\
                 - Engages the audience with the core message"
            }
            DocumentKind::Report => {
                "Based on this report, create a LinkedIn post that:\n\
                 - Shares the most important findings\n\
                 - Provides actionable insights\n\
                 - Invites professional discussion"
            }
            DocumentKind::Document => {
                "Based on this document, create an engaging LinkedIn post that:\n\
                 - Captures the main ideas\n\
                 - Adds professional context\n\
                 - Encourages meaningful engagement"
            }
        }
    }
}

pub fn document_prompt(content: &str) -> String {
    let kind = DocumentKind::classify(content);
    let excerpt: String = content.chars().take(PROMPT_CONTENT_CHARS).collect();
    format!("{}\n\nContent:\n{excerpt}", kind.template())
}
