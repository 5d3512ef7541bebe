//! Tone and style catalogue: the fixed, ordered job sets behind multi-tone
//! and multi-variant batches.
//!
//! Order matters: it is the submission order of a sequential batch and the
//! display order a client should use.

/// Tone used for single-post generation.
pub const DEFAULT_TONE: &str = "professional";

/// Label under which a single-post result is keyed.
pub const SINGLE_LABEL: &str = "Professional";

/// One entry of a fixed batch: the key it is reported under and the text that
/// shapes the prompt (a tone descriptor or a style instruction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub label: &'static str,
    pub directive: &'static str,
}

/// Tone variants. `directive` is passed verbatim as the prompt's tone.
pub const TONE_VARIANTS: [VariantSpec; 3] = [
    VariantSpec {
        label: "Professional",
        directive: "formal, business-appropriate, and polished",
    },
    VariantSpec {
        label: "Casual",
        directive: "friendly, conversational, and approachable",
    },
    VariantSpec {
        label: "Inspirational",
        directive: "uplifting, motivational, and energizing",
    },
];

/// Model-style variants. All three go to the same model; the style is
/// simulated by prefixing `directive` to the base topic.
pub const STYLE_VARIANTS: [VariantSpec; 3] = [
    VariantSpec {
        label: "Llama-3.1-8B",
        directive: "Respond in a concise, neutral style similar to a smaller LLM (brief, exact).",
    },
    VariantSpec {
        label: "Llama-3.1-70B",
        directive: "Respond with a richer, more detailed style (longer reasoning, more examples).",
    },
    VariantSpec {
        label: "Groq",
        directive: "Respond in a crisp, fast style with practical examples and short paragraphs.",
    },
];

/// Builds the topic for a style variant: instruction, blank line, base text.
/// The base is the custom text when present, otherwise the topic.
pub fn styled_topic(directive: &str, topic: &str, custom_text: Option<&str>) -> String {
    let base = custom_text
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(topic);
    format!("{directive}\n\n{base}").trim().to_string()
}
