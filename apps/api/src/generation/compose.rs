// Turns an inbound form into the base prompt a batch is generated from.
// Precedence: document text, then custom text, then the topic picker.

use crate::generation::orchestrator::PostBrief;
use crate::ingest::document_prompt::document_prompt;
use crate::models::LengthBucket;

/// Topic picker value meaning "no particular topic".
pub const ALL_TOPICS: &str = "All";

pub const GENERAL_TOPIC_PROMPT: &str =
    "Generate a LinkedIn post about professional growth and career development.";

const VOICE_HINT: &str = "Write in a natural LinkedIn voice (professional, clear).";

/// Raw form fields, as submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormInput<'a> {
    pub topic: Option<&'a str>,
    pub custom_prompt: Option<&'a str>,
    pub document_text: Option<&'a str>,
}

pub fn base_prompt(form: FormInput<'_>) -> String {
    if let Some(doc) = non_blank(form.document_text) {
        return document_prompt(doc);
    }
    if let Some(custom) = non_blank(form.custom_prompt) {
        return custom.to_string();
    }
    match non_blank(form.topic) {
        None => GENERAL_TOPIC_PROMPT.to_string(),
        Some(topic) if topic == ALL_TOPICS => GENERAL_TOPIC_PROMPT.to_string(),
        Some(topic) => format!("Generate a LinkedIn post about {topic}."),
    }
}

/// One line of length and language guidance appended to the base prompt.
pub fn delivery_hint(length: LengthBucket, language: &str) -> String {
    let mut parts = vec![match length {
        LengthBucket::Short => {
            "Keep it short and concise (about 2-3 short paragraphs or ~40-80 words)."
        }
        LengthBucket::Medium => {
            "Write a medium-length LinkedIn-style post (about 3-5 short paragraphs or ~100-160 words)."
        }
        LengthBucket::Long => {
            "Write a long, detailed LinkedIn-style post (more depth, 5+ paragraphs or ~200+ words)."
        }
    }
    .to_string()];

    let language = language.trim();
    if !language.is_empty() {
        parts.push(format!("Write the post in {language}."));
    }
    parts.push(VOICE_HINT.to_string());
    parts.join(" ")
}

pub fn compose_prompt(base: &str, length: LengthBucket, language: &str) -> String {
    format!("{}\n\n{}", base.trim(), delivery_hint(length, language))
}

/// The shared batch inputs for a form. Custom text is carried separately as
/// well, so prompts can fence it as the dominant instruction.
pub fn brief_from_form(form: FormInput<'_>, length: LengthBucket, language: &str) -> PostBrief {
    PostBrief {
        topic: compose_prompt(&base_prompt(form), length, language),
        length,
        language: language.trim().to_string(),
        custom_instruction: non_blank(form.custom_prompt).map(str::to_string),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
