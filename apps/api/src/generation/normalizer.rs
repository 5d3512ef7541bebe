//! Result normalization: turns whatever the model returned into one canonical
//! `{post, hashtags, engagement}` record.
//!
//! The shape is decided once at the transport boundary (`RawOutput`). Plain
//! text still goes through the fallback chain, because models routinely wrap
//! a JSON object in prose or escape it:
//!
//! 1. strict JSON object
//! 2. lenient literal (single quotes, `True`/`None`, trailing commas)
//! 3. un-escape, then the span from the first `{` to the last `}`
//! 4. the whole un-escaped text is the post, with no hashtags
//!
//! Failing every parse is not an error; it is step 4.

use serde_json::Value;
use tracing::debug;

use crate::generation::literal::parse_literal;
use crate::generation::prompts::MAX_HASHTAGS;

/// Characters per engagement point. The proxy is `round(chars / 250, 2)`.
const ENGAGEMENT_CHARS_PER_POINT: f64 = 250.0;

const POST_KEYS: [&str; 3] = ["post", "text", "content"];
const HASHTAG_KEYS: [&str; 2] = ["hashtags", "tags"];

/// Model output, classified once where the text leaves the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    Structured(Value),
    PlainText(String),
}

impl RawOutput {
    /// A completion that is, in full, a JSON object is structured; anything
    /// else stays text and takes the fallback chain.
    pub fn from_completion(text: &str) -> Self {
        match serde_json::from_str::<Value>(strip_json_fences(text)) {
            Ok(value @ Value::Object(_)) => RawOutput::Structured(value),
            _ => RawOutput::PlainText(text.to_string()),
        }
    }
}

/// Canonical post record, without the per-job failure fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub post_text: String,
    pub hashtags: Vec<String>,
    pub engagement_score: f64,
}

pub fn normalize(raw: RawOutput) -> NormalizedPost {
    match raw {
        RawOutput::Structured(value) => from_structured(&value),
        RawOutput::PlainText(text) => normalize_text(&text),
    }
}

/// Length-based engagement placeholder. Not a prediction.
pub fn engagement_score(post_text: &str) -> f64 {
    let chars = post_text.chars().count() as f64;
    (chars / ENGAGEMENT_CHARS_PER_POINT * 100.0).round() / 100.0
}

fn normalize_text(raw: &str) -> NormalizedPost {
    let trimmed = raw.trim();
    let candidate = strip_json_fences(trimmed);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
        return from_structured(&value);
    }

    if let Ok(value @ Value::Object(_)) = parse_literal(candidate) {
        debug!("Normalized completion via lenient literal parse");
        return from_structured(&value);
    }

    let unescaped = unescape_sequences(trimmed);

    // An embedded object only counts when it carries a post; `{}` in prose or
    // a code snippet leaves the whole text as the post.
    if let Some(value) = brace_span(&unescaped)
        .and_then(parse_object)
        .filter(|v| structured_post(v).is_some())
    {
        debug!("Normalized completion via embedded object span");
        return from_structured(&value);
    }

    build(&unescaped, Vec::new())
}

fn parse_object(span: &str) -> Option<Value> {
    serde_json::from_str::<Value>(span)
        .ok()
        .or_else(|| parse_literal(span).ok())
        .filter(Value::is_object)
}

/// First non-empty value among the post keys.
fn structured_post(value: &Value) -> Option<String> {
    POST_KEYS
        .iter()
        .filter_map(|k| value.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null => None,
            other => Some(other.to_string()),
        })
}

fn from_structured(value: &Value) -> NormalizedPost {
    let post = structured_post(value).unwrap_or_default();

    let hashtags = HASHTAG_KEYS
        .iter()
        .find_map(|k| value.get(*k))
        .map(hashtag_values)
        .unwrap_or_default();

    build(&post, hashtags)
}

fn hashtag_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn build(post: &str, hashtags: Vec<String>) -> NormalizedPost {
    let post_text = clean_post_text(post);
    let engagement_score = engagement_score(&post_text);
    NormalizedPost {
        post_text,
        hashtags: clean_hashtags(hashtags),
        engagement_score,
    }
}

/// Cleanup applied to every post regardless of how it was recovered.
pub fn clean_post_text(post: &str) -> String {
    let text = post
        .replace("\\/", "/")
        .replace("\\n", "\n")
        .replace('\\', "");
    let text = collapse_runs(&text, |c| c == '.', "...");
    let text = collapse_runs(&text, |c| c == '-', "---");
    let text = collapse_runs(&text, char::is_whitespace, "  ");
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.trim_matches(|c: char| matches!(c, ' ' | '\n' | '\r' | '\t' | '"' | '\''))
        .to_string()
}

/// Trims, drops empties, `#`-prefixes and caps at `MAX_HASHTAGS`.
pub fn clean_hashtags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .filter_map(|t| {
            let t = t.trim();
            let bare = t.trim_start_matches('#').trim();
            if bare.is_empty() {
                None
            } else {
                Some(format!("#{bare}"))
            }
        })
        .take(MAX_HASHTAGS)
        .collect()
}

/// Replaces every run of 3+ chars matching `pred` with `replacement`.
fn collapse_runs(text: &str, pred: impl Fn(char) -> bool, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();

    for c in text.chars() {
        if pred(c) {
            run.push(c);
        } else {
            flush_run(&mut run, &mut out, replacement);
            out.push(c);
        }
    }
    flush_run(&mut run, &mut out, replacement);
    out
}

fn flush_run(run: &mut String, out: &mut String, replacement: &str) {
    if run.chars().count() >= 3 {
        out.push_str(replacement);
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// Resolves common backslash escapes. Unknown escapes are kept as written.
fn unescape_sequences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex: String = (0..4)
                    .filter_map(|_| chars.next_if(char::is_ascii_hexdigit))
                    .collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// The span from the first `{` to the last `}`, if both exist in that order.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// First-pass tidy of a raw completion: unify line endings, trim each line
/// and collapse consecutive blank lines.
pub fn tidy_completion(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut out: Vec<&str> = Vec::new();
    let mut prev_blank = false;

    for line in normalized.split('\n').map(str::trim) {
        let is_blank = line.is_empty();
        if is_blank && prev_blank {
            continue;
        }
        out.push(line);
        prev_blank = is_blank;
    }

    out.join("\n").trim().to_string()
}
