// Prompt construction for post and hashtag generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{HASHTAGS_ONLY_RULES, POST_ONLY_INSTRUCTION};
use crate::models::LengthBucket;

/// Hard cap on hashtags attached to any post.
pub const MAX_HASHTAGS: usize = 8;

pub const USER_PROMPT_START: &str = "USER_PROMPT_START";
pub const USER_PROMPT_END: &str = "USER_PROMPT_END";

const HINDI_INSTRUCTION: &str = "पोस्ट को स्वाभाविक, प्रामाणिक हिंदी में लिखें। शुरुआत से हिंदी में लिखें; अंग्रेज़ी से अनुवाद न करें।";
const KANNADA_INSTRUCTION: &str = "ಪೋಸ್ಟ್ ಅನ್ನು ಸ್ವಾಭಾವಿಕ, ಶುದ್ಧ ಕನ್ನಡದಲ್ಲಿ ಬರೆಯಿರಿ. ಪ್ರಾರಂಭದಿಂದಲೇ ಕನ್ನಡದಲ್ಲಿ ರಚಿಸಿ; ಇಂಗ್ಲಿಷ್‌ನಿಂದ ಅನುವಾದಿಸಬೇಡಿ.";

/// Post prompt template.
/// Replace: {topic}, {language_instruction}, {tone}, {word_range}, {post_only}, {user_fragment}
const POST_PROMPT_TEMPLATE: &str = r#"You are an expert LinkedIn post writer.

Topic: "{topic}"
{language_instruction}
Tone: {tone}
Target length: {word_range}.

Structure:
- Start with a short hook (1 sentence).
- Include 2–4 short paragraphs or bullet points with insights/lessons.
- End with a concise CTA or a question to invite comments.

Formatting:
- Use clean line breaks and simple bullets.
- Sound human and professional; avoid robotic phrasing.
- DO NOT include hashtags (they will be generated separately).

{post_only}
{user_fragment}"#;

/// Hashtag prompt template. Replace: {topic}, {rules}
const HASHTAG_PROMPT_TEMPLATE: &str = r#"Generate 8 short, relevant LinkedIn hashtags for this topic:
{topic}

{rules}"#;

/// The language line of the post prompt. Languages with first-class support
/// get a native-script "write natively, do not translate" instruction.
pub fn language_instruction(language: &str) -> String {
    match language.trim().to_lowercase().as_str() {
        "english" => "Write the post in natural, native English.".to_string(),
        "hindi" => HINDI_INSTRUCTION.to_string(),
        "kannada" => KANNADA_INSTRUCTION.to_string(),
        _ => format!("Write the post in {}.", language.trim()),
    }
}

/// Builds the instruction for one post body.
///
/// A non-blank `custom_text` becomes the dominant instruction, fenced by
/// `USER_PROMPT_START` / `USER_PROMPT_END`.
pub fn build_post_prompt(
    topic: &str,
    length: LengthBucket,
    language: &str,
    tone: &str,
    custom_text: Option<&str>,
) -> String {
    let user_fragment = match custom_text.map(str::trim).filter(|s| !s.is_empty()) {
        Some(snippet) => format!(
            "\nIMPORTANT: Incorporate the following user instruction as the main focus. \
             Do NOT ignore it. Use the exact context to guide the content.\n\
             {USER_PROMPT_START}\n{snippet}\n{USER_PROMPT_END}\n"
        ),
        None => String::new(),
    };

    POST_PROMPT_TEMPLATE
        .replace("{language_instruction}", &language_instruction(language))
        .replace("{tone}", tone)
        .replace("{word_range}", length.word_range())
        .replace("{post_only}", POST_ONLY_INSTRUCTION)
        .replace("{topic}", topic)
        // user text goes in last so it is never scanned for placeholders
        .replace("{user_fragment}", &user_fragment)
}

/// Builds the secondary prompt that asks for hashtags only.
pub fn build_hashtag_prompt(topic: &str) -> String {
    HASHTAG_PROMPT_TEMPLATE
        .replace("{rules}", HASHTAGS_ONLY_RULES)
        .replace("{topic}", topic)
}

/// Parses the hashtag call's reply: whitespace-separated, `#`-prefixed, capped.
/// Bare `#` tokens are dropped before the cap.
pub fn parse_hashtag_reply(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .filter(|t| !t.trim_start_matches('#').is_empty())
        .map(|t| {
            if t.starts_with('#') {
                t.to_string()
            } else {
                format!("#{t}")
            }
        })
        .take(MAX_HASHTAGS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_prompt_states_word_range() {
        let p = build_post_prompt("AI", LengthBucket::Short, "English", "professional", None);
        assert!(p.contains("Target length: 30-60 words."));
        let p = build_post_prompt("AI", LengthBucket::Long, "English", "professional", None);
        assert!(p.contains("Target length: 220-320 words."));
    }

    #[test]
    fn test_post_prompt_carries_topic_and_tone() {
        let p = build_post_prompt(
            "Teamwork",
            LengthBucket::Medium,
            "English",
            "friendly, conversational, and approachable",
            None,
        );
        assert!(p.contains(r#"Topic: "Teamwork""#));
        assert!(p.contains("Tone: friendly, conversational, and approachable"));
    }

    #[test]
    fn test_post_prompt_forbids_hashtags_and_commentary() {
        let p = build_post_prompt("AI", LengthBucket::Medium, "English", "professional", None);
        assert!(p.contains("DO NOT include hashtags"));
        assert!(p.contains("Return ONLY the post text"));
    }

    #[test]
    fn test_custom_text_is_fenced_by_markers() {
        let p = build_post_prompt(
            "AI",
            LengthBucket::Medium,
            "English",
            "professional",
            Some("  I finished my first internship  "),
        );
        let start = p.find(USER_PROMPT_START).expect("start marker");
        let end = p.find(USER_PROMPT_END).expect("end marker");
        assert!(start < end);
        assert!(p[start..end].contains("I finished my first internship"));
        assert!(p.contains("Do NOT ignore it."));
    }

    #[test]
    fn test_blank_custom_text_is_omitted() {
        let p = build_post_prompt("AI", LengthBucket::Medium, "English", "professional", Some("   "));
        assert!(!p.contains(USER_PROMPT_START));
    }

    #[test]
    fn test_custom_text_with_braces_is_left_alone() {
        let p = build_post_prompt(
            "{topic}",
            LengthBucket::Medium,
            "English",
            "professional",
            Some("use {tone} literally"),
        );
        assert!(p.contains("use {tone} literally"));
        assert!(p.contains(r#"Topic: "{topic}""#));
    }

    #[test]
    fn test_native_language_instructions() {
        assert!(language_instruction("english").contains("native English"));
        assert!(language_instruction("Hindi").contains("हिंदी"));
        assert!(language_instruction("KANNADA").contains("ಕನ್ನಡ"));
    }

    #[test]
    fn test_unknown_language_gets_generic_instruction() {
        assert_eq!(language_instruction("French"), "Write the post in French.");
    }

    #[test]
    fn test_hashtag_prompt_is_topic_only() {
        let p = build_hashtag_prompt("Career Growth");
        assert!(p.contains("Career Growth"));
        assert!(p.contains("space-separated"));
        assert!(!p.contains("{topic}"));
    }

    #[test]
    fn test_parse_hashtag_reply_prefixes_and_caps() {
        let tags = parse_hashtag_reply("#AI ml  #Leadership growth a b c d e f");
        assert_eq!(tags.len(), MAX_HASHTAGS);
        assert_eq!(tags[0], "#AI");
        assert_eq!(tags[1], "#ml");
        assert!(tags.iter().all(|t| t.starts_with('#')));
    }

    #[test]
    fn test_bare_hash_tokens_do_not_use_up_the_cap() {
        let tags = parse_hashtag_reply("# a b c d e ## f g h i");
        assert_eq!(
            tags,
            vec!["#a", "#b", "#c", "#d", "#e", "#f", "#g", "#h"]
        );
    }

    #[test]
    fn test_parse_empty_hashtag_reply() {
        assert!(parse_hashtag_reply("   \n").is_empty());
    }
}
