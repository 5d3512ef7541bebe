// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments reused by more than one template.

/// Appended to every post prompt: body text only, nothing the caller must strip.
pub const POST_ONLY_INSTRUCTION: &str = "Return ONLY the post text, no extra commentary, no JSON.";

/// Appended to every hashtag prompt.
pub const HASHTAGS_ONLY_RULES: &str = "Rules:\n\
    - Return ONLY hashtags, space-separated.\n\
    - No commentary, no bullets, no numbering.";
