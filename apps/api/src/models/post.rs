use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Requested post length. Unknown labels fall back to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum LengthBucket {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthBucket {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "short" => LengthBucket::Short,
            "long" => LengthBucket::Long,
            _ => LengthBucket::Medium,
        }
    }

    /// Approximate target word range stated to the model.
    pub fn word_range(self) -> &'static str {
        match self {
            LengthBucket::Short => "30-60 words",
            LengthBucket::Medium => "120-160 words",
            LengthBucket::Long => "220-320 words",
        }
    }
}

impl From<String> for LengthBucket {
    fn from(label: String) -> Self {
        LengthBucket::from_label(&label)
    }
}

/// One fully-resolved generation job input. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub length: LengthBucket,
    pub language: String,
    /// Tone descriptor handed to the model (e.g. "friendly, conversational").
    pub tone: String,
    pub custom_instruction: Option<String>,
}

/// Canonical record for one generated post, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(rename = "post")]
    pub post_text: String,
    pub hashtags: Vec<String>,
    #[serde(rename = "engagement")]
    pub engagement_score: f64,
    #[serde(rename = "label")]
    pub variant_label: String,
    pub failed: bool,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none", default)]
    pub error_detail: Option<String>,
}

/// Results of one batch keyed by variant label.
///
/// Iteration follows insertion order: submission order for sequential runs,
/// completion order for parallel runs. Look results up by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult(IndexMap<String, GenerationResult>);

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, result: GenerationResult) {
        self.0.insert(key, result);
    }

    pub fn get(&self, key: &str) -> Option<&GenerationResult> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenerationResult)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: &str) -> GenerationResult {
        GenerationResult {
            post_text: format!("{label} post"),
            hashtags: vec!["#ai".to_string()],
            engagement_score: 0.04,
            variant_label: label.to_string(),
            failed: false,
            error_detail: None,
        }
    }

    #[test]
    fn test_length_bucket_from_label_is_case_insensitive() {
        assert_eq!(LengthBucket::from_label("Short"), LengthBucket::Short);
        assert_eq!(LengthBucket::from_label(" LONG "), LengthBucket::Long);
        assert_eq!(LengthBucket::from_label("medium"), LengthBucket::Medium);
    }

    #[test]
    fn test_unknown_length_falls_back_to_medium() {
        assert_eq!(LengthBucket::from_label("epic"), LengthBucket::Medium);
        let parsed: LengthBucket = serde_json::from_str(r#""tweet""#).unwrap();
        assert_eq!(parsed, LengthBucket::Medium);
    }

    #[test]
    fn test_word_ranges() {
        assert_eq!(LengthBucket::Short.word_range(), "30-60 words");
        assert_eq!(LengthBucket::Medium.word_range(), "120-160 words");
        assert_eq!(LengthBucket::Long.word_range(), "220-320 words");
    }

    #[test]
    fn test_result_serializes_with_wire_names() {
        let value = serde_json::to_value(result("Casual")).unwrap();
        assert_eq!(value["post"], "Casual post");
        assert_eq!(value["engagement"], 0.04);
        assert_eq!(value["label"], "Casual");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_batch_result_preserves_insertion_order() {
        let mut batch = BatchResult::new();
        batch.insert("Inspirational".to_string(), result("Inspirational"));
        batch.insert("Professional".to_string(), result("Professional"));
        let keys: Vec<&str> = batch.keys().collect();
        assert_eq!(keys, vec!["Inspirational", "Professional"]);
    }

    #[test]
    fn test_batch_result_serializes_as_object() {
        let mut batch = BatchResult::new();
        batch.insert("Groq".to_string(), result("Groq"));
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["Groq"]["post"], "Groq post");
    }
}
