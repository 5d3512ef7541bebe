//! Test doubles for the completion and sleep seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::generation::orchestrator::Sleeper;
use crate::llm_client::prompts::HASHTAGS_ONLY_RULES;
use crate::llm_client::{LlmError, TextCompletion};

pub fn rate_limited() -> Result<String, LlmError> {
    Err(LlmError::RateLimited { retry_after: None })
}

pub fn transport_error(message: &str) -> Result<String, LlmError> {
    Err(LlmError::Transport {
        status: Some(502),
        message: message.to_string(),
    })
}

type Script = Mutex<VecDeque<Result<String, LlmError>>>;

/// Replays scripted replies. Post and hashtag prompts have separate scripts;
/// once a script runs dry the fallback reply (if any) is returned. Post
/// prompts containing a routed marker draw from that marker's script first,
/// so concurrent jobs get their replies regardless of call order.
#[derive(Default)]
pub struct ScriptedCompletion {
    routed: Vec<(String, Script)>,
    posts: Mutex<VecDeque<Result<String, LlmError>>>,
    hashtags: Mutex<VecDeque<Result<String, LlmError>>>,
    post_fallback: Option<String>,
    hashtag_fallback: Option<String>,
    latency: Option<Duration>,
    post_prompts: Mutex<Vec<String>>,
    hashtag_prompts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new(
        posts: Vec<Result<String, LlmError>>,
        hashtags: Vec<Result<String, LlmError>>,
    ) -> Self {
        Self {
            posts: Mutex::new(posts.into()),
            hashtags: Mutex::new(hashtags.into()),
            ..Self::default()
        }
    }

    pub fn repeating(post: &str, hashtags: &str) -> Self {
        Self {
            post_fallback: Some(post.to_string()),
            hashtag_fallback: Some(hashtags.to_string()),
            ..Self::default()
        }
    }

    pub fn with_replies_for(
        mut self,
        marker: &str,
        replies: Vec<Result<String, LlmError>>,
    ) -> Self {
        self.routed
            .push((marker.to_string(), Mutex::new(replies.into())));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn post_prompts(&self) -> Vec<String> {
        self.post_prompts.lock().unwrap().clone()
    }

    pub fn hashtag_prompts(&self) -> Vec<String> {
        self.hashtag_prompts.lock().unwrap().clone()
    }

    pub fn post_calls(&self) -> usize {
        self.post_prompts.lock().unwrap().len()
    }

    pub fn hashtag_calls(&self) -> usize {
        self.hashtag_prompts.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, prompt: &str) -> Result<String, LlmError> {
        let (script, log, fallback) = if prompt.contains(HASHTAGS_ONLY_RULES) {
            (&self.hashtags, &self.hashtag_prompts, &self.hashtag_fallback)
        } else {
            (&self.posts, &self.post_prompts, &self.post_fallback)
        };
        log.lock().unwrap().push(prompt.to_string());

        let routed = self
            .routed
            .iter()
            .filter(|_| !prompt.contains(HASHTAGS_ONLY_RULES))
            .filter(|(marker, _)| prompt.contains(marker.as_str()))
            .find_map(|(_, replies)| replies.lock().unwrap().pop_front());
        if let Some(reply) = routed {
            return reply;
        }

        let scripted = script.lock().unwrap().pop_front();
        match (scripted, fallback) {
            (Some(reply), _) => reply,
            (None, Some(text)) => Ok(text.clone()),
            (None, None) => transport_error("script exhausted"),
        }
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(
        &self,
        prompt: &str,
        _temperature: f32,
        _model_id: &str,
    ) -> Result<String, LlmError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let reply = self.next_reply(prompt);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}

/// Records requested waits and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
