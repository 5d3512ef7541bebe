//! Generation orchestrator: runs one or many post jobs against the
//! completion provider without tripping its rate limits.
//!
//! Per job: post call (retried on throttling) → normalize → best-effort
//! hashtag call → engagement proxy. Per batch: sequential with a fixed delay
//! between jobs (default), or parallel with at most `MAX_PARALLEL_JOBS` in
//! flight.
//!
//! The batch contract is total. Every submitted job yields exactly one
//! `GenerationResult`; failures are values, never errors.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::generation::normalizer::{
    clean_hashtags, engagement_score, normalize, tidy_completion, RawOutput,
};
use crate::generation::prompts::{build_hashtag_prompt, build_post_prompt, parse_hashtag_reply};
use crate::generation::tone::{
    styled_topic, VariantSpec, DEFAULT_TONE, SINGLE_LABEL, STYLE_VARIANTS, TONE_VARIANTS,
};
use crate::llm_client::{LlmError, TextCompletion};
use crate::models::{BatchResult, GenerationRequest, GenerationResult, LengthBucket};

/// Pause before every sequential job except the first.
pub const INTER_JOB_DELAY: Duration = Duration::from_secs(2);
/// Worker cap for parallel batches.
pub const MAX_PARALLEL_JOBS: usize = 2;

// ────────────────────────────────────────────────────────────────────────────
// Seams
// ────────────────────────────────────────────────────────────────────────────

/// Every deliberate wait goes through here so tests can observe delays
/// without spending them.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Linear backoff on throttling: wait `attempt × backoff_unit` before the
/// next attempt, up to `max_attempts` attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// Provider parameters. Configuration, not core logic.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub post_temperature: f32,
    pub hashtag_temperature: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// The inputs a whole batch shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostBrief {
    pub topic: String,
    pub length: LengthBucket,
    pub language: String,
    pub custom_instruction: Option<String>,
}

/// One job of a batch. `key` is unique within the batch.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub key: String,
    pub request: GenerationRequest,
    /// Hashtags are always requested for the brief's topic, never for the
    /// tone- or style-augmented prompt.
    pub hashtag_topic: String,
}

impl JobSpec {
    pub fn single(brief: &PostBrief) -> Self {
        Self::with_tone(brief, SINGLE_LABEL, DEFAULT_TONE)
    }

    pub fn custom_tone(brief: &PostBrief, tone: &str) -> Self {
        Self::with_tone(brief, tone, tone)
    }

    pub fn tone_variants(brief: &PostBrief) -> Vec<Self> {
        TONE_VARIANTS
            .iter()
            .map(|v| Self::with_tone(brief, v.label, v.directive))
            .collect()
    }

    /// Style variants replace the custom instruction with a prefixed topic.
    pub fn style_variants(brief: &PostBrief) -> Vec<Self> {
        STYLE_VARIANTS
            .iter()
            .map(|v: &VariantSpec| JobSpec {
                key: v.label.to_string(),
                request: GenerationRequest {
                    topic: styled_topic(
                        v.directive,
                        &brief.topic,
                        brief.custom_instruction.as_deref(),
                    ),
                    length: brief.length,
                    language: brief.language.clone(),
                    tone: DEFAULT_TONE.to_string(),
                    custom_instruction: None,
                },
                hashtag_topic: brief.topic.clone(),
            })
            .collect()
    }

    fn with_tone(brief: &PostBrief, key: &str, tone: &str) -> Self {
        JobSpec {
            key: key.to_string(),
            request: GenerationRequest {
                topic: brief.topic.clone(),
                length: brief.length,
                language: brief.language.clone(),
                tone: tone.to_string(),
                custom_instruction: brief.custom_instruction.clone(),
            },
            hashtag_topic: brief.topic.clone(),
        }
    }
}

/// Lifecycle of a job's primary call.
#[derive(Debug)]
enum JobState {
    Pending,
    Attempting(u32),
    RateLimited { attempt: u32, wait: Duration },
    Succeeded(String),
    Failed(JobFailure),
}

#[derive(Debug)]
enum JobFailure {
    RateLimitExhausted { attempts: u32 },
    Error(LlmError),
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn TextCompletion>,
    sleeper: Arc<dyn Sleeper>,
    settings: ModelSettings,
    retry: RetryPolicy,
    inter_job_delay: Duration,
    max_parallel: usize,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn TextCompletion>, settings: ModelSettings) -> Self {
        Self {
            llm,
            sleeper: Arc::new(TokioSleeper),
            settings,
            retry: RetryPolicy::default(),
            inter_job_delay: INTER_JOB_DELAY,
            max_parallel: MAX_PARALLEL_JOBS,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn generate_single(&self, brief: &PostBrief) -> GenerationResult {
        self.run_job(&JobSpec::single(brief)).await.1
    }

    pub async fn generate_custom_tone(&self, brief: &PostBrief, tone: &str) -> GenerationResult {
        self.run_job(&JobSpec::custom_tone(brief, tone)).await.1
    }

    pub async fn generate_multi_tone(&self, brief: &PostBrief, mode: ExecutionMode) -> BatchResult {
        self.run_batch(JobSpec::tone_variants(brief), mode).await
    }

    pub async fn generate_multi_variant(
        &self,
        brief: &PostBrief,
        mode: ExecutionMode,
    ) -> BatchResult {
        self.run_batch(JobSpec::style_variants(brief), mode).await
    }

    /// Runs `jobs` and returns one result per distinct key.
    pub async fn run_batch(&self, jobs: Vec<JobSpec>, mode: ExecutionMode) -> BatchResult {
        let jobs = dedup_keys(jobs);
        info!("Running batch of {} jobs ({:?})", jobs.len(), mode);

        let mut batch = BatchResult::new();

        match mode {
            ExecutionMode::Sequential => {
                for (idx, job) in jobs.iter().enumerate() {
                    if idx > 0 {
                        self.sleeper.sleep(self.inter_job_delay).await;
                    }
                    let (key, result) = self.run_job(job).await;
                    batch.insert(key, result);
                }
            }
            ExecutionMode::Parallel => {
                let pending: Vec<_> = jobs.iter().map(|job| self.run_job(job)).collect();
                let completed: Vec<(String, GenerationResult)> = stream::iter(pending)
                    .buffer_unordered(self.max_parallel.max(1))
                    .collect()
                    .await;
                for (key, result) in completed {
                    batch.insert(key, result);
                }
            }
        }

        let failed = batch.iter().filter(|(_, r)| r.failed).count();
        info!(
            "Batch complete: {} results, {} failed",
            batch.len(),
            failed
        );
        batch
    }

    async fn run_job(&self, job: &JobSpec) -> (String, GenerationResult) {
        let result = match self.drive_primary(job).await {
            Ok(raw) => self.finish_success(job, &raw).await,
            Err(failure) => failed_result(&job.key, failure),
        };
        (job.key.clone(), result)
    }

    /// Steps the primary call through its states until it is terminal.
    async fn drive_primary(&self, job: &JobSpec) -> Result<String, JobFailure> {
        let request = &job.request;
        let prompt = build_post_prompt(
            &request.topic,
            request.length,
            &request.language,
            &request.tone,
            request.custom_instruction.as_deref(),
        );
        debug!("Post prompt for {}:\n{}", job.key, prompt);

        let mut state = JobState::Pending;
        loop {
            state = match state {
                JobState::Pending => JobState::Attempting(1),
                JobState::Attempting(attempt) => match self
                    .llm
                    .complete(&prompt, self.settings.post_temperature, &self.settings.model)
                    .await
                {
                    Ok(text) => JobState::Succeeded(text),
                    Err(e) if e.is_rate_limit() && attempt < self.retry.max_attempts => {
                        JobState::RateLimited {
                            attempt,
                            wait: self.retry.backoff_for(attempt),
                        }
                    }
                    Err(e) if e.is_rate_limit() => {
                        JobState::Failed(JobFailure::RateLimitExhausted { attempts: attempt })
                    }
                    Err(e) => JobState::Failed(JobFailure::Error(e)),
                },
                JobState::RateLimited { attempt, wait } => {
                    warn!(
                        "Rate limit hit for {}. Waiting {}s before retry {}/{}...",
                        job.key,
                        wait.as_secs_f32(),
                        attempt + 1,
                        self.retry.max_attempts
                    );
                    self.sleeper.sleep(wait).await;
                    JobState::Attempting(attempt + 1)
                }
                JobState::Succeeded(text) => return Ok(text),
                JobState::Failed(failure) => return Err(failure),
            };
        }
    }

    async fn finish_success(&self, job: &JobSpec, raw: &str) -> GenerationResult {
        let normalized = normalize(RawOutput::from_completion(&tidy_completion(raw)));

        if normalized.post_text.is_empty() {
            return failed_result(&job.key, JobFailure::Error(LlmError::EmptyContent));
        }

        let hashtags = match self.fetch_hashtags(&job.key, &job.hashtag_topic).await {
            Some(tags) if !tags.is_empty() => tags,
            _ => normalized.hashtags,
        };

        GenerationResult {
            engagement_score: normalized.engagement_score,
            post_text: normalized.post_text,
            hashtags: clean_hashtags(hashtags),
            variant_label: job.key.clone(),
            failed: false,
            error_detail: None,
        }
    }

    /// Secondary call. No retry; a failure here never fails the job.
    async fn fetch_hashtags(&self, key: &str, topic: &str) -> Option<Vec<String>> {
        let prompt = build_hashtag_prompt(topic);
        match self
            .llm
            .complete(&prompt, self.settings.hashtag_temperature, &self.settings.model)
            .await
        {
            Ok(raw) => Some(parse_hashtag_reply(raw.trim())),
            Err(e) => {
                warn!("Hashtag generation failed for {key}, continuing without: {e}");
                None
            }
        }
    }
}

fn failed_result(label: &str, failure: JobFailure) -> GenerationResult {
    let (post_text, error_detail) = match failure {
        JobFailure::RateLimitExhausted { attempts } => (
            format!(
                "Unable to generate {label} due to rate limits. \
                 Please try again in a moment or switch to single-post generation."
            ),
            format!("rate limited on all {attempts} attempts"),
        ),
        JobFailure::Error(e) => (
            format!("Error generating {label}. Please try again."),
            e.to_string(),
        ),
    };
    warn!("Job {label} failed: {error_detail}");

    GenerationResult {
        engagement_score: engagement_score(&post_text),
        post_text,
        hashtags: Vec::new(),
        variant_label: label.to_string(),
        failed: true,
        error_detail: Some(error_detail),
    }
}

/// Keeps the first job for each key so every key maps to exactly one result.
fn dedup_keys(jobs: Vec<JobSpec>) -> Vec<JobSpec> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| {
            let fresh = seen.insert(job.key.clone());
            if !fresh {
                warn!("Dropping duplicate job key {}", job.key);
            }
            fresh
        })
        .collect()
}
