// Post generation: request composition, prompt building, the job
// orchestrator and output normalization.
// All provider calls go through llm_client::TextCompletion.

pub mod compose;
pub mod handlers;
pub mod literal;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
#[cfg(test)]
pub mod testing;
pub mod tone;
