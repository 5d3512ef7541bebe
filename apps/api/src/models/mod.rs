pub mod post;

pub use post::{BatchResult, GenerationRequest, GenerationResult, LengthBucket};
