pub mod advisor;
pub mod estimator;
pub mod matcher;
pub mod queue;
pub mod tokenizer;
pub mod workbook;

pub use advisor::{GeminiAdvisor, RateAdvisor, Suggestion};
pub use estimator::EstimationService;
pub use queue::{QueueError, RateLimitedQueue};
