//! Pure decision logic: category buckets, risk aggregation, similarity math

pub mod category;
pub mod risk;
pub mod similarity;

pub use category::{categorize, CategoryMatch, DEFAULT_CATEGORY};
pub use risk::{evaluate, RiskPolicy, RiskSignals};
pub use similarity::cosine_similarity;
