pub mod virality;

pub use virality::{parse_published_at, ScoringWeights, ViralityScorer};
