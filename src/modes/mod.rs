pub mod evaluate;
pub mod train;

pub use evaluate::{EvaluateConfig, EvaluateMode};
pub use train::{EpisodeSummary, TrainConfig, TrainMode};
