pub mod trainer;

pub use trainer::{TrainOptions, TrainOutcome, train};
