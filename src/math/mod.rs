pub mod logistic;

pub use logistic::{log_loss, sigmoid};
