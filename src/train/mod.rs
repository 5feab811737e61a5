pub mod compare;
pub mod loop_fn;
pub mod report;
pub mod train_config;

pub use compare::{argmax_match, rounded_match, within_tolerance};
pub use loop_fn::{test, train};
pub use report::{TestResults, TrainReport};
pub use train_config::{TestConfig, TrainConfig};
