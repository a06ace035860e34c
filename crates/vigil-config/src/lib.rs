pub mod global;
pub mod loader;
pub mod thresholds;

pub use global::{GlobalConfig, StoreConfig, UiConfig};
pub use loader::ConfigLoader;
pub use thresholds::{ThresholdStore, Thresholds};
