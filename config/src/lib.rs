pub mod market;

pub use market::{ConfigError, MarketConfig};
