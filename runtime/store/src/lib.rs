pub mod market;
pub mod types;

pub use market::MarketStore;
pub use types::{StoreError, StoreResult};
