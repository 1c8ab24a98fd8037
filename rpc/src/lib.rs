pub mod handlers;
pub mod server;
pub mod types;

pub use server::RpcServer;
pub use types::*;
