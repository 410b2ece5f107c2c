pub mod dispatch;
pub mod envelope;
pub mod server;

pub use dispatch::Dispatcher;
pub use envelope::{Response, RpcError};
pub use server::serve;
