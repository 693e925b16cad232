pub mod client;
pub mod error;
pub mod pool;
pub mod request;
pub mod response;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::{Client, Credentials, HttpTransport, ReqwestTransport, ThrottlePolicy};
pub use error::ClientError;
pub use pool::ClientPool;
pub use session::RemoteSession;
