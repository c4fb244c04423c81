//! Infrastructure adapters

mod body;
mod reqwest_exchange;
mod system_clock;

pub(crate) use body::{BodyError, MAX_BODY_BYTES, read_limited};
pub use reqwest_exchange::ReqwestExchangeClient;
pub use system_clock::SystemClock;
