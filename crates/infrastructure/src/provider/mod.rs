//! Provider login adapters.

mod channel_login;
mod static_login;

pub use channel_login::{ChannelProviderLogin, LoginResultSender, channel_login};
pub use static_login::StaticProviderLogin;
