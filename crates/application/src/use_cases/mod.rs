//! Application use cases (login flow orchestration).

mod complete_login;
mod sign_out;
#[cfg(test)]
mod test_support;

pub use complete_login::{CompleteLogin, LoginCallback};
pub use sign_out::SignOut;
