//! Business layer of the relay: the TikTok OAuth handshake and the
//! authenticated Open API calls made on behalf of a signed-in caller.
pub use gateway::tiktok::UserIdentity;

pub mod error;
pub mod gateway;
pub mod oauth_state;
pub mod tiktok_oauth;
