//! Apple Music authentication subsystem
//!
//! Issues the two credentials needed to call the Apple Music API on a
//! user's behalf: an ES256-signed developer token minted from the
//! team's signing key, and a Music user token obtained through a
//! browser-based MusicKit consent flow hosted on a loopback callback
//! server.
//!
//! Credential flow:
//! 1. The CLI builds `DeveloperCredentials` from configuration
//! 2. `developer_token::sign()` mints the 24-hour developer token
//! 3. `flow::obtain_user_token()` serves `/login`, opens the browser,
//!    and polls the `TokenStore` until `/callback` persists the token
//! 4. Subsequent runs reuse the stored token via `TokenStore::read()`

pub mod credentials;
pub mod developer_token;
pub mod error;
pub mod flow;
pub mod server;
pub mod store;

pub use credentials::DeveloperCredentials;
pub use error::{Error, Result};
pub use flow::{AuthFlowOptions, CallbackServer, obtain_user_token, wait_for_token};
pub use server::{ConsentPage, TOKEN_PLACEHOLDER, build_router};
pub use store::TokenStore;
