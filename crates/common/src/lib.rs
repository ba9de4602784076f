//! Common types shared across the Apple Music CLI workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
