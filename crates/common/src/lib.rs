//! Common types shared by the Instagram Graph client and its CLI

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::{Secret, resolve_secret};
