//! [`Directory`]-related implementations.

pub mod fixed;
pub mod http;

use derive_more::{Display, Error as StdError, From};

pub use self::{fixed::Fixed, http::Http};

/// Room directory operation.
pub use common::Handler as Directory;

/// [`Directory`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Http`] error.
    Http(http::Error),
}
