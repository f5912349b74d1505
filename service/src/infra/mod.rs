//! Infrastructure layer.

pub mod database;
pub mod directory;

pub use self::{
    database::{Database, Memory},
    directory::Directory,
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
