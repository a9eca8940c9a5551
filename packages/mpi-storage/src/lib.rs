pub mod db;
pub mod duplicates;
pub mod fields;
pub mod index;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
