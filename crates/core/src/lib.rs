pub mod config;
pub mod error;
pub mod snapshot;
pub mod types;

pub use config::*;
pub use error::*;
pub use snapshot::*;
pub use types::*;
