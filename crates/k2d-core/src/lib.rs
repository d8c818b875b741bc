pub mod error;
pub mod types;

pub use error::Key2DynError;
pub use types::*;
