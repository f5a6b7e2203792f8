pub mod error;
pub mod identifier;
pub mod serde_helpers;

pub use error::AppError;
pub use identifier::IdFamily;
