//! Infrastructure shared by the IR and the backend.

pub mod error;

pub use error::IrError;
