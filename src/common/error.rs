//! Error values for the IR core.
//!
//! Construction-time validation failures are programming errors in compiler
//! passes, not recoverable conditions, but they surface as typed values so a
//! pass can wrap them in a higher-level diagnostic before aborting. Every
//! message carries the mnemonic of the instruction being constructed.
//!
//! Emission-time unsupported constructs and graph-bookkeeping violations
//! (`repl_pred` with an unknown predecessor, a missing `gen_code`) are fatal
//! and panic with a message naming the instruction; they never reach this
//! type.

use thiserror::Error;

/// Errors produced while building IR values and instructions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    /// An instruction initialiser rejected its arguments. The reason is the
    /// initialiser's own diagnostic; the mnemonic is prepended for context.
    #[error("{mnemonic}: {reason}")]
    Construction { mnemonic: String, reason: String },

    /// A constant literal was requested at a type that cannot hold it
    /// (fractional literal at an integer type, string outside `box`).
    #[error("constant {literal} is not valid at type {ty}")]
    BadConstant { literal: String, ty: &'static str },

    /// A formal parameter declared at `none` or at a type the target
    /// platform does not carry (the 64-bit integers on 32-bit targets).
    #[error("argument {name} cannot have type {ty} on this platform")]
    BadArgType { name: String, ty: &'static str },

    /// A phi input whose type disagrees with the phi's established type.
    #[error("phi: incoming value of type {got} does not match phi type {want}")]
    PhiTypeMismatch { got: &'static str, want: &'static str },
}

impl IrError {
    /// Wrap an initialiser diagnostic with the mnemonic it was raised for.
    pub fn construction(mnemonic: &str, reason: impl Into<String>) -> Self {
        IrError::Construction { mnemonic: mnemonic.to_string(), reason: reason.into() }
    }
}
