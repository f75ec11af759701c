//! Command implementations.

pub mod consult;
pub mod login;
pub mod submit;
