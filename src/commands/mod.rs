//! Command implementations
//!
//! Each command is a module whose functions take the parsed CLI args and a
//! [`Session`](crate::session::Session) and run the operation against the
//! repository it names.

pub mod issue;
pub mod label;
pub mod milestone;
