//! Administrator authentication: password verification and bearer tokens.

pub mod password;
pub mod token;
