//! CLI command implementations.

pub mod common;
pub mod inspect;
pub mod route;
pub mod scenes;
pub mod simulate;
pub mod validate;
