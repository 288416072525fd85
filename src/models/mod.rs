//! Data models for the school portal.
//!
//! Field names follow the school backend's JSON contract (camelCase).

mod exam;
mod health;
mod menu;
mod school;
mod session;

pub use exam::*;
pub use health::*;
pub use menu::*;
pub use school::*;
pub use session::*;
