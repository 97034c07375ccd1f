//! Request handlers.

pub mod assistant;
pub mod health;

pub use assistant::*;
pub use health::*;
