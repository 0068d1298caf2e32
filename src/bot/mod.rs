//! Bot module - Core bot functionality.

pub mod dispatcher;

pub use dispatcher::{build_dispatcher, AppState, ThrottledBot};
