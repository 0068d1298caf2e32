//! Permission system for checking user roles.
//!
//! The only question this bot ever asks is "is this user the chat creator
//! or an administrator?" — it decides moderation exemption and gates every
//! configuration surface. Lookups are cached; a failed lookup degrades to
//! "not admin" at the call sites.

mod checker;

pub use checker::Permissions;
