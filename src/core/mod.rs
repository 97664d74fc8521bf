pub mod commands;
pub mod hooks;
pub mod session;

pub use hooks::{Hook, HookFn, HookRegistry};
pub use session::Session;
