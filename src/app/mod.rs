//! Application state
//!
//! Owned, injected state replacing ambient globals: the user store every
//! screen reads through, and the simulated fast-path session flag.

pub mod dashboard;
pub mod session;
pub mod state;

pub use dashboard::{Dashboard, Notice, NoticeKind};
pub use session::FastPathSession;
pub use state::{StateEvent, UserStore};
