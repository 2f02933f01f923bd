//! # zkt-state: Thread Lifecycle
//!
//! Implements the lifecycle that gates every other operation on a thread.
//!
//! ```text
//! NotStarted ──start()──▶ Active ◀──resume()── Paused
//!                           │  └────pause()────▶ │
//!                           │                    │
//!                           └──end()──▶ Ended ◀──┘
//! ```
//!
//! Threads live in a keyed map and arrive as runtime data, so the state is
//! a value (`ThreadStatus`) checked on every call rather than a type
//! parameter. Invalid transitions return `LifecycleError` with the current
//! state, the attempted target and the precondition that failed.

pub mod thread;

pub use thread::{JoinPolicy, LifecycleError, ThreadLifecycle, ThreadStatus, TransitionRecord};
