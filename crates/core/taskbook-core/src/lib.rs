//! Core domain types shared by every taskbook crate.
//!
//! The server is the only source of truth for [`Task`] records; the types here
//! describe the wire shape the client reads and writes, plus the small amount
//! of logic that is evaluated locally (date ordering and completion status).

pub mod clock;
pub mod completion;
pub mod date;
pub mod task;
pub mod user;

pub use clock::{Clock, FixedClock, SystemClock};
pub use completion::{Completion, Partition, partition};
pub use date::{DateError, parse_date};
pub use task::{Task, TaskDraft, TaskId};
pub use user::{Session, User};
