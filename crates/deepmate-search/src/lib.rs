//! Iterative-deepening alpha-beta search.
//!
//! The search is single-threaded, depth-first recursion. The only
//! concurrency is a timer thread that raises a shared cancellation flag on
//! budget expiry; every recursive call checks the flag at entry and unwinds
//! with [`Cancelled`] once it is set. A cancelled depth contributes nothing
//! to the final answer; the engine returns the deepest fully completed
//! iteration.

mod engine;
mod history;
mod time;

pub use engine::{Cancelled, SearchEngine, SearchResult};
pub use history::HistoryTable;
pub use time::TimeControl;
