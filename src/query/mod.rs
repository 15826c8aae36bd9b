//! Read-only log view over the loaded sequence
//!
//! Filters by item and case (AND-ed), orders chronologically or newest
//! first, and truncates at an optional limit. Evaluation is lazy.

mod filter;
mod view;

pub use filter::RecordFilter;
pub use view::{LogQuery, LogView, Order};
