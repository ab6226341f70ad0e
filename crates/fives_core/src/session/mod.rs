//! Post-session pipeline
//!
//! `processor` turns a finished session and the club roster into updated
//! player records, rating breakdowns and news. `history` holds the career,
//! monthly, record and ring-buffer bookkeeping.

pub mod history;
mod processor;

pub use processor::{SessionOutcome, SessionProcessor};
