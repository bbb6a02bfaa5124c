//! Expenses domain module.
//!
//! Core logic for recording expenses:
//!
//! - `sink.rs` - the `ExpenseSink` persistence boundary and the Supabase
//!   implementation, plus the validated `NewExpense` record type
//! - `recorder.rs` - the `ExpenseRecorder` write path shared by all transports
//! - `error.rs` - expense-specific error types

mod error;
mod recorder;
mod sink;

pub use error::ExpenseError;
pub use recorder::{ExpenseRecorder, format_cop};
pub use sink::{ExpenseSink, NewExpense, SupabaseSink};
