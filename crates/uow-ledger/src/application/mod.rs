//! Application layer for the unit-of-work ledger

pub mod change_set;
pub mod ledger;

pub use change_set::ChangeSet;
pub use ledger::OperationLedger;
