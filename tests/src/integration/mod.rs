//! # Integration Flows
//!
//! Exercises the ledger through its public API only, the way a session and
//! the persistence executor drive it.

pub mod unit_of_work_flows;
