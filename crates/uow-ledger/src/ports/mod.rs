//! Ports module for the unit-of-work ledger
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::UnitOfWorkApi;
pub use outbound::MappingProvider;
