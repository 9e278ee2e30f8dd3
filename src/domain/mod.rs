//! Domain entities and the store/notifier ports the workflow engine is
//! wired against.

pub mod account;
pub mod fund;
pub mod ledger;
pub mod ports;
pub mod subscription;
