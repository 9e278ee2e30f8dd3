//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `WorkflowEngine`, the single writer of
//! subscription and ledger records. It composes the four stores and the
//! notifier under a fixed validation-then-mutation protocol.

pub mod engine;
