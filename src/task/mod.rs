//! Task lifecycle and phase-gating for capstone defense deliverables.
//!
//! Tasks move through a fixed sequence of defense phases. This module
//! implements the rules that govern a task's status and revision counter
//! over time, the reconciliation that marks tasks `Missed` once their
//! deadline passes, and the per-team gate deciding whether a manager may
//! create tasks in the next phase. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
