//! Phasegate: capstone-project task lifecycle and phase-gating engine.
//!
//! This crate provides the core state machine behind a capstone deliverable
//! tracker: task records scoped to sequential defense phases, the revision
//! and status rules applied when deadlines move, deadline reconciliation,
//! and the per-team gate that unlocks the next phase.
//!
//! # Architecture
//!
//! Phasegate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (stores, streams)
//!
//! The crate is a library-level state machine meant to be embedded behind
//! whatever transport and UI the host application uses; authentication,
//! attachment storage, and rendering live outside it.

pub mod task;
