//! Unit tests for the task lifecycle and phase-gating engine.

mod support;

mod reconciler_tests;
