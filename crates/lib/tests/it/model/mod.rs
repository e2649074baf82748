//! Tests for the canonical value model.

mod ordering_tests;
