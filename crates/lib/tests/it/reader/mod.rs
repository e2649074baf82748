//! Tests for host-input conversion.

mod set_data_tests;
