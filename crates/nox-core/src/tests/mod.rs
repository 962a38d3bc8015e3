//! Crate-internal tests that span several modules.


mod check_tests;
