//! Property-based tests for lintab-core
//!
//! This module contains property tests for:
//! - LU factorization solves, eta updates and forking
//! - LP tableau dual consistency and reverse-pivot symmetry

#[path = "property_tests/lp_properties.rs"]
mod lp_properties;
#[path = "property_tests/lu_properties.rs"]
mod lu_properties;
