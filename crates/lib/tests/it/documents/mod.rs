//! Document registry integration tests
