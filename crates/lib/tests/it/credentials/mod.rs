//! Credential store integration tests

mod load_save;
mod login_register;
