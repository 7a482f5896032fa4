pub mod error;
pub mod validation;
pub mod redirect;
