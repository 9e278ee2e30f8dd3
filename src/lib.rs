pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
