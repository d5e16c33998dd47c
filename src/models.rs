pub mod auth;
pub mod person;
pub mod role;
pub mod transaction;
