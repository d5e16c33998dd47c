pub mod auth;
pub mod moves;
pub mod people;
