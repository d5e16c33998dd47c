pub mod auth;
pub mod authorizer;
pub mod move_service;
pub mod person_service;
pub mod role_policy;
