pub mod endpoint;
pub mod repository;
pub mod search;
pub mod user;
