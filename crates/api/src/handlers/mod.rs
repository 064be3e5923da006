pub mod health;
pub mod maintenance;
