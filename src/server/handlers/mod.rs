pub mod chat;
pub mod health;
pub mod models;
pub mod training;
