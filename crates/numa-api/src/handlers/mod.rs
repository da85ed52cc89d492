pub mod health;
pub mod messages;
pub mod transactions;
pub mod users;
pub mod verify;
