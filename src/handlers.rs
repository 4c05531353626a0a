pub mod events;
pub mod health;
pub mod movies;
pub mod users;
