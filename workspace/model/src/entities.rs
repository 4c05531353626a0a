//! SeaORM entity modules for the movie and event tracker.
//!
//! Users keep two movie lists (watched, interested) in a single junction
//! table tagged with the list kind. Hosting is one-to-many through
//! `events.host_id`; interest in events is a separate junction table.

pub mod event;
pub mod movie;
pub mod user;
pub mod user_event;
pub mod user_movie;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::event::Entity as Event;
    pub use super::movie::Entity as Movie;
    pub use super::user::Entity as User;
    pub use super::user_event::Entity as UserEvent;
    pub use super::user_movie::Entity as UserMovie;
}
