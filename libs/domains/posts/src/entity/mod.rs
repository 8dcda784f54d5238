//! Sea-ORM entities for the tables created by the `migration` crate.

pub mod comment;
pub mod like;
pub mod notification;
pub mod post;
pub mod user;
