//! Client for the user document store
//!
//! Holds each user's push token at `users/{userId}` and an append-only
//! notification log at `users/{userId}/notifications`.

pub mod client;
pub mod model;

pub use client::{RestUserStore, StoreError, UserStore};
pub use model::{NotificationEntry, UserDoc};
