//! Domain models for the notifications domain.
//!
//! Resources are the platform entities fetched from the domain API; a
//! `Message` is the transport-agnostic email built from them.

mod message;
mod resources;
mod settings;

pub use message::{Message, Recipient};
pub use resources::{Account, AccountRef, Group, Member, Transfer, User};
pub use settings::{EmailSettings, UserSettings};
