/// Database models
///
/// - `user`: accounts and their credentials
/// - `contact`: per-user contact queue keyed by device-local id
/// - `message`: per-contact message queue
///
/// Ownership runs one way: a user owns its contacts, a contact owns its
/// messages. Both queues are drained on read.

pub mod contact;
pub mod message;
pub mod user;

pub use contact::{Contact, NewContact};
pub use message::{Message, PendingMessage};
pub use user::{CreateUser, User};
