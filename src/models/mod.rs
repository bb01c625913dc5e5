pub mod github;
pub mod jira;
pub mod message;

pub use message::{Message, Recipient};
