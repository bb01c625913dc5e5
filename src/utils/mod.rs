pub mod link;

pub use link::slack_link;
