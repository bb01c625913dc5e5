use crate::config::Config;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Static mapping from GitHub login to notification email, plus the set of
/// blocked actors. Loaded once from configuration and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Arc<HashMap<String, String>>,
    blocklist: Arc<HashSet<String>>,
}

impl Directory {
    pub fn new(users: HashMap<String, String>, blocklist: HashSet<String>) -> Self {
        Self {
            users: Arc::new(users),
            blocklist: Arc::new(blocklist),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.users.clone(), config.blocklist.clone())
    }

    /// Email for a platform login, if one is mapped.
    pub fn resolve(&self, login: &str) -> Option<&str> {
        self.users.get(login).map(String::as_str)
    }

    /// Whether activity authored by this actor is suppressed. Only ever
    /// checked against event actors, never against recipients.
    pub fn is_blocked(&self, login: &str) -> bool {
        self.blocklist.contains(login)
    }
}
