// Cheap filter over raw WebSocket messages.
//
// The ordering is deliberate: the keyword scan is near-free and
// eliminates almost all traffic before the dedup lookup, and both run
// before any network fetch is paid for.

use serde::Deserialize;

use crate::dedup::DedupRegistry;

/// Lowercase keywords that mark a pool creation instruction in log output.
const POOL_CREATION_KEYWORDS: [&str; 4] = [
    "initialize2",
    "initializepool",
    "createpool",
    "initpool",
];

#[derive(Debug, Deserialize)]
struct LogsNotification {
    method: Option<String>,
    params: Option<NotificationParams>,
}

#[derive(Debug, Deserialize)]
struct NotificationParams {
    result: Option<NotificationResult>,
}

#[derive(Debug, Deserialize)]
struct NotificationResult {
    value: Option<NotificationValue>,
}

#[derive(Debug, Deserialize)]
struct NotificationValue {
    signature: Option<String>,
    logs: Option<Vec<String>>,
}

/// What to do with one raw transport message.
#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Not a logs notification (acknowledgements, pings, other shapes).
    NotAnEvent,
    /// A logs notification that does not merit a fetch.
    Ignore,
    /// Signature claimed for fetching, exactly once per process lifetime.
    Fetch(String),
}

/// Decides whether a raw message is worth a full transaction fetch.
pub struct NotificationDispatcher {
    dedup: DedupRegistry,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            dedup: DedupRegistry::new(),
        }
    }

    /// Classify one raw message.
    ///
    /// The signature is claimed in the dedup registry before the fetch
    /// happens, so a candidate whose fetch later fails is never retried.
    pub fn evaluate(&mut self, raw: &str) -> Verdict {
        let notification: LogsNotification = match serde_json::from_str(raw) {
            Ok(notification) => notification,
            Err(_) => {
                return Verdict::NotAnEvent;
            }
        };

        if notification.method.as_deref() != Some("logsNotification") {
            return Verdict::NotAnEvent;
        }

        let value = match
            notification.params
                .and_then(|params| params.result)
                .and_then(|result| result.value)
        {
            Some(value) => value,
            None => {
                return Verdict::Ignore;
            }
        };

        let logs = match value.logs {
            Some(logs) if !logs.is_empty() => logs,
            _ => {
                return Verdict::Ignore;
            }
        };

        if !contains_pool_keyword(&logs) {
            return Verdict::Ignore;
        }

        let signature = match value.signature {
            Some(signature) => signature,
            None => {
                return Verdict::Ignore;
            }
        };

        if self.dedup.contains(&signature) {
            return Verdict::Ignore;
        }
        self.dedup.insert(&signature);

        Verdict::Fetch(signature)
    }

    pub fn claimed_signatures(&self) -> usize {
        self.dedup.len()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_pool_keyword(logs: &[String]) -> bool {
    logs.iter().any(|line| {
        let line = line.to_lowercase();
        POOL_CREATION_KEYWORDS.iter().any(|keyword| line.contains(keyword))
    })
}
