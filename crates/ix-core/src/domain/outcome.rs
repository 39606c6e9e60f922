//! Processing outcomes, rule verdicts and handler-result aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of offering a notification to an element.
///
/// Steers the dispatcher's scan and registry mutation:
///
/// | Outcome        | Scan      | Registry            |
/// |----------------|-----------|---------------------|
/// | `Remove`       | stops     | element evicted     |
/// | `Keep`         | stops     | element retained    |
/// | `NotProcessed` | continues | untouched           |
/// | `Ignore`       | stops     | untouched (denied)  |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Consumed; evict the element.
    Remove,
    /// Consumed; keep the element registered.
    Keep,
    /// The element does not apply; keep scanning.
    NotProcessed,
    /// Access was denied; stop scanning without eviction.
    Ignore,
}

impl Outcome {
    /// Whether this outcome ends the dispatcher's scan.
    pub fn stops_scan(&self) -> bool {
        !matches!(self, Outcome::NotProcessed)
    }

    /// Whether this outcome evicts the element.
    pub fn evicts(&self) -> bool {
        matches!(self, Outcome::Remove)
    }

    fn rank(&self) -> u8 {
        match self {
            Outcome::Remove => 3,
            Outcome::Keep => 2,
            Outcome::Ignore => 1,
            Outcome::NotProcessed => 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Remove => "remove",
            Outcome::Keep => "keep",
            Outcome::NotProcessed => "not_processed",
            Outcome::Ignore => "ignore",
        };
        f.write_str(s)
    }
}

/// Verdict of a single access rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVerdict {
    /// Stop the chain and grant access.
    Allow,
    /// Stop the chain and refuse access.
    Deny,
    /// Defer to the next rule.
    Neutral,
}

/// How a message-style element combines the outcomes of several
/// applicable handlers fired by one notification.
///
/// Every applicable handler always runs; the policy only decides which
/// single outcome is reported back to the dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeAggregation {
    /// The outcome of the handler invoked last wins.
    #[default]
    LastWins,
    /// The most terminal outcome wins: `Remove > Keep > Ignore > NotProcessed`.
    /// Independent of descriptor order.
    MostTerminal,
}

impl OutcomeAggregation {
    /// Fold one more handler outcome into the running aggregate.
    pub fn combine(&self, current: Option<Outcome>, next: Outcome) -> Outcome {
        match (self, current) {
            (_, None) => next,
            (OutcomeAggregation::LastWins, Some(_)) => next,
            (OutcomeAggregation::MostTerminal, Some(current)) => {
                if next.rank() > current.rank() {
                    next
                } else {
                    current
                }
            }
        }
    }

    /// Aggregate a full sequence; `NotProcessed` when empty.
    pub fn aggregate(&self, outcomes: impl IntoIterator<Item = Outcome>) -> Outcome {
        outcomes
            .into_iter()
            .fold(None, |acc, next| Some(self.combine(acc, next)))
            .unwrap_or(Outcome::NotProcessed)
    }
}
