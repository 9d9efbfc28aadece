use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// Result of one classification call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    True,
    False,
    /// Transport or remote failure
    Error,
    /// The call's result could not be retrieved
    Unavailable,
}

impl Classification {
    pub fn from_bool(is_prime: bool) -> Self {
        if is_prime { Self::True } else { Self::False }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::True | Self::False)
    }

    /// Label used in logs and tabular output
    pub fn label(&self) -> &'static str {
        match self {
            Self::True => "T",
            Self::False => "F",
            Self::Error => "Error",
            Self::Unavailable => "N/A",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The recorded result of dispatching one workload item
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// 1-based trial number
    pub trial: u32,
    /// Position of the item within its trial
    pub index: usize,
    pub value: i64,
    pub classification: Classification,
    /// `None` only for `Classification::Unavailable`
    pub latency: Option<Duration>,
    pub endpoint: Endpoint,
}

impl Outcome {
    /// Latency usable for aggregation, i.e. only for successful calls
    pub fn success_latency(&self) -> Option<Duration> {
        if self.classification.is_success() {
            self.latency
        } else {
            None
        }
    }
}
