//! Credit-score buckets
//!
//! Five left-inclusive FICO ranges, ordered by lower bound:
//! `<580` Poor, `580-669` Fair, `670-739` Good, `740-799` Very Good, `>=800` Excellent.

use serde::{Deserialize, Serialize};

use crate::logic::store::{Column, GroupKey};

/// Lower bounds of every bucket after `Poor`
pub const BUCKET_EDGES: [i64; 4] = [580, 670, 740, 800];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditBucket {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl CreditBucket {
    pub const ALL: [CreditBucket; 5] = [
        CreditBucket::Poor,
        CreditBucket::Fair,
        CreditBucket::Good,
        CreditBucket::VeryGood,
        CreditBucket::Excellent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CreditBucket::Poor => "Poor (< 580)",
            CreditBucket::Fair => "Fair (580-669)",
            CreditBucket::Good => "Good (670-739)",
            CreditBucket::VeryGood => "Very Good (740-799)",
            CreditBucket::Excellent => "Excellent (800+)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.label() == label)
    }

    /// Grouping expression that buckets `initial_fico_score` in the store.
    /// Rows without a score fall in no bucket.
    pub fn group_key() -> GroupKey {
        GroupKey::Bands {
            column: Column::InitialFicoScore,
            edges: BUCKET_EDGES.to_vec(),
            labels: Self::ALL.iter().map(|b| b.label()).collect(),
        }
    }
}

impl std::fmt::Display for CreditBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
