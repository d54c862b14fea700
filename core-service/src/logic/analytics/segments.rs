//! Segment keys accepted by distribution queries
//!
//! Parsing happens before any query is issued; unknown keys are rejected.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::logic::store::{Column, GroupKey, GroupedQuery, Measure, OrderBy, SortDirection};

/// Max purposes returned in the KPI distribution
pub const PURPOSE_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKey {
    Grade,
    Purpose,
    HomeOwnership,
    Term,
    VerificationStatus,
}

impl SegmentKey {
    pub const ALL: [SegmentKey; 5] = [
        SegmentKey::Grade,
        SegmentKey::Purpose,
        SegmentKey::HomeOwnership,
        SegmentKey::Term,
        SegmentKey::VerificationStatus,
    ];

    pub fn column(&self) -> Column {
        match self {
            SegmentKey::Grade => Column::Grade,
            SegmentKey::Purpose => Column::Purpose,
            SegmentKey::HomeOwnership => Column::HomeOwnership,
            SegmentKey::Term => Column::Term,
            SegmentKey::VerificationStatus => Column::VerificationStatus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.column().as_str()
    }

    /// `(value, count)` query with this key's ordering and limit
    pub fn distribution_query(&self) -> GroupedQuery {
        let query = GroupedQuery::new()
            .group_by(GroupKey::Column(self.column()))
            .measure(Measure::Count);

        match self {
            SegmentKey::Grade | SegmentKey::Term => query.order_by(OrderBy::Key(SortDirection::Asc)),
            SegmentKey::Purpose => query
                .order_by(OrderBy::Measure(0, SortDirection::Desc))
                .order_by(OrderBy::Key(SortDirection::Asc))
                .limit(PURPOSE_TOP_N),
            SegmentKey::HomeOwnership | SegmentKey::VerificationStatus => query
                .order_by(OrderBy::Measure(0, SortDirection::Desc))
                .order_by(OrderBy::Key(SortDirection::Asc)),
        }
    }
}

impl FromStr for SegmentKey {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        SegmentKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| RiskError::InvalidSegment(s.to_string()))
    }
}

impl std::fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        assert_eq!("grade".parse::<SegmentKey>().unwrap(), SegmentKey::Grade);
        assert_eq!(" purpose ".parse::<SegmentKey>().unwrap(), SegmentKey::Purpose);
        assert_eq!(
            "home_ownership".parse::<SegmentKey>().unwrap(),
            SegmentKey::HomeOwnership
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = "annual_inc".parse::<SegmentKey>().unwrap_err();
        assert!(matches!(err, RiskError::InvalidSegment(ref k) if k == "annual_inc"));
        assert!("grade; DROP TABLE beneficiaries".parse::<SegmentKey>().is_err());
    }

    #[test]
    fn test_purpose_query_is_top_five() {
        let q = SegmentKey::Purpose.distribution_query();
        assert_eq!(q.limit, Some(PURPOSE_TOP_N));
        assert_eq!(q.order[0], OrderBy::Measure(0, SortDirection::Desc));
    }

    #[test]
    fn test_grade_query_ordered_by_key() {
        let q = SegmentKey::Grade.distribution_query();
        assert_eq!(q.order, vec![OrderBy::Key(SortDirection::Asc)]);
        assert_eq!(q.limit, None);
    }
}
