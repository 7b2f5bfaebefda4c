//! Rank-based arbitration

use super::Arbiter;
use crate::coordinates::Coordinates;
use crate::value::Value;
use std::cmp::Ordering;

/// Orders values by the priority of the source that produced them.
///
/// Ranked values sort before unranked ones; among ranked values the lower
/// rank comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankedOrder {
    /// Rank is the position of the source id in the list, most preferred
    /// first. Sources not listed are unranked.
    Explicit(Vec<String>),
    /// Rank is the source's own [`SourceInfo::rank`](crate::SourceInfo::rank).
    SourceRank,
}

impl RankedOrder {
    /// Rank of a value, `None` if this order cannot rank it.
    pub fn rank_of(&self, value: &Value) -> Option<u32> {
        match self {
            Self::Explicit(ids) => ids
                .iter()
                .position(|id| id == value.source().id())
                .and_then(|index| u32::try_from(index).ok()),
            Self::SourceRank => value.source().rank(),
        }
    }

    /// True when this order can rank the value.
    pub fn ranks(&self, value: &Value) -> bool {
        self.rank_of(value).is_some()
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (self.rank_of(a), self.rank_of(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Arbiter choosing the top-ranked value of a tie.
///
/// Declines when the tie is empty or when any member cannot be ranked: a
/// partial ranking is not a basis for a decision. Members of equal rank keep
/// their discovery order.
///
/// # Example
///
/// ```
/// use coord_core::{Arbiter, Coordinates, RankedArbiter, SourceInfo, Value};
///
/// let arbiter = RankedArbiter::with_order(["overrides", "defaults"]);
/// let tied = [
///     Value::new(&SourceInfo::new("defaults"), Coordinates::new(), "port", Some("80".into())),
///     Value::new(&SourceInfo::new("overrides"), Coordinates::new(), "port", Some("8080".into())),
/// ];
/// let winner = arbiter.arbitrate(&Coordinates::new(), "port", &tied).unwrap();
/// assert_eq!(winner.raw(), Some("8080"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArbiter {
    order: RankedOrder,
}

impl RankedArbiter {
    /// Rank by an explicit list of source ids, most preferred first.
    pub fn with_order<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: RankedOrder::Explicit(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Rank by each source's own rank.
    pub fn by_source_rank() -> Self {
        Self {
            order: RankedOrder::SourceRank,
        }
    }

    pub fn order(&self) -> &RankedOrder {
        &self.order
    }
}

impl Arbiter for RankedArbiter {
    fn arbitrate(&self, _coordinates: &Coordinates, _name: &str, tied: &[Value]) -> Option<Value> {
        if tied.is_empty() || !tied.iter().all(|v| self.order.ranks(v)) {
            return None;
        }
        // min_by returns the first of equal minima
        tied.iter()
            .min_by(|a, b| self.order.compare(a, b))
            .cloned()
    }
}
