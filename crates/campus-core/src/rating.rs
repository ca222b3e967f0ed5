//! Star rating attached to a feedback record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A rating on the closed range `1..=5`.
///
/// Deserialisation rejects anything outside the range, so a `Rating` that
/// exists is always valid.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  /// Construct a rating, returning `None` when `value` is out of range.
  pub const fn new(value: u8) -> Option<Self> {
    if value >= Self::MIN && value <= Self::MAX {
      Some(Self(value))
    } else {
      None
    }
  }

  pub const fn get(self) -> u8 { self.0 }

  /// All selectable ratings in ascending order.
  pub fn all() -> impl Iterator<Item = Rating> {
    (Self::MIN..=Self::MAX).map(Rating)
  }

  /// Whether star `position` (1-based) is drawn filled for this rating.
  pub fn is_filled(self, position: u8) -> bool { position <= self.0 }
}

impl Default for Rating {
  fn default() -> Self { Rating(Self::MAX) }
}

impl TryFrom<i64> for Rating {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    u8::try_from(value)
      .ok()
      .and_then(Rating::new)
      .ok_or(Error::InvalidRating(value))
  }
}

impl From<Rating> for u8 {
  fn from(r: Rating) -> Self { r.0 }
}

impl fmt::Display for Rating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.0, Self::MAX)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_five() {
    assert_eq!(Rating::default().get(), 5);
  }

  #[test]
  fn range_is_enforced() {
    assert!(Rating::new(0).is_none());
    assert!(Rating::new(6).is_none());
    assert_eq!(Rating::all().map(Rating::get).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn filled_positions_follow_value() {
    let r = Rating::new(3).unwrap();
    let filled: Vec<bool> = (1..=5).map(|p| r.is_filled(p)).collect();
    assert_eq!(filled, vec![true, true, true, false, false]);
  }

  #[test]
  fn deserialize_rejects_out_of_range() {
    assert!(serde_json::from_str::<Rating>("0").is_err());
    assert!(serde_json::from_str::<Rating>("9").is_err());
    assert!(serde_json::from_str::<Rating>("-1").is_err());
    assert_eq!(serde_json::from_str::<Rating>("4").unwrap().get(), 4);
    assert_eq!(serde_json::to_string(&Rating::default()).unwrap(), "5");
  }
}
