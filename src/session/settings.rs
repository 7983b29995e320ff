//! Validated engine settings.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// A setting was outside its allowed domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConfigValidationError {
    /// Skill rating not in {1100, 1200, ..., 1900}.
    #[display("Engine level {} is not one of 1100..=1900 in steps of 100", _0)]
    EngineLevel(u32),
    /// Node budget not in 1..=10000.
    #[display("Search budget {} is outside 1..=10000", _0)]
    SearchBudget(u32),
}

impl std::error::Error for ConfigValidationError {}

/// Engine skill rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EngineLevel(u32);

impl EngineLevel {
    /// Weakest rating.
    pub const MIN: u32 = 1100;
    /// Strongest rating.
    pub const MAX: u32 = 1900;
    /// Distance between ratings.
    pub const STEP: u32 = 100;

    /// Validates a rating.
    #[instrument]
    pub fn new(value: u32) -> Result<Self, ConfigValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) && value % Self::STEP == 0 {
            Ok(Self(value))
        } else {
            warn!(value, "Rejected engine level");
            Err(ConfigValidationError::EngineLevel(value))
        }
    }

    /// Raw rating.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Every valid rating, weakest first.
    pub fn all() -> impl Iterator<Item = EngineLevel> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP as usize).map(EngineLevel)
    }
}

impl Default for EngineLevel {
    fn default() -> Self {
        Self(1500)
    }
}

impl TryFrom<u32> for EngineLevel {
    type Error = ConfigValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EngineLevel> for u32 {
    fn from(level: EngineLevel) -> Self {
        level.0
    }
}

/// Node budget the engine may spend per move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SearchBudget(u32);

impl SearchBudget {
    /// Smallest budget.
    pub const MIN: u32 = 1;
    /// Largest budget.
    pub const MAX: u32 = 10_000;

    /// Validates a budget.
    #[instrument]
    pub fn new(value: u32) -> Result<Self, ConfigValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            warn!(value, "Rejected search budget");
            Err(ConfigValidationError::SearchBudget(value))
        }
    }

    /// Raw node count.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for SearchBudget {
    type Error = ConfigValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SearchBudget> for u32 {
    fn from(budget: SearchBudget) -> Self {
        budget.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_level_domain() {
        let levels: Vec<u32> = EngineLevel::all().map(EngineLevel::get).collect();
        assert_eq!(
            levels,
            vec![1100, 1200, 1300, 1400, 1500, 1600, 1700, 1800, 1900]
        );
        for level in levels {
            assert!(EngineLevel::new(level).is_ok());
        }
    }

    #[test]
    fn test_engine_level_rejects() {
        for value in [0, 1000, 1050, 1150, 1999, 2000] {
            assert_eq!(
                EngineLevel::new(value),
                Err(ConfigValidationError::EngineLevel(value))
            );
        }
    }

    #[test]
    fn test_search_budget_bounds() {
        assert!(SearchBudget::new(1).is_ok());
        assert!(SearchBudget::new(10_000).is_ok());
        assert_eq!(
            SearchBudget::new(0),
            Err(ConfigValidationError::SearchBudget(0))
        );
        assert_eq!(
            SearchBudget::new(10_001),
            Err(ConfigValidationError::SearchBudget(10_001))
        );
    }

    #[test]
    fn test_serde_validates() {
        let level: EngineLevel = serde_json::from_str("1700").unwrap();
        assert_eq!(level.get(), 1700);
        assert!(serde_json::from_str::<EngineLevel>("1750").is_err());
        assert!(serde_json::from_str::<SearchBudget>("0").is_err());
        assert_eq!(serde_json::to_string(&SearchBudget::new(50).unwrap()).unwrap(), "50");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(EngineLevel::default().get(), 1500);
        assert_eq!(SearchBudget::default().get(), 1);
    }
}
