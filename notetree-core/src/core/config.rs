//! Sibling-order configuration for the [`OrderAllocator`](super::order::OrderAllocator).
//!
//! The defaults match the node store, which persists `order` in an integer
//! column: new siblings start at `1` and are spaced by `1`.

use serde::{Deserialize, Serialize};

use crate::{Result, TreeError};

/// Numeric precision that order values must survive when written back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderPrecision {
    /// Orders are stored as integers; only whole numbers are valid.
    #[default]
    Integer,
    /// Orders are stored as floats; two bounds closer than `min_gap` are
    /// considered indistinguishable.
    #[serde(rename_all = "camelCase")]
    Float { min_gap: f64 },
}

/// Tunables for order allocation.
///
/// # Examples
///
/// ```rust
/// use notetree_core::{OrderConfig, OrderPrecision};
///
/// let config = OrderConfig::from_json(r#"{"spacing": 10.0}"#).unwrap();
/// assert_eq!(config.start, 1.0);
/// assert_eq!(config.spacing, 10.0);
/// assert_eq!(config.precision, OrderPrecision::Integer);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderConfig {
    /// Order given to the first node of an empty sibling group.
    pub start: f64,
    /// Distance between consecutive siblings on append and renormalization.
    pub spacing: f64,
    /// Precision the persisted order column supports.
    pub precision: OrderPrecision,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            start: 1.0,
            spacing: 1.0,
            precision: OrderPrecision::Integer,
        }
    }
}

impl OrderConfig {
    /// Parses a JSON fragment; missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Json`] for malformed JSON and
    /// [`TreeError::InvalidConfig`] if the parsed values fail [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is finite and usable for allocation.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() {
            return Err(TreeError::InvalidConfig("start must be finite".to_string()));
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(TreeError::InvalidConfig(
                "spacing must be a positive number".to_string(),
            ));
        }
        match self.precision {
            OrderPrecision::Integer => {
                if self.start.fract() != 0.0 || self.spacing.fract() != 0.0 {
                    return Err(TreeError::InvalidConfig(
                        "integer precision requires whole-number start and spacing".to_string(),
                    ));
                }
            }
            OrderPrecision::Float { min_gap } => {
                if !min_gap.is_finite() || min_gap < 0.0 {
                    return Err(TreeError::InvalidConfig(
                        "minGap must be a non-negative number".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
