//! Activation functions applied by a layer after bias subtraction.
//!
//! Two representations are kept apart:
//!
//! - [`ActivationKind`] is the plain tag stored in a
//!   [`TopologyDescriptor`](crate::topology::TopologyDescriptor) and written to
//!   interchange files.
//! - [`Activation`] is the strategy a live [`Layer`](crate::nn::Layer) evaluates.
//!   It carries the parameters of the function (the logistic slope).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slope used when a logistic activation is materialized from its kind.
pub const DEFAULT_LOGISTIC_SLOPE: f64 = 1.0;

/// Activation tag of a layer descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    /// `f(x) = x`
    Identity,
    /// `f(x) = 1 / (1 + e^(-x))`
    #[default]
    Logistic,
}

impl ActivationKind {
    /// Attribute text used by the interchange formats.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationKind::Identity => "identity",
            ActivationKind::Logistic => "logistic",
        }
    }

    /// Parses an interchange attribute.
    ///
    /// Unrecognized or empty values fall back to [`ActivationKind::Logistic`].
    pub fn from_attribute(attribute: &str) -> Self {
        match attribute {
            "identity" => ActivationKind::Identity,
            _ => ActivationKind::Logistic,
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elementwise nonlinearity evaluated by a layer.
///
/// Materialized from an [`ActivationKind`] when an engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Activation {
    /// Passes the value through unchanged.
    Identity,
    /// Logistic sigmoid `1 / (1 + e^(-slope·x))`.
    Logistic { slope: f64 },
}

impl Activation {
    /// Logistic activation with [`DEFAULT_LOGISTIC_SLOPE`].
    pub fn logistic() -> Self {
        Self::logistic_with_slope(DEFAULT_LOGISTIC_SLOPE)
    }

    pub fn logistic_with_slope(slope: f64) -> Self {
        Activation::Logistic { slope }
    }

    /// The serializable tag of this strategy. The slope is not part of it.
    pub fn kind(&self) -> ActivationKind {
        match self {
            Activation::Identity => ActivationKind::Identity,
            Activation::Logistic { .. } => ActivationKind::Logistic,
        }
    }

    /// Evaluates the function at `x`.
    #[inline]
    pub fn activate(&self, x: f64) -> f64 {
        match *self {
            Activation::Identity => x,
            Activation::Logistic { slope } => 1.0 / (1.0 + (-slope * x).exp()),
        }
    }

    /// Evaluates the derivative at `x`.
    ///
    /// The identity reports `0.0`; no training code consumes it yet.
    #[inline]
    pub fn derivative(&self, x: f64) -> f64 {
        match *self {
            Activation::Identity => 0.0,
            Activation::Logistic { .. } => {
                let y = self.activate(x);
                y * (1.0 - y)
            }
        }
    }
}

impl Default for Activation {
    fn default() -> Self {
        ActivationKind::default().into()
    }
}

impl From<ActivationKind> for Activation {
    fn from(kind: ActivationKind) -> Self {
        match kind {
            ActivationKind::Identity => Activation::Identity,
            ActivationKind::Logistic => Activation::logistic(),
        }
    }
}
