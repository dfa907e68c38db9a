//! Core traits
//!
//! The estimator is generic over how a gas is identified: the resistance band
//! table is the default, and a retrained model can be plugged in at the same
//! seam. Keep these small - embedded callers don't need more.

use crate::gas::GasType;
use crate::resistance::Resistance;

/// Identifies which gas is most likely present from sensor resistance
pub trait GasClassifier {
    /// Exactly one gas type per resistance. May return `GasType::Unknown`
    /// when the classifier's table does not cover the value.
    fn classify(&self, resistance: Resistance) -> GasType;
}

impl<C: GasClassifier + ?Sized> GasClassifier for &C {
    fn classify(&self, resistance: Resistance) -> GasType {
        (**self).classify(resistance)
    }
}

/// Numeric results that can be reported as-is
pub trait Validatable {
    /// False for NaN and infinities
    fn is_valid(&self) -> bool;
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}
