//! Prediction result data structures

use std::fmt;

/// A single point estimate of units sold.
///
/// Displays with two decimals, which is how the session shows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub value: f64,
}

impl Prediction {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimal_display() {
        assert_eq!(Prediction::new(12.3449).to_string(), "12.34");
        assert_eq!(Prediction::new(7.0).to_string(), "7.00");
    }
}
