/// Result of a tolerant operation.
///
/// Geometric input that is malformed or incomplete never aborts the
/// pipeline; operations fall back to a well-defined default and record why.
/// This type makes that fallback observable: callers that only need a value
/// use [`Outcome::into_value`], callers (and tests) that care whether the
/// full path ran inspect [`Outcome::reason`].
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// The operation completed with the full result.
    Full(T),
    /// The operation fell back to a defined default.
    Degraded {
        /// The fallback value.
        value: T,
        /// Why the full result could not be produced.
        reason: String,
    },
}

impl<T> Outcome<T> {
    /// Borrow the carried value, full or fallback.
    pub fn value(&self) -> &T {
        match self {
            Outcome::Full(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    /// Consume the outcome and return the carried value.
    pub fn into_value(self) -> T {
        match self {
            Outcome::Full(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    /// Whether the operation fell back to its default.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// The degradation reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Full(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;

    #[test]
    fn outcome_accessors() {
        let full = Outcome::Full(3);
        assert_eq!(*full.value(), 3);
        assert!(!full.is_degraded());
        assert_eq!(full.reason(), None);

        let degraded = Outcome::Degraded {
            value: 0,
            reason: "empty input".to_string(),
        };
        assert_eq!(*degraded.value(), 0);
        assert!(degraded.is_degraded());
        assert_eq!(degraded.reason(), Some("empty input"));
        assert_eq!(degraded.into_value(), 0);
    }
}
