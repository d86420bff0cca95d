//! Bounded retry for attempts that can come back empty.
//!
//! Order synthesis resamples a restaurant when the chosen one has nothing
//! orderable. The budget and the failure accounting live here so they can be
//! tested without any randomness.

/// Result of a bounded retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// An attempt produced a value. `attempts` counts the successful one.
    Succeeded { value: T, attempts: u32 },
    /// Every attempt in the budget came back empty.
    Exhausted { attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. } | RetryOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Some(value),
            RetryOutcome::Exhausted { .. } => None,
        }
    }
}

/// Run `attempt` until it yields a value or `max_attempts` is spent.
///
/// The closure receives the 1-based attempt number. A budget of 0 runs nothing.
pub fn retry_bounded<T, F>(max_attempts: u32, mut attempt: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Option<T>,
{
    for n in 1..=max_attempts {
        if let Some(value) = attempt(n) {
            return RetryOutcome::Succeeded { value, attempts: n };
        }
    }
    RetryOutcome::Exhausted {
        attempts: max_attempts,
    }
}
