//! Format capability
//!
//! The document never interprets format values. Combining and comparing them is delegated to a
//! [`FormatPolicy`] supplied by the embedding application.

use std::fmt::Debug;

/// Merge/compare policy governing how span formats combine.
pub trait FormatPolicy {
    /// The opaque format value attached to every span.
    type Format: Clone + Debug;

    /// Format used by a fresh document before any format is set.
    fn default_format(&self) -> Self::Format;

    /// Combine `old` with `new`, e.g. apply a new property while keeping unrelated ones.
    ///
    /// Must be a pure function of its inputs.
    fn merge(&self, old: &Self::Format, new: &Self::Format) -> Self::Format;

    /// Whether two adjacent spans carrying `a` and `b` may be merged.
    ///
    /// Must be an equivalence relation; anything else makes span fragmentation unpredictable.
    fn compare(&self, a: &Self::Format, b: &Self::Format) -> bool;
}

/// Policy where merging replaces the old value and comparison is plain equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceFormat<F> {
    default: F,
}

impl<F> ReplaceFormat<F> {
    /// Create the policy with the format new documents start from.
    pub fn new(default: F) -> Self {
        Self { default }
    }
}

impl<F> FormatPolicy for ReplaceFormat<F>
where
    F: Clone + Debug + PartialEq,
{
    type Format = F;

    fn default_format(&self) -> F {
        self.default.clone()
    }

    fn merge(&self, _old: &F, new: &F) -> F {
        new.clone()
    }

    fn compare(&self, a: &F, b: &F) -> bool {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_format_merge_keeps_new_value() {
        let policy = ReplaceFormat::new("default");
        assert_eq!(policy.default_format(), "default");
        assert_eq!(policy.merge(&"bold", &"italic"), "italic");
    }

    #[test]
    fn test_replace_format_compare_is_equality() {
        let policy = ReplaceFormat::new(0u8);
        assert!(policy.compare(&3, &3));
        assert!(!policy.compare(&3, &4));
    }
}
