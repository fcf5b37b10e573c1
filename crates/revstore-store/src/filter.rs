use crate::object::Object;

/// Type sentinel that matches every type within an environment.
pub const ALL_TYPES: &str = "all";

/// Predicate applied to every object during a full scan.
///
/// An object passes iff its environment equals the filter's environment and
/// either the filter's type is [`ALL_TYPES`] or the object's type equals it.
/// Comparison is exact and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanFilter {
    environment: String,
    kind: String,
}

impl ScanFilter {
    pub fn new(environment: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            kind: kind.into(),
        }
    }

    /// Every object in `environment`, whatever its type.
    pub fn environment(environment: impl Into<String>) -> Self {
        Self::new(environment, ALL_TYPES)
    }

    pub fn matches<T>(&self, object: &Object<T>) -> bool {
        self.matches_tags(&object.environment, &object.kind)
    }

    pub fn matches_tags(&self, environment: &str, kind: &str) -> bool {
        if environment != self.environment {
            return false;
        }
        self.kind == ALL_TYPES || kind == self.kind
    }
}
