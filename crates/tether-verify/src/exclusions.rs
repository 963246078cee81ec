//! Exclusion sets

use std::collections::BTreeSet;
use tether_domain::{OperationDescriptor, OperationId, ParamType};

/// Operations not expected to forward to the delegate
///
/// An operation belongs here when the wrapper reimplements it locally (for
/// instance to enforce its own default) or when forwarding would be wrong.
/// Entries are matched by name and parameter-type signature.
///
/// # Examples
///
/// ```
/// use tether_domain::ParamType;
/// use tether_verify::Exclusions;
///
/// let exclusions = Exclusions::new().with("max_inbound_message_size", [ParamType::I32]);
/// assert_eq!(exclusions.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    ids: BTreeSet<OperationId>,
}

impl Exclusions {
    /// Empty set: every operation is expected to forward
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation by name and signature
    pub fn with(mut self, name: &str, params: impl IntoIterator<Item = ParamType>) -> Self {
        self.insert(OperationId::new(name, params));
        self
    }

    /// Add an operation id
    pub fn insert(&mut self, id: OperationId) -> bool {
        self.ids.insert(id)
    }

    /// Returns `true` if `id` is excluded
    pub fn contains(&self, id: &OperationId) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if the described operation is excluded
    pub fn excludes(&self, operation: &OperationDescriptor) -> bool {
        self.ids.iter().any(|id| id.identifies(operation))
    }

    /// Excluded ids, in a stable order
    pub fn iter(&self) -> impl Iterator<Item = &OperationId> {
        self.ids.iter()
    }

    /// Number of exclusions
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<OperationId> for Exclusions {
    fn from_iter<T: IntoIterator<Item = OperationId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<OperationId> for Exclusions {
    fn extend<T: IntoIterator<Item = OperationId>>(&mut self, iter: T) {
        self.ids.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_domain::ParamSpec;

    const SIZE: &[ParamSpec] = &[ParamSpec::new("bytes", ParamType::I32)];

    #[test]
    fn test_matches_by_signature() {
        let exclusions = Exclusions::new().with("max_size", [ParamType::I32]);
        assert!(exclusions.excludes(&OperationDescriptor::fluent("max_size", SIZE)));
        assert!(!exclusions.excludes(&OperationDescriptor::fluent("max_size", &[])));
        assert!(!exclusions.excludes(&OperationDescriptor::fluent("min_size", SIZE)));
    }

    #[test]
    fn test_collect() {
        let exclusions: Exclusions = [
            OperationId::new("a", []),
            OperationId::new("b", [ParamType::Bool]),
            OperationId::new("a", []),
        ]
        .into_iter()
        .collect();
        assert_eq!(exclusions.len(), 2);
        assert!(exclusions.contains(&OperationId::new("b", [ParamType::Bool])));
    }
}
