use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An opaque, hashable value aggregators use to group matches.
///
/// The pipeline never inspects the wrapped value, only compares and hashes
/// it, so `ResultKey` can carry a region name, an enum, a tuple, or (by
/// default) a feature's own key.
pub struct ResultKey(Box<dyn DynKey>);

impl ResultKey {
    pub fn new<T>(value: T) -> Self
    where
        T: Eq + Hash + fmt::Debug + Clone + Send + Sync + 'static,
    {
        ResultKey(Box::new(value))
    }
}

impl Clone for ResultKey {
    fn clone(&self) -> Self {
        ResultKey(self.0.dyn_clone())
    }
}

impl fmt::Debug for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl PartialEq for ResultKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for ResultKey {}

impl Hash for ResultKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_any().type_id().hash(state);
        self.0.dyn_hash(state);
    }
}

trait DynKey: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_clone(&self) -> Box<dyn DynKey>;
}

impl<T> DynKey for T
where
    T: Eq + Hash + fmt::Debug + Clone + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn dyn_clone(&self) -> Box<dyn DynKey> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_values_hash_and_compare_equal() {
        let a = ResultKey::new("europe".to_string());
        let b = ResultKey::new("europe".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn different_underlying_types_never_compare_equal() {
        let a = ResultKey::new(1i64);
        let b = ResultKey::new(1i32);
        assert_ne!(a, b);
    }

    #[test]
    fn works_as_a_hashset_member() {
        let mut seen = HashSet::new();
        seen.insert(ResultKey::new("oceania".to_string()));
        assert!(seen.contains(&ResultKey::new("oceania".to_string())));
        assert!(!seen.contains(&ResultKey::new("polynesia".to_string())));
    }
}
