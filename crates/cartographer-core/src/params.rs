//! Decoded path parameters.
//!
//! Dispatch fills a [`Params`] set for every handler it runs. Storage uses a
//! small vector so the common case (a handful of placeholders) stays on the
//! stack.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline.
const INLINE_PARAMS: usize = 4;

/// Path parameters captured while matching a request path.
///
/// Parameters keep the order in which their placeholders appear in the
/// matched pattern.
///
/// # Example
///
/// ```rust
/// use cartographer_core::Params;
///
/// let mut params = Params::new();
/// params.set("orgId", "acme");
/// params.set("userId", "42");
///
/// assert_eq!(params.get("userId"), Some("42"));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing an earlier value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Merges `other` into this set; values from `other` win.
    pub fn extend_from(&mut self, other: &Params) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Clears all parameters, retaining allocated capacity.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut params = Params::new();
        params.set("id", "1");
        params.set("id", "2");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("2"));
    }

    #[test]
    fn test_iter_keeps_order() {
        let mut params = Params::new();
        params.set("a", "1");
        params.set("b", "2");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_extend_from() {
        let mut outer = Params::new();
        outer.set("org", "acme");
        outer.set("id", "old");

        let mut inner = Params::new();
        inner.set("id", "new");

        outer.extend_from(&inner);
        assert_eq!(outer.get("org"), Some("acme"));
        assert_eq!(outer.get("id"), Some("new"));
    }

    #[test]
    fn test_many_params_spill_to_heap() {
        let params: Params = (0..10)
            .map(|i| (format!("key{i}"), format!("value{i}")))
            .collect();

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key5"), Some("value5"));
    }

    #[test]
    fn test_clear() {
        let mut params = Params::new();
        params.set("a", "1");
        params.clear();
        assert!(params.is_empty());
    }
}
