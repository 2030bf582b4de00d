// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named property sets supplied by a parent render.
//!
//! [`PropertySet`] keeps its entries sorted by name in a `SmallVec`, using
//! binary search for lookup. Most wrapped elements receive only a handful of
//! properties, so the common case stays inline, and iteration order (and so
//! the order of element writes) is deterministic.

use alloc::rc::Rc;
use smallvec::SmallVec;

use crate::value::Value;

/// Name of the reserved property that carries child content.
///
/// A property with this name is never reconciled onto the element; children
/// travel structurally through [`Props::children`].
pub const CHILDREN_PROPERTY: &str = "children";

const INLINE_CAPACITY: usize = 8;

/// A mapping from unique property names to [`Value`]s.
///
/// ```rust
/// use understory_custom_element::{PropertySet, Value};
///
/// let props = PropertySet::new()
///     .with("label", "Save")
///     .with("disabled", false);
///
/// assert_eq!(props.len(), 2);
/// assert_eq!(props.get("label"), Some(&Value::from("Save")));
///
/// // Iteration is ordered by name.
/// let names: Vec<_> = props.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["disabled", "label"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySet {
    entries: SmallVec<[(Rc<str>, Value); INLINE_CAPACITY]>,
}

impl PropertySet {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn find(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(entry, _)| (**entry).cmp(name))
    }

    /// Sets a property, returning the value it replaced.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        match self.find(name) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (Rc::from(name), value));
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.find(name)
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if a property with this name is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Iterates over `(name, value)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(name, value)| (&**name, value))
    }

    /// Iterates with the shared name handles, for callers that keep names.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> + '_ {
        self.entries.iter().map(|(name, value)| (name, value))
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name.as_ref(), value);
        }
        set
    }
}

impl<K: AsRef<str>, V: Into<Value>> Extend<(K, V)> for PropertySet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name.as_ref(), value);
        }
    }
}

/// Everything a render passes to a wrapped element.
///
/// `C` is the host framework's child content; it is handed back untouched in
/// the element [`Blueprint`](crate::Blueprint).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props<C = ()> {
    /// Properties projected onto the element.
    pub properties: PropertySet,
    /// Child content, passed through structurally.
    pub children: C,
}

impl Props<()> {
    /// Props without child content.
    #[must_use]
    pub fn new(properties: PropertySet) -> Self {
        Self {
            properties,
            children: (),
        }
    }
}

impl<C> Props<C> {
    /// Props with child content.
    #[must_use]
    pub fn with_children(properties: PropertySet, children: C) -> Self {
        Self {
            properties,
            children,
        }
    }
}

impl From<PropertySet> for Props<()> {
    fn from(properties: PropertySet) -> Self {
        Self::new(properties)
    }
}
