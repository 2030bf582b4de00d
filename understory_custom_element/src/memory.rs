// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless element that records every platform call.
//!
//! [`MemoryElement`] behaves like a DOM element for the purposes of
//! reconciliation: attributes are stored as strings, listeners follow DOM
//! registration rules (one registration per event type and callback), and
//! the data-bag is created on first write. Every call made through
//! [`ElementTarget`] is appended to a [`journal`](MemoryElement::journal),
//! which makes it useful for asserting exactly which writes a pass performed.
//!
//! ```rust
//! use understory_custom_element::{ElementTarget, MemoryElement, Value};
//!
//! let mut el = MemoryElement::new("x-button");
//! el.set_attribute("label", "Save").unwrap();
//! el.store_data("meta", Value::object([("id", Value::from(7))])).unwrap();
//!
//! assert_eq!(el.attribute("label"), Some("Save"));
//! assert!(el.data().is_some_and(|bag| bag.contains_key("meta")));
//! assert_eq!(el.journal().len(), 2);
//! ```

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::reconcile::InitialAttributes;
use crate::target::{DataBag, ElementTarget};
use crate::value::{Callback, Event, Value};

/// One recorded call on a [`MemoryElement`].
#[derive(Clone, Debug, PartialEq)]
pub enum DomOp {
    /// `set_attribute(name, value)`.
    SetAttribute {
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// `add_event_listener(event, _)`.
    AddListener {
        /// Event type.
        event: String,
    },
    /// `remove_event_listener(event, _)`.
    RemoveListener {
        /// Event type.
        event: String,
    },
    /// `store_data(key, _)`.
    StoreData {
        /// Data-bag key.
        key: String,
    },
}

/// An in-memory [`ElementTarget`].
#[derive(Debug)]
pub struct MemoryElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    listeners: Vec<(String, Callback)>,
    data: Option<DataBag>,
    journal: Vec<DomOp>,
}

impl MemoryElement {
    /// Creates an element with no attributes.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
            data: None,
            journal: Vec::new(),
        }
    }

    /// Creates an element carrying `initial` as its construction attributes.
    ///
    /// Construction attributes are not journaled: they are part of the
    /// element's creation, not writes made afterwards.
    #[must_use]
    pub fn with_initial_attributes(tag: &str, initial: &InitialAttributes) -> Self {
        let mut el = Self::new(tag);
        for (name, text) in initial.rendered() {
            el.attributes.insert(name.to_string(), text.into_owned());
        }
        el
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Reads an attribute without allocating.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes, ordered by name.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The data-bag, or `None` if nothing was ever stored.
    #[must_use]
    pub fn data(&self) -> Option<&DataBag> {
        self.data.as_ref()
    }

    /// Number of callbacks currently registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.iter().filter(|(e, _)| e == event).count()
    }

    /// Total number of registered listeners across all event types.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if `callback` is registered for `event`.
    #[must_use]
    pub fn has_listener(&self, event: &str, callback: &Callback) -> bool {
        self.listeners
            .iter()
            .any(|(e, cb)| e == event && cb.ptr_eq(callback))
    }

    /// Fires an event, invoking every listener registered for its type in
    /// registration order. Returns how many listeners ran.
    pub fn dispatch(&self, event: &str, detail: Value) -> usize {
        let event = Event::new(event, detail);
        // Snapshot so a handler cannot observe a half-updated list.
        let targets: Vec<Callback> = self
            .listeners
            .iter()
            .filter(|(e, _)| e == event.name())
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in &targets {
            callback.call(&event);
        }
        targets.len()
    }

    /// Every call made through [`ElementTarget`], oldest first.
    #[must_use]
    pub fn journal(&self) -> &[DomOp] {
        &self.journal
    }

    /// Takes the journal, leaving it empty.
    pub fn take_journal(&mut self) -> Vec<DomOp> {
        core::mem::take(&mut self.journal)
    }
}

impl ElementTarget for MemoryElement {
    type Error = Infallible;

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        self.journal.push(DomOp::SetAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        self.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn add_event_listener(&mut self, event: &str, callback: &Callback) -> Result<(), Self::Error> {
        self.journal.push(DomOp::AddListener {
            event: event.to_string(),
        });
        if !self.has_listener(event, callback) {
            self.listeners.push((event.to_string(), callback.clone()));
        }
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        event: &str,
        callback: &Callback,
    ) -> Result<(), Self::Error> {
        self.journal.push(DomOp::RemoveListener {
            event: event.to_string(),
        });
        self.listeners
            .retain(|(e, cb)| !(e == event && cb.ptr_eq(callback)));
        Ok(())
    }

    fn store_data(&mut self, key: &str, value: Value) -> Result<(), Self::Error> {
        self.journal.push(DomOp::StoreData {
            key: key.to_string(),
        });
        self.data
            .get_or_insert_with(DataBag::new)
            .insert(key.to_string(), value);
        Ok(())
    }
}
