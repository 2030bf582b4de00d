// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element surface reconciliation writes to.

use alloc::string::String;
use hashbrown::HashMap;

use crate::value::{Callback, Value};

/// Out-of-band storage for structured property values on an element.
pub type DataBag = HashMap<String, Value>;

/// A live custom element instance.
///
/// This is the whole platform surface the reconciler needs. Implementations
/// exist for the in-memory [`MemoryElement`](crate::MemoryElement) and, in
/// `understory_custom_element_web`, for `web_sys::Element`.
///
/// Failures are the platform's own: the reconciler returns them to its caller
/// untouched.
pub trait ElementTarget {
    /// Error raised by the platform when a write fails.
    type Error;

    /// Sets attribute `name` to `value`.
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;

    /// Reads attribute `name`, if present.
    fn get_attribute(&self, name: &str) -> Option<String>;

    /// Registers `callback` for events of type `event`.
    ///
    /// Registering the same callback twice for one event type must not cause
    /// it to fire twice.
    fn add_event_listener(&mut self, event: &str, callback: &Callback) -> Result<(), Self::Error>;

    /// Unregisters `callback` for events of type `event`.
    ///
    /// Removing a callback that is not registered is a no-op.
    fn remove_event_listener(
        &mut self,
        event: &str,
        callback: &Callback,
    ) -> Result<(), Self::Error>;

    /// Stores `value` under `key` in the element's data-bag.
    ///
    /// The bag is created empty the first time anything is stored.
    fn store_data(&mut self, key: &str, value: Value) -> Result<(), Self::Error>;
}

impl<T: ElementTarget + ?Sized> ElementTarget for &mut T {
    type Error = T::Error;

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set_attribute(name, value)
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        (**self).get_attribute(name)
    }

    fn add_event_listener(&mut self, event: &str, callback: &Callback) -> Result<(), Self::Error> {
        (**self).add_event_listener(event, callback)
    }

    fn remove_event_listener(
        &mut self,
        event: &str,
        callback: &Callback,
    ) -> Result<(), Self::Error> {
        (**self).remove_event_listener(event, callback)
    }

    fn store_data(&mut self, key: &str, value: Value) -> Result<(), Self::Error> {
        (**self).store_data(key, value)
    }
}
