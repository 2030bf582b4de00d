// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_custom_element_web --heading-base-level=0

//! Browser backend for Understory custom element wrappers.
//!
//! This crate provides an [`ElementTarget`] implementation backed by
//! `web_sys::Element` when targeting `wasm32`.
//!
//! # Usage
//!
//! Create the element from the wrapper's blueprint with `create_element`,
//! then hand it to the wrapper wrapped in a `WebElement`:
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn mount(
//!     document: &web_sys::Document,
//!     wrapper: &mut understory_custom_element::CustomElementWrapper<
//!         understory_custom_element_web::WebElement,
//!     >,
//! ) -> Result<web_sys::Element, wasm_bindgen::JsValue> {
//!     let blueprint = wrapper.blueprint();
//!     let element = understory_custom_element_web::create_element(
//!         document,
//!         blueprint.tag.as_str(),
//!         blueprint.attributes,
//!     )?;
//!     wrapper
//!         .mount(understory_custom_element_web::WebElement::new(element.clone()))
//!         .map_err(|err| wasm_bindgen::JsValue::from_str(&err.to_string()))?;
//!     Ok(element)
//! }
//! ```
//!
//! Notes:
//! - Listener closures are owned by the `WebElement`. Unmount the wrapper
//!   before dropping it, or the browser keeps calling into freed closures.
//! - The data-bag is the element's `data` property. It is created as a plain
//!   object on first write unless the element already defines one.
//! - Callbacks nested inside structured values are exported as JS functions
//!   owned by the JS garbage collector.
//!
//! [`ElementTarget`]: understory_custom_element::ElementTarget

#![no_std]

extern crate alloc;

#[cfg(target_arch = "wasm32")]
use alloc::{
    string::{String, ToString},
    vec::Vec,
};
#[cfg(target_arch = "wasm32")]
use understory_custom_element::{Callback, ElementTarget, Event, InitialAttributes, Value};

#[cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Object, Reflect};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use web_sys::{CustomEvent, Document, Element};

/// Nesting depth past which imported JS values become `null`.
#[cfg(target_arch = "wasm32")]
const MAX_IMPORT_DEPTH: usize = 32;

/// Property name of the data-bag on the element.
#[cfg(target_arch = "wasm32")]
const DATA_PROPERTY: &str = "data";

/// Creates `tag` in `document` with the wrapper's initial attributes.
#[cfg(target_arch = "wasm32")]
pub fn create_element(
    document: &Document,
    tag: &str,
    initial: &InitialAttributes,
) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    for (name, text) in initial.rendered() {
        element.set_attribute(name, &text)?;
    }
    Ok(element)
}

/// Converts a value to its JS counterpart.
///
/// Arrays and objects are copied; callbacks become JS functions that forward
/// their first argument as the event detail.
#[cfg(target_arch = "wasm32")]
pub fn value_to_js(value: &Value) -> Result<JsValue, JsValue> {
    Ok(match value {
        Value::Null => JsValue::NULL,
        Value::Bool(b) => JsValue::from_bool(*b),
        Value::Number(n) => JsValue::from_f64(*n),
        Value::String(s) => JsValue::from_str(s),
        Value::Array(items) => {
            let array = Array::new();
            for item in items.iter() {
                array.push(&value_to_js(item)?);
            }
            array.into()
        }
        Value::Object(map) => {
            let object = Object::new();
            for (key, item) in map.iter() {
                Reflect::set(&object, &JsValue::from_str(key), &value_to_js(item)?)?;
            }
            object.into()
        }
        Value::Callback(callback) => {
            let callback = callback.clone();
            Closure::<dyn Fn(JsValue)>::new(move |detail: JsValue| {
                callback.call(&Event::new("call", value_from_js(&detail)));
            })
            .into_js_value()
        }
    })
}

/// Converts a JS value into a [`Value`].
///
/// `undefined` maps to `Null`, as do values nested deeper than the import
/// limit. JS functions become callbacks that receive the event detail; an
/// exception thrown by the function propagates out of the callback.
#[cfg(target_arch = "wasm32")]
pub fn value_from_js(value: &JsValue) -> Value {
    import(value, 0)
}

#[cfg(target_arch = "wasm32")]
fn import(value: &JsValue, depth: usize) -> Value {
    if value.is_null() || value.is_undefined() {
        return Value::Null;
    }
    if let Some(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Some(n) = value.as_f64() {
        return Value::Number(n);
    }
    if let Some(s) = value.as_string() {
        return Value::from(s);
    }
    if depth >= MAX_IMPORT_DEPTH {
        return Value::Null;
    }
    if value.is_function() {
        let function: Function = value.clone().unchecked_into();
        // Exceptions are rethrown to the JS caller that dispatched the event.
        return Value::callback(move |event| {
            let result = value_to_js(event.detail())
                .and_then(|detail| function.call1(&JsValue::NULL, &detail));
            if let Err(err) = result {
                wasm_bindgen::throw_val(err);
            }
        });
    }
    if Array::is_array(value) {
        let array: &Array = value.unchecked_ref();
        return Value::array(array.iter().map(|item| import(&item, depth + 1)));
    }
    if let Some(object) = value.dyn_ref::<Object>() {
        let entries: Vec<(String, Value)> = Object::keys(object)
            .iter()
            .filter_map(|key| {
                let item = Reflect::get(object, &key).ok()?;
                Some((key.as_string()?, import(&item, depth + 1)))
            })
            .collect();
        return Value::object(entries);
    }
    Value::Null
}

/// An [`ElementTarget`] backed by a live DOM element.
///
/// Keeps one JS closure per attached listener; the closure is what the
/// browser holds, so it has to outlive the registration.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
pub struct WebElement {
    element: Element,
    listeners: Vec<(String, Callback, Closure<dyn FnMut(web_sys::Event)>)>,
}

#[cfg(target_arch = "wasm32")]
impl WebElement {
    /// Wraps `element`.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            listeners: Vec::new(),
        }
    }

    /// The underlying element.
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Number of listeners this wrapper has registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn find(&self, event: &str, callback: &Callback) -> Option<usize> {
        self.listeners
            .iter()
            .position(|(e, cb, _)| e == event && cb.ptr_eq(callback))
    }

    fn data_bag(&self) -> Result<JsValue, JsValue> {
        let key = JsValue::from_str(DATA_PROPERTY);
        let bag = Reflect::get(&self.element, &key)?;
        if bag.is_object() {
            return Ok(bag);
        }
        let bag: JsValue = Object::new().into();
        Reflect::set(&self.element, &key, &bag)?;
        Ok(bag)
    }
}

#[cfg(target_arch = "wasm32")]
impl ElementTarget for WebElement {
    type Error = JsValue;

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        self.element.set_attribute(name, value)
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn add_event_listener(&mut self, event: &str, callback: &Callback) -> Result<(), Self::Error> {
        // The browser ignores duplicate registrations; so do we.
        if self.find(event, callback).is_some() {
            return Ok(());
        }
        let handler = callback.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let detail = event
                .dyn_ref::<CustomEvent>()
                .map_or(Value::Null, |custom| value_from_js(&custom.detail()));
            handler.call(&Event::new(event.type_(), detail));
        });
        self.element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners
            .push((event.to_string(), callback.clone(), closure));
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        event: &str,
        callback: &Callback,
    ) -> Result<(), Self::Error> {
        let Some(idx) = self.find(event, callback) else {
            return Ok(());
        };
        let (_, _, closure) = &self.listeners[idx];
        self.element
            .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.remove(idx);
        Ok(())
    }

    fn store_data(&mut self, key: &str, value: Value) -> Result<(), Self::Error> {
        let bag = self.data_bag()?;
        Reflect::set(&bag, &JsValue::from_str(key), &value_to_js(&value)?)?;
        Ok(())
    }
}

/// Stub type for non-wasm targets so the crate can be included in the workspace.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct WebElement;
