// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_custom_element --heading-base-level=0

//! Understory Custom Element: drive imperatively configured custom elements
//! from declarative property sets.
//!
//! ## Overview
//!
//! A declarative host renders a wrapped element with a fresh [`PropertySet`]
//! every time. This crate projects those properties onto the live element
//! with as few writes as it can:
//!
//! - **Callbacks** become event listeners named after the property
//!   (`"click"` → a `click` listener).
//! - **Structured values** (arrays, objects) are stored in the element's
//!   data-bag, since attributes only hold strings. A boolean marker attribute
//!   (`_<name>` by default) flips on every change so attribute observers can
//!   react.
//! - **Scalars** (strings, numbers, booleans, null) become attributes.
//!
//! The kind of each property is decided from its [`Value`] on every pass, so
//! a property may switch kinds between renders.
//!
//! ## Layering
//!
//! - [`Reconciler`] is the policy: given a property set, an
//!   [`ElementTarget`], and per-instance [`ReconcileState`], it applies one
//!   pass and reports what it did in a [`PassReport`].
//! - [`CustomElementWrapper`] is the lifecycle around it: construct (buffer
//!   initial attributes), mount, update, unmount. It makes sure listeners from
//!   one pass are gone before the next.
//! - [`CustomElement`] is the definition a host registers once per tag and
//!   instantiates per use.
//!
//! The element itself is abstracted by [`ElementTarget`]. [`MemoryElement`]
//! implements it in memory and journals every call; the
//! `understory_custom_element_web` crate implements it for `web_sys::Element`.
//!
//! ## Example
//!
//! ```rust
//! use understory_custom_element::{
//!     CustomElement, MemoryElement, PropertySet, Props, Value, WrapperConfig,
//! };
//!
//! let table = CustomElement::new("x-table", WrapperConfig::default()).unwrap();
//!
//! let rows = Value::array([Value::from("a"), Value::from("b")]);
//! let select = Value::callback(|event| {
//!     let _row = event.detail();
//! });
//! let props = PropertySet::new()
//!     .with("caption", "Letters")
//!     .with("rows", rows.clone())
//!     .with("select", select.clone());
//!
//! // First render: no element yet, scalars are buffered.
//! let mut wrapper = table.instantiate::<MemoryElement, _>(Props::new(props));
//! let blueprint = wrapper.blueprint();
//! let element = MemoryElement::with_initial_attributes(blueprint.tag.as_str(), blueprint.attributes);
//!
//! // Element resolved: full pass.
//! wrapper.mount(element).unwrap();
//! let el = wrapper.target().unwrap();
//! assert_eq!(el.attribute("caption"), Some("Letters"));
//! assert_eq!(el.attribute("_rows"), Some("true"));
//! assert_eq!(el.listener_count("select"), 1);
//!
//! // Re-render with a new caption; `rows` keeps its reference and is skipped.
//! let report = wrapper
//!     .update(Props::new(
//!         PropertySet::new()
//!             .with("caption", "Letters!")
//!             .with("rows", rows)
//!             .with("select", select),
//!     ))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(report.attributes_set, 1);
//! assert_eq!(report.markers_toggled, 0);
//!
//! let element = wrapper.unmount().unwrap().unwrap();
//! assert_eq!(element.total_listeners(), 0);
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events for each pass (`custom_element.pass`),
//!   listener cleanup, and lifecycle transitions.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod definition;
mod lifecycle;
mod memory;
mod props;
mod reconcile;
mod target;
mod value;

pub use config::{DEFAULT_MARKER_PREFIX, EffectTiming, WrapperConfig};
pub use definition::{CustomElement, InvalidTagName, TagName, TagNameIssue};
pub use lifecycle::{Blueprint, CustomElementWrapper, LifecycleError, LifecyclePhase};
pub use memory::{DomOp, MemoryElement};
pub use props::{CHILDREN_PROPERTY, PropertySet, Props};
pub use reconcile::{
    InitialAttributes, ListenerRegistry, PassMode, PassReport, ReconcileState,
    ReconciliationCache, Reconciler,
};
pub use target::{DataBag, ElementTarget};
pub use value::{Callback, Event, ObjectMap, PropertyKind, Value};
