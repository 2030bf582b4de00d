// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically shaped property values.
//!
//! A [`Value`] is what a parent render hands to a wrapped element for one
//! property. Its shape decides how the value reaches the element, as reported
//! by [`Value::kind`]:
//!
//! - [`PropertyKind::Callback`]: wired up as an event listener.
//! - [`PropertyKind::Structured`]: arrays and objects, stored in the element's data-bag.
//! - [`PropertyKind::Scalar`]: everything else, written as an attribute.
//!
//! Arrays, objects and callbacks are reference counted. Two values are the
//! [same](Value::same_as) when they share the allocation, which is what lets
//! reconciliation skip a structured property whose reference did not change.

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Key/value aggregate held by [`Value::Object`].
pub type ObjectMap = BTreeMap<String, Value>;

/// An event delivered to a [`Callback`].
///
/// `detail` carries the payload of a custom event, or [`Value::Null`] when the
/// platform event has none.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    name: String,
    detail: Value,
}

impl Event {
    /// Creates an event with the given name and payload.
    #[must_use]
    pub fn new(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }

    /// The event type, e.g. `"click"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event payload.
    #[must_use]
    pub fn detail(&self) -> &Value {
        &self.detail
    }
}

/// A shared, invocable event handler.
///
/// Cloning a `Callback` shares the handler; [`Callback::ptr_eq`] is the
/// identity used both for change detection and for listener removal.
///
/// ```rust
/// use understory_custom_element::{Callback, Event, Value};
///
/// let a = Callback::new(|_: &Event| {});
/// let b = a.clone();
/// assert!(a.ptr_eq(&b));
/// assert!(!a.ptr_eq(&Callback::new(|_: &Event| {})));
/// ```
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Event)>);

impl Callback {
    /// Wraps a closure as a callback.
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invokes the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    /// Returns `true` if both callbacks share the same handler allocation.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A property value as supplied by the host framework.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absent/null value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(Rc<str>),
    /// A shared sequence of values.
    Array(Rc<[Value]>),
    /// A shared key/value aggregate.
    Object(Rc<ObjectMap>),
    /// An event handler.
    Callback(Callback),
}

/// How a [`Value`] reaches the element, derived from its shape.
///
/// Computed afresh by [`Value::kind`] on every pass; a property may change
/// kind from one render to the next.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PropertyKind<'a> {
    /// Attached as an event listener named after the property.
    Callback(&'a Callback),
    /// Stored in the element's data-bag.
    Structured(&'a Value),
    /// Written as an attribute.
    Scalar(&'a Value),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(Rc::from(s))
    }

    /// Creates an array value from the given items.
    pub fn array(items: impl IntoIterator<Item = Self>) -> Self {
        let items: Vec<Self> = items.into_iter().collect();
        Self::Array(Rc::from(items))
    }

    /// Creates an object value from the given entries.
    ///
    /// Later entries replace earlier ones with the same key.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Creates a callback value.
    pub fn callback(handler: impl Fn(&Event) + 'static) -> Self {
        Self::Callback(Callback::new(handler))
    }

    /// Classifies this value by shape.
    ///
    /// ```rust
    /// use understory_custom_element::{PropertyKind, Value};
    ///
    /// assert!(matches!(Value::from("Save").kind(), PropertyKind::Scalar(_)));
    /// assert!(matches!(Value::Null.kind(), PropertyKind::Scalar(_)));
    /// assert!(matches!(Value::array([]).kind(), PropertyKind::Structured(_)));
    /// assert!(matches!(Value::callback(|_| {}).kind(), PropertyKind::Callback(_)));
    /// ```
    #[must_use]
    pub fn kind(&self) -> PropertyKind<'_> {
        match self {
            Self::Callback(callback) => PropertyKind::Callback(callback),
            Self::Array(_) | Self::Object(_) => PropertyKind::Structured(self),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => {
                PropertyKind::Scalar(self)
            }
        }
    }

    /// Identity comparison used for change detection.
    ///
    /// Primitives compare by value (`NaN` never matches, as in the host
    /// platform's strict equality). Arrays, objects and callbacks compare by
    /// allocation, so a rebuilt aggregate with identical contents is still a
    /// change.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Callback(a), Self::Callback(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Renders a scalar the way the platform stringifies attribute values.
    ///
    /// Returns `None` for structured values and callbacks, which are never
    /// written as attributes.
    ///
    /// ```rust
    /// use understory_custom_element::Value;
    ///
    /// assert_eq!(Value::from(7).attribute_text().as_deref(), Some("7"));
    /// assert_eq!(Value::from(0.5).attribute_text().as_deref(), Some("0.5"));
    /// assert_eq!(Value::Null.attribute_text().as_deref(), Some("null"));
    /// assert_eq!(Value::array([]).attribute_text(), None);
    /// ```
    #[must_use]
    pub fn attribute_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => Some(Cow::Borrowed("null")),
            Self::Bool(true) => Some(Cow::Borrowed("true")),
            Self::Bool(false) => Some(Cow::Borrowed("false")),
            Self::Number(n) => Some(number_text(*n)),
            Self::String(s) => Some(Cow::Borrowed(&**s)),
            Self::Array(_) | Self::Object(_) | Self::Callback(_) => None,
        }
    }

    /// Returns the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(&**s),
            _ => None,
        }
    }

    /// Returns the callback, if this is one.
    #[must_use]
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Callback(callback) => Some(callback),
            _ => None,
        }
    }

    /// Returns the object entries, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(map) => Some(&**map),
            _ => None,
        }
    }

    /// Returns the array items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(&**items),
            _ => None,
        }
    }
}

fn number_text(n: f64) -> Cow<'static, str> {
    if n.is_nan() {
        Cow::Borrowed("NaN")
    } else if n == f64::INFINITY {
        Cow::Borrowed("Infinity")
    } else if n == f64::NEG_INFINITY {
        Cow::Borrowed("-Infinity")
    } else if n == 0.0 {
        // Covers -0.0 too.
        Cow::Borrowed("0")
    } else {
        Cow::Owned(finite_number_text(n))
    }
}

/// Formats a finite, nonzero number with the shortest round-trip digits,
/// switching to exponent form outside `1e-7 < |n| < 1e21`.
fn finite_number_text(n: f64) -> String {
    // `{:e}` yields the shortest round-trip digits as `d[.ddd]e<exp>`.
    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    // Position of the decimal point relative to the start of `digits`.
    let point = exp + 1;

    let mut out = String::with_capacity(digits.len() + 8);
    if n < 0.0 {
        out.push('-');
    }
    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(core::iter::repeat_n('0', usize::try_from(point - k).unwrap_or(0)));
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(usize::try_from(point).unwrap_or(0));
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(core::iter::repeat_n('0', usize::try_from(-point).unwrap_or(0)));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if point > 0 { '+' } else { '-' });
        out.push_str(&format!("{}", (point - 1).abs()));
    }
    out
}

/// Structural equality: aggregates compare by contents, callbacks by identity.
///
/// Reconciliation does not use this; see [`Value::same_as`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<Callback> for Value {
    fn from(callback: Callback) -> Self {
        Self::Callback(callback)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
