// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrapped custom element definitions.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::fmt;

use crate::config::WrapperConfig;
use crate::lifecycle::CustomElementWrapper;
use crate::props::Props;
use crate::reconcile::Reconciler;

/// Names the platform reserves even though they look like custom element names.
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Why a tag name is not a valid custom element name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagNameIssue {
    /// The name does not start with an ASCII lowercase letter.
    InvalidStart,
    /// The name has no hyphen.
    MissingHyphen,
    /// The name contains an ASCII uppercase letter or a disallowed character.
    InvalidCharacter(char),
    /// The name is reserved by the platform.
    Reserved,
}

/// Error returned when a tag name cannot name a custom element.
#[derive(Clone, PartialEq, Eq)]
pub struct InvalidTagName {
    /// The rejected name.
    pub tag: String,
    /// What is wrong with it.
    pub issue: TagNameIssue,
}

impl fmt::Debug for InvalidTagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvalidTagName {{ tag: {:?}, issue: {:?} }}",
            self.tag, self.issue
        )
    }
}

impl fmt::Display for InvalidTagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issue {
            TagNameIssue::InvalidStart => write!(
                f,
                "custom element name {:?} must start with a lowercase ASCII letter",
                self.tag
            ),
            TagNameIssue::MissingHyphen => {
                write!(f, "custom element name {:?} must contain a hyphen", self.tag)
            }
            TagNameIssue::InvalidCharacter(c) => write!(
                f,
                "custom element name {:?} contains invalid character {c:?}",
                self.tag
            ),
            TagNameIssue::Reserved => {
                write!(f, "custom element name {:?} is reserved", self.tag)
            }
        }
    }
}

impl core::error::Error for InvalidTagName {}

/// A validated custom element name.
///
/// ```rust
/// use understory_custom_element::{TagName, TagNameIssue};
///
/// assert!(TagName::new("x-button").is_ok());
/// assert!(TagName::new("math-α").is_ok());
/// assert_eq!(TagName::new("button").unwrap_err().issue, TagNameIssue::MissingHyphen);
/// assert_eq!(TagName::new("My-button").unwrap_err().issue, TagNameIssue::InvalidStart);
/// assert_eq!(TagName::new("font-face").unwrap_err().issue, TagNameIssue::Reserved);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagName(Rc<str>);

impl TagName {
    /// Validates `tag` as a custom element name.
    pub fn new(tag: &str) -> Result<Self, InvalidTagName> {
        let reject = |issue| InvalidTagName {
            tag: tag.to_string(),
            issue,
        };
        if !tag.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(reject(TagNameIssue::InvalidStart));
        }
        if let Some(c) = tag.chars().find(|&c| !is_name_char(c)) {
            return Err(reject(TagNameIssue::InvalidCharacter(c)));
        }
        if !tag.contains('-') {
            return Err(reject(TagNameIssue::MissingHyphen));
        }
        if RESERVED_NAMES.contains(&tag) {
            return Err(reject(TagNameIssue::Reserved));
        }
        Ok(Self(Rc::from(tag)))
    }

    /// The name as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_name_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-' | '.' | '_') || !c.is_ascii()
}

/// A custom element made available to a declarative host.
///
/// Holds the element's tag name and the reconciliation policy shared by all
/// of its instances. Each [`instantiate`](Self::instantiate) call yields an
/// independent wrapper with its own cache and listener registry.
///
/// ```rust
/// use understory_custom_element::{
///     CustomElement, MemoryElement, PropertySet, Props, WrapperConfig,
/// };
///
/// let button = CustomElement::new("x-button", WrapperConfig::default()).unwrap();
/// let mut wrapper = button.instantiate::<MemoryElement, _>(Props::new(
///     PropertySet::new().with("label", "Save"),
/// ));
///
/// let blueprint = wrapper.blueprint();
/// let element = MemoryElement::with_initial_attributes(blueprint.tag.as_str(), blueprint.attributes);
/// wrapper.mount(element).unwrap();
/// assert_eq!(wrapper.target().and_then(|el| el.attribute("label")), Some("Save"));
/// ```
#[derive(Clone, Debug)]
pub struct CustomElement {
    tag: TagName,
    reconciler: Reconciler,
}

impl CustomElement {
    /// Defines a wrapper for the custom element named `tag`.
    pub fn new(tag: &str, config: WrapperConfig) -> Result<Self, InvalidTagName> {
        Ok(Self {
            tag: TagName::new(tag)?,
            reconciler: Reconciler::new(config),
        })
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> &TagName {
        &self.tag
    }

    /// The shared reconciliation policy.
    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// The configuration instances are created with.
    #[must_use]
    pub fn config(&self) -> &WrapperConfig {
        self.reconciler.config()
    }

    /// Creates a new instance from the first render's props.
    ///
    /// The instance starts out constructed: scalar properties are buffered
    /// as initial attributes until the host mounts an element.
    #[must_use]
    pub fn instantiate<T, C>(&self, props: Props<C>) -> CustomElementWrapper<T, C> {
        CustomElementWrapper::new(self.tag.clone(), self.reconciler.clone(), props)
    }
}
