// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrapper configuration.

use alloc::string::{String, ToString};

/// Prefix used for marker attributes when none is configured.
pub const DEFAULT_MARKER_PREFIX: &str = "_";

/// When the host should run the post-mount/update pass relative to paint.
///
/// The reconciler behaves identically under both; this only tells the host
/// which of its effect queues to use.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectTiming {
    /// Run after the frame is painted.
    #[default]
    Deferred,
    /// Run synchronously after layout, before paint. Avoids a frame showing
    /// stale attributes at the cost of blocking the paint.
    Layout,
}

/// Configuration shared by every instance of one wrapped element.
///
/// ```rust
/// use understory_custom_element::{EffectTiming, WrapperConfig};
///
/// let config = WrapperConfig::default()
///     .layout_effect(true)
///     .marker_prefix("changed-");
///
/// assert_eq!(config.effect_timing(), EffectTiming::Layout);
/// assert!(config.marker_attributes_enabled());
/// assert_eq!(config.marker_name("rows"), "changed-rows");
///
/// // An empty prefix falls back to the default.
/// let config = WrapperConfig::default().marker_prefix("");
/// assert_eq!(config.marker_name("rows"), "_rows");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperConfig {
    timing: EffectTiming,
    marker_attributes: bool,
    marker_prefix: String,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            timing: EffectTiming::Deferred,
            marker_attributes: true,
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
        }
    }
}

impl WrapperConfig {
    /// Sets the effect timing.
    #[must_use]
    pub fn timing(mut self, timing: EffectTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Selects [`EffectTiming::Layout`] when `true`, [`EffectTiming::Deferred`] otherwise.
    #[must_use]
    pub fn layout_effect(self, enabled: bool) -> Self {
        self.timing(if enabled {
            EffectTiming::Layout
        } else {
            EffectTiming::Deferred
        })
    }

    /// Enables or disables marker attributes for structured values.
    ///
    /// When enabled, every change to a structured property flips the boolean
    /// attribute `<prefix><name>`, so observers of attribute mutations learn
    /// that the out-of-band data changed.
    #[must_use]
    pub fn marker_attributes(mut self, enabled: bool) -> Self {
        self.marker_attributes = enabled;
        self
    }

    /// Sets the marker attribute prefix. An empty prefix selects
    /// [`DEFAULT_MARKER_PREFIX`].
    #[must_use]
    pub fn marker_prefix(mut self, prefix: &str) -> Self {
        self.marker_prefix = if prefix.is_empty() {
            DEFAULT_MARKER_PREFIX
        } else {
            prefix
        }
        .to_string();
        self
    }

    /// The configured effect timing.
    #[must_use]
    pub fn effect_timing(&self) -> EffectTiming {
        self.timing
    }

    /// Whether marker attributes are toggled for structured values.
    #[must_use]
    pub fn marker_attributes_enabled(&self) -> bool {
        self.marker_attributes
    }

    /// The marker attribute prefix; never empty.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.marker_prefix
    }

    /// The marker attribute name for property `name`.
    #[must_use]
    pub fn marker_name(&self, name: &str) -> String {
        let mut marker = String::with_capacity(self.marker_prefix.len() + name.len());
        marker.push_str(&self.marker_prefix);
        marker.push_str(name);
        marker
    }
}
