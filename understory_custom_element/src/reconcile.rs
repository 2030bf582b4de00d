// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property reconciliation.
//!
//! A [`Reconciler`] projects a [`PropertySet`] onto an [`ElementTarget`]. For
//! each property, in name order:
//!
//! 1. In [`PassMode::Cached`], the value is compared by identity with the
//!    one seen on the previous cached pass and the cache is updated. An
//!    unchanged value is skipped outright.
//! 2. The value is classified by shape ([`Value::kind`]) and applied:
//!    - callbacks become event listeners named after the property, replacing
//!      any listener previously attached for that name;
//!    - structured values go into the element's data-bag, and flip the
//!      property's marker attribute when markers are enabled;
//!    - scalars are written as attributes.
//!
//! Before an element exists, [`Reconciler::reconcile_detached`] collects the
//! scalars into [`InitialAttributes`] for the host to create the element with.
//!
//! The redundancy check is deliberately coarse: it sees a new array or object
//! as a change even when its contents are equal. Hosts that want fewer writes
//! should keep aggregate references stable across renders.
//!
//! ## Listener bookkeeping
//!
//! [`ListenerRegistry`] records, per property name, the callback last wired up
//! and whether it is currently attached. The attached entries are exactly the
//! listeners present on the element. [`Reconciler::cleanup`] detaches them
//! all but keeps the entries, and forgets their cached values so the next
//! cached pass re-attaches callbacks even when they did not change.
//!
//! ```rust
//! use understory_custom_element::{
//!     MemoryElement, PassMode, PropertySet, ReconcileState, Reconciler, Value, WrapperConfig,
//! };
//!
//! let reconciler = Reconciler::new(WrapperConfig::default());
//! let mut element = MemoryElement::new("x-button");
//! let mut state = ReconcileState::default();
//!
//! let on_click = Value::callback(|_| {});
//! let meta = Value::object([("id", Value::from(7))]);
//! let props = PropertySet::new()
//!     .with("click", on_click.clone())
//!     .with("label", "Save")
//!     .with("meta", meta.clone());
//!
//! reconciler
//!     .reconcile(&props, &mut element, &mut state, PassMode::Cached)
//!     .unwrap();
//! assert_eq!(element.attribute("label"), Some("Save"));
//! assert_eq!(element.attribute("_meta"), Some("true"));
//! assert_eq!(element.listener_count("click"), 1);
//!
//! // Only the label changed; callbacks and `meta` keep their references.
//! let props = props.with("label", "Saved");
//! let report = reconciler
//!     .reconcile(&props, &mut element, &mut state, PassMode::Cached)
//!     .unwrap();
//! assert_eq!(report.attributes_set, 1);
//! assert_eq!(report.skipped, 2);
//! ```

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::config::WrapperConfig;
use crate::props::{CHILDREN_PROPERTY, PropertySet};
use crate::target::ElementTarget;
use crate::value::{Callback, PropertyKind, Value};

/// Whether a pass consults the [`ReconciliationCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PassMode {
    /// Apply every property; neither read nor write the cache.
    Uncached,
    /// Skip properties whose value is identical to the previous cached pass.
    #[default]
    Cached,
}

/// Last value applied per property during cached passes.
#[derive(Clone, Debug, Default)]
pub struct ReconciliationCache {
    entries: HashMap<Rc<str>, Value>,
}

impl ReconciliationCache {
    /// The cached value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Number of cached properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records `value` for `name`; returns `true` if it is the same value
    /// as the one it replaced.
    fn record(&mut self, name: &Rc<str>, value: &Value) -> bool {
        self.entries
            .insert(Rc::clone(name), value.clone())
            .is_some_and(|previous| previous.same_as(value))
    }
}

#[derive(Clone, Debug)]
struct Listener {
    callback: Callback,
    attached: bool,
}

/// Callbacks wired up as listeners, by property (and event) name.
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    entries: HashMap<Rc<str>, Listener>,
}

impl ListenerRegistry {
    /// The callback last registered for `name`, attached or not.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.entries.get(name).map(|listener| &listener.callback)
    }

    /// Returns `true` if the callback for `name` is currently attached.
    #[must_use]
    pub fn is_attached(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|listener| listener.attached)
    }

    /// Iterates over the currently attached `(event, callback)` pairs.
    pub fn attached(&self) -> impl Iterator<Item = (&str, &Callback)> + '_ {
        self.entries
            .iter()
            .filter(|(_, listener)| listener.attached)
            .map(|(name, listener)| (&**name, &listener.callback))
    }

    /// Number of entries, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no callback was ever registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-instance reconciliation state: the cache and the listener registry.
///
/// Owned by exactly one wrapper instance and dropped with it.
#[derive(Clone, Debug, Default)]
pub struct ReconcileState {
    cache: ReconciliationCache,
    listeners: ListenerRegistry,
}

impl ReconcileState {
    /// The reconciliation cache.
    #[must_use]
    pub fn cache(&self) -> &ReconciliationCache {
        &self.cache
    }

    /// The listener registry.
    #[must_use]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Seeds the cache with buffered attributes the element already carries,
    /// so the first cached pass does not write them again.
    ///
    /// An entry is seeded only if `target` currently reads back its rendered
    /// text. The host may have created the element from an older buffer; those
    /// attributes stay unseeded and are written by the next cached pass.
    /// Returns the number of entries seeded.
    pub fn seed_initial_attributes<T: ElementTarget + ?Sized>(
        &mut self,
        initial: &InitialAttributes,
        target: &T,
    ) -> usize {
        let mut seeded = 0;
        for (name, value) in &initial.entries {
            let text = value.attribute_text().unwrap_or_default();
            if target.get_attribute(name).as_deref() != Some(&*text) {
                continue;
            }
            self.cache.entries.insert(Rc::clone(name), value.clone());
            seeded += 1;
        }
        seeded
    }
}

/// Scalar properties collected before the element exists.
///
/// The host creates the element with these as its initial attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InitialAttributes {
    entries: Vec<(Rc<str>, Value)>,
}

impl InitialAttributes {
    fn find(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(entry, _)| (**entry).cmp(name))
    }

    fn insert_shared(&mut self, name: &Rc<str>, value: Value) {
        match self.find(name) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (Rc::clone(name), value)),
        }
    }

    /// Sets an initial attribute.
    pub fn insert(&mut self, name: &str, value: Value) {
        self.insert_shared(&Rc::from(name), value);
    }

    /// The buffered value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).ok().map(|idx| &self.entries[idx].1)
    }

    /// Number of buffered attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the buffered values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(name, value)| (&**name, value))
    }

    /// Iterates over the attribute name and text to create the element with.
    pub fn rendered(&self) -> impl Iterator<Item = (&str, Cow<'_, str>)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (&**name, value.attribute_text().unwrap_or_default()))
    }
}

/// What a pass did, for logging and assertions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Properties considered, excluding the reserved `children`.
    pub properties: usize,
    /// Properties skipped because their value was unchanged.
    pub skipped: usize,
    /// Attribute writes for scalar properties.
    pub attributes_set: usize,
    /// Data-bag writes for structured properties.
    pub data_stored: usize,
    /// Marker attribute flips.
    pub markers_toggled: usize,
    /// Listeners attached.
    pub listeners_attached: usize,
    /// Listeners detached, either replaced or no longer callbacks.
    pub listeners_detached: usize,
}

impl PassReport {
    /// Returns `true` if the pass made no change to the element.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.attributes_set == 0
            && self.data_stored == 0
            && self.markers_toggled == 0
            && self.listeners_attached == 0
            && self.listeners_detached == 0
    }
}

/// Applies property sets to elements according to a [`WrapperConfig`].
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    config: WrapperConfig,
}

impl Reconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(config: WrapperConfig) -> Self {
        Self { config }
    }

    /// The configuration this reconciler applies.
    #[must_use]
    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Pass for an element that does not exist yet.
    ///
    /// Scalars are collected into [`InitialAttributes`]; callbacks and
    /// structured values need a live element and are left for the first pass
    /// after mount. The cache is not involved.
    #[must_use]
    pub fn reconcile_detached(&self, properties: &PropertySet) -> InitialAttributes {
        let mut initial = InitialAttributes::default();
        for (name, value) in properties.entries() {
            if &**name == CHILDREN_PROPERTY {
                continue;
            }
            if let PropertyKind::Scalar(scalar) = value.kind() {
                initial.insert_shared(name, scalar.clone());
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "custom_element.pass",
            mode = "detached",
            properties = properties.len(),
            buffered = initial.len(),
        );
        initial
    }

    /// Pass against a live element.
    ///
    /// Errors from the element are returned as soon as they occur; properties
    /// after the failing one are not applied in that pass.
    ///
    /// In [`PassMode::Cached`] the cache records a value before it is applied,
    /// so a property whose write failed is not retried by later cached passes
    /// until its value changes. Run a [`PassMode::Uncached`] pass to force it.
    pub fn reconcile<T: ElementTarget + ?Sized>(
        &self,
        properties: &PropertySet,
        target: &mut T,
        state: &mut ReconcileState,
        mode: PassMode,
    ) -> Result<PassReport, T::Error> {
        let mut report = PassReport::default();
        for (name, value) in properties.entries() {
            if &**name == CHILDREN_PROPERTY {
                continue;
            }
            report.properties += 1;

            if mode == PassMode::Cached && state.cache.record(name, value) {
                report.skipped += 1;
                #[cfg(feature = "tracing")]
                tracing::trace!(property = %name, "unchanged");
                continue;
            }

            match value.kind() {
                PropertyKind::Callback(callback) => {
                    Self::attach(name, callback, target, &mut state.listeners, &mut report)?;
                }
                PropertyKind::Structured(data) => {
                    Self::release(name, target, &mut state.listeners, &mut report)?;
                    target.store_data(name, data.clone())?;
                    report.data_stored += 1;
                    if self.config.marker_attributes_enabled() {
                        let marker = self.config.marker_name(name);
                        let _now = toggle_marker(target, &marker)?;
                        report.markers_toggled += 1;
                        #[cfg(feature = "tracing")]
                        tracing::trace!(property = %name, marker = %marker, now = _now, "stored data");
                    }
                }
                PropertyKind::Scalar(scalar) => {
                    Self::release(name, target, &mut state.listeners, &mut report)?;
                    let text = scalar.attribute_text().unwrap_or_default();
                    target.set_attribute(name, &text)?;
                    report.attributes_set += 1;
                    #[cfg(feature = "tracing")]
                    tracing::trace!(property = %name, value = %text, "set attribute");
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "custom_element.pass",
            mode = ?mode,
            properties = report.properties,
            skipped = report.skipped,
            attributes_set = report.attributes_set,
            data_stored = report.data_stored,
            markers_toggled = report.markers_toggled,
            listeners_attached = report.listeners_attached,
            listeners_detached = report.listeners_detached,
        );
        Ok(report)
    }

    /// Detaches every attached listener recorded in `state`.
    ///
    /// Entries stay in the registry, marked detached. Their cached values are
    /// dropped so the next cached pass attaches them again. Returns the
    /// number of listeners detached.
    pub fn cleanup<T: ElementTarget + ?Sized>(
        &self,
        target: &mut T,
        state: &mut ReconcileState,
    ) -> Result<usize, T::Error> {
        let mut detached = 0;
        for (name, listener) in &mut state.listeners.entries {
            if !listener.attached {
                continue;
            }
            target.remove_event_listener(name, &listener.callback)?;
            listener.attached = false;
            state.cache.entries.remove(&**name);
            detached += 1;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "custom_element.cleanup", detached);
        Ok(detached)
    }

    fn attach<T: ElementTarget + ?Sized>(
        name: &Rc<str>,
        callback: &Callback,
        target: &mut T,
        listeners: &mut ListenerRegistry,
        report: &mut PassReport,
    ) -> Result<(), T::Error> {
        Self::release(name, target, listeners, report)?;
        target.add_event_listener(name, callback)?;
        listeners.entries.insert(
            Rc::clone(name),
            Listener {
                callback: callback.clone(),
                attached: true,
            },
        );
        report.listeners_attached += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(property = %name, "attached listener");
        Ok(())
    }

    /// Detaches the listener attached for `name`, if any, and forgets it.
    fn release<T: ElementTarget + ?Sized>(
        name: &str,
        target: &mut T,
        listeners: &mut ListenerRegistry,
        report: &mut PassReport,
    ) -> Result<(), T::Error> {
        let Some(previous) = listeners.entries.get(name).filter(|l| l.attached) else {
            return Ok(());
        };
        target.remove_event_listener(name, &previous.callback)?;
        listeners.entries.remove(name);
        report.listeners_detached += 1;
        Ok(())
    }
}

/// Flips the boolean marker attribute; absent counts as `false`. Returns the
/// new value.
fn toggle_marker<T: ElementTarget + ?Sized>(target: &mut T, marker: &str) -> Result<bool, T::Error> {
    let next = target.get_attribute(marker).as_deref() != Some("true");
    target.set_attribute(marker, if next { "true" } else { "false" })?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DomOp, MemoryElement};
    use alloc::string::{String, ToString};
    use core::cell::Cell;

    fn cached(
        reconciler: &Reconciler,
        props: &PropertySet,
        el: &mut MemoryElement,
        state: &mut ReconcileState,
    ) -> PassReport {
        reconciler
            .reconcile(props, el, state, PassMode::Cached)
            .unwrap()
    }

    #[test]
    fn example_scenario() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-button");
        let mut state = ReconcileState::default();

        let fn1 = Value::callback(|_| {});
        let meta = Value::object([("id", Value::from(7))]);
        let first = PropertySet::new()
            .with("onClick", fn1.clone())
            .with("label", "Save")
            .with("meta", meta.clone());

        reconciler
            .reconcile(&first, &mut el, &mut state, PassMode::Uncached)
            .unwrap();
        assert!(el.has_listener("onClick", fn1.as_callback().unwrap()));
        assert_eq!(el.attribute("label"), Some("Save"));
        assert_eq!(el.data().and_then(|bag| bag.get("meta")), Some(&meta));
        assert_eq!(el.attribute("_meta"), Some("true"));
        assert!(state.cache().is_empty(), "uncached pass must not fill the cache");

        // The cache was empty, so seed it the way a cached pass would have.
        cached(&reconciler, &first, &mut el, &mut state);
        el.take_journal();

        let second = PropertySet::new()
            .with("onClick", fn1.clone())
            .with("label", "Saved")
            .with("meta", meta.clone());
        let report = cached(&reconciler, &second, &mut el, &mut state);

        assert_eq!(
            el.journal(),
            [DomOp::SetAttribute {
                name: "label".to_string(),
                value: "Saved".to_string(),
            }]
        );
        assert_eq!(report.skipped, 2);
        assert_eq!(el.listener_count("onClick"), 1);
    }

    #[test]
    fn identical_cached_passes_are_noops() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();
        let props = PropertySet::new()
            .with("change", Value::callback(|_| {}))
            .with("rows", Value::array([Value::from(1), Value::from(2)]))
            .with("label", "a")
            .with("count", 3)
            .with("none", Value::Null);

        cached(&reconciler, &props, &mut el, &mut state);
        el.take_journal();
        let report = cached(&reconciler, &props, &mut el, &mut state);

        assert!(report.is_noop(), "{report:?}");
        assert_eq!(report.skipped, 5);
        assert!(el.journal().is_empty());
    }

    #[test]
    fn changed_scalar_writes_once() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();

        cached(
            &reconciler,
            &PropertySet::new().with("label", "a").with("other", 1),
            &mut el,
            &mut state,
        );
        el.take_journal();
        cached(
            &reconciler,
            &PropertySet::new().with("label", "b").with("other", 1),
            &mut el,
            &mut state,
        );

        let writes: usize = el
            .journal()
            .iter()
            .filter(|op| matches!(op, DomOp::SetAttribute { name, value } if name == "label" && value == "b"))
            .count();
        assert_eq!(writes, 1);
        assert_eq!(el.journal().len(), 1);
    }

    #[test]
    fn marker_alternates_on_each_change() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-table");
        let mut state = ReconcileState::default();

        let mut seen = alloc::vec::Vec::new();
        for _ in 0..4 {
            // A fresh array every pass, even though the contents are equal.
            let props = PropertySet::new().with("rows", Value::array([Value::from(1)]));
            let report = cached(&reconciler, &props, &mut el, &mut state);
            assert_eq!(report.markers_toggled, 1);
            seen.push(String::from(el.attribute("_rows").unwrap()));
        }
        assert_eq!(seen, ["true", "false", "true", "false"]);
    }

    #[test]
    fn unchanged_structured_value_keeps_marker() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-table");
        let mut state = ReconcileState::default();
        let rows = Value::array([Value::from(1)]);
        let props = PropertySet::new().with("rows", rows);

        cached(&reconciler, &props, &mut el, &mut state);
        cached(&reconciler, &props, &mut el, &mut state);
        assert_eq!(el.attribute("_rows"), Some("true"));
    }

    #[test]
    fn markers_respect_config() {
        let reconciler = Reconciler::new(WrapperConfig::default().marker_attributes(false));
        let mut el = MemoryElement::new("x-table");
        let mut state = ReconcileState::default();
        let report = cached(
            &reconciler,
            &PropertySet::new().with("rows", Value::array([])),
            &mut el,
            &mut state,
        );
        assert_eq!(report.markers_toggled, 0);
        assert_eq!(report.data_stored, 1);
        assert_eq!(el.attributes().count(), 0);

        let reconciler = Reconciler::new(WrapperConfig::default().marker_prefix("data-dirty-"));
        cached(
            &reconciler,
            &PropertySet::new().with("rows", Value::array([])),
            &mut el,
            &mut ReconcileState::default(),
        );
        assert_eq!(el.attribute("data-dirty-rows"), Some("true"));
    }

    #[test]
    fn one_listener_after_repeated_cycles() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();

        for round in 0..5 {
            if round > 0 {
                reconciler.cleanup(&mut el, &mut state).unwrap();
                assert_eq!(el.listener_count("select"), 0);
            }
            let props = PropertySet::new().with("select", Value::callback(|_| {}));
            cached(&reconciler, &props, &mut el, &mut state);
            assert_eq!(el.listener_count("select"), 1);
        }
    }

    #[test]
    fn unchanged_callback_is_reattached_after_cleanup() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();
        let handler = Value::callback(|_| {});
        let props = PropertySet::new().with("select", handler.clone());

        cached(&reconciler, &props, &mut el, &mut state);
        assert_eq!(reconciler.cleanup(&mut el, &mut state).unwrap(), 1);
        assert!(!state.listeners().is_attached("select"));
        assert_eq!(state.listeners().len(), 1, "cleanup keeps registry keys");

        let report = cached(&reconciler, &props, &mut el, &mut state);
        assert_eq!(report.listeners_attached, 1);
        assert!(el.has_listener("select", handler.as_callback().unwrap()));
    }

    #[test]
    fn replacing_callback_without_cleanup_fires_once() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();
        let old_hits = Rc::new(Cell::new(0));
        let new_hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&old_hits);
        cached(
            &reconciler,
            &PropertySet::new().with("select", Value::callback(move |_| h.set(h.get() + 1))),
            &mut el,
            &mut state,
        );
        let h = Rc::clone(&new_hits);
        let report = cached(
            &reconciler,
            &PropertySet::new().with("select", Value::callback(move |_| h.set(h.get() + 1))),
            &mut el,
            &mut state,
        );
        assert_eq!(report.listeners_detached, 1);
        assert_eq!(report.listeners_attached, 1);

        assert_eq!(el.dispatch("select", Value::Null), 1);
        assert_eq!(old_hits.get(), 0);
        assert_eq!(new_hits.get(), 1);
    }

    #[test]
    fn kind_change_is_reclassified() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();

        cached(
            &reconciler,
            &PropertySet::new().with("value", Value::callback(|_| {})),
            &mut el,
            &mut state,
        );
        assert_eq!(el.listener_count("value"), 1);

        let report = cached(
            &reconciler,
            &PropertySet::new().with("value", 42),
            &mut el,
            &mut state,
        );
        assert_eq!(report.listeners_detached, 1);
        assert_eq!(el.listener_count("value"), 0);
        assert_eq!(el.attribute("value"), Some("42"));
        assert!(state.listeners().get("value").is_none());

        cached(
            &reconciler,
            &PropertySet::new().with("value", Value::object([("n", Value::from(42))])),
            &mut el,
            &mut state,
        );
        assert!(el.data().is_some_and(|bag| bag.contains_key("value")));
        assert_eq!(el.attribute("_value"), Some("true"));
    }

    #[test]
    fn uncached_pass_applies_everything() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();
        let props = PropertySet::new().with("label", "a");

        for _ in 0..3 {
            let report = reconciler
                .reconcile(&props, &mut el, &mut state, PassMode::Uncached)
                .unwrap();
            assert_eq!(report.attributes_set, 1);
            assert_eq!(report.skipped, 0);
        }
        assert!(state.cache().is_empty());
    }

    #[test]
    fn children_are_never_reconciled() {
        let reconciler = Reconciler::default();
        let mut el = MemoryElement::new("x-a");
        let mut state = ReconcileState::default();
        let props = PropertySet::new()
            .with(CHILDREN_PROPERTY, Value::array([Value::from("text")]))
            .with("title", "t");

        let report = cached(&reconciler, &props, &mut el, &mut state);
        assert_eq!(report.properties, 1);
        assert!(el.data().is_none());
        assert_eq!(el.attribute("_children"), None);

        let initial = reconciler.reconcile_detached(
            &PropertySet::new().with(CHILDREN_PROPERTY, "text"),
        );
        assert!(initial.is_empty());
    }

    #[test]
    fn detached_pass_buffers_scalars_only() {
        let reconciler = Reconciler::default();
        let props = PropertySet::new()
            .with("click", Value::callback(|_| {}))
            .with("label", "Save")
            .with("disabled", false)
            .with("meta", Value::object([("id", Value::from(7))]));

        let initial = reconciler.reconcile_detached(&props);
        let names: alloc::vec::Vec<_> = initial.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["disabled", "label"]);
        let rendered: alloc::vec::Vec<_> = initial
            .rendered()
            .map(|(n, t)| (n.to_string(), t.into_owned()))
            .collect();
        assert_eq!(
            rendered,
            [
                ("disabled".to_string(), "false".to_string()),
                ("label".to_string(), "Save".to_string())
            ]
        );
    }

    #[test]
    fn seeded_cache_skips_initial_attributes() {
        let reconciler = Reconciler::default();
        let props = PropertySet::new().with("label", "Save").with("size", 2);
        let initial = reconciler.reconcile_detached(&props);

        let mut el = MemoryElement::with_initial_attributes("x-a", &initial);
        let mut state = ReconcileState::default();
        assert_eq!(state.seed_initial_attributes(&initial, &el), 2);

        let report = cached(&reconciler, &props.clone().with("size", 3), &mut el, &mut state);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            el.journal(),
            [DomOp::SetAttribute {
                name: "size".to_string(),
                value: "3".to_string(),
            }]
        );
    }

    #[test]
    fn seeding_skips_attributes_the_element_lacks() {
        let reconciler = Reconciler::default();
        let stale = reconciler.reconcile_detached(&PropertySet::new().with("label", "a"));
        let props = PropertySet::new().with("label", "b").with("size", 2);
        let current = reconciler.reconcile_detached(&props);

        // Created from the older buffer.
        let mut el = MemoryElement::with_initial_attributes("x-a", &stale);
        let mut state = ReconcileState::default();
        assert_eq!(state.seed_initial_attributes(&current, &el), 0);
        assert!(state.cache().is_empty());

        let report = cached(&reconciler, &props, &mut el, &mut state);
        assert_eq!(report.attributes_set, 2);
        assert_eq!(el.attribute("label"), Some("b"));
        assert_eq!(el.attribute("size"), Some("2"));
    }

    /// An element whose attribute writes always fail.
    struct ReadOnlyElement;

    impl ElementTarget for ReadOnlyElement {
        type Error = &'static str;

        fn set_attribute(&mut self, _: &str, _: &str) -> Result<(), Self::Error> {
            Err("read-only")
        }

        fn get_attribute(&self, _: &str) -> Option<String> {
            None
        }

        fn add_event_listener(&mut self, _: &str, _: &Callback) -> Result<(), Self::Error> {
            Ok(())
        }

        fn remove_event_listener(&mut self, _: &str, _: &Callback) -> Result<(), Self::Error> {
            Ok(())
        }

        fn store_data(&mut self, _: &str, _: Value) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn platform_errors_pass_through() {
        let reconciler = Reconciler::default();
        let mut state = ReconcileState::default();
        let result = reconciler.reconcile(
            &PropertySet::new().with("label", "x"),
            &mut ReadOnlyElement,
            &mut state,
            PassMode::Cached,
        );
        assert_eq!(result, Err("read-only"));

        // Structured values fail on the marker write.
        let result = reconciler.reconcile(
            &PropertySet::new().with("rows", Value::array([])),
            &mut ReadOnlyElement,
            &mut state,
            PassMode::Uncached,
        );
        assert_eq!(result, Err("read-only"));
    }

    #[test]
    fn failed_write_is_not_retried_until_value_changes() {
        let reconciler = Reconciler::default();
        let mut state = ReconcileState::default();
        let props = PropertySet::new().with("label", "x");
        let pass = |props: &PropertySet, state: &mut ReconcileState, mode| {
            reconciler.reconcile(props, &mut ReadOnlyElement, state, mode)
        };

        assert_eq!(pass(&props, &mut state, PassMode::Cached), Err("read-only"));
        let report = pass(&props, &mut state, PassMode::Cached).unwrap();
        assert_eq!(report.skipped, 1);

        let changed = PropertySet::new().with("label", "y");
        assert_eq!(pass(&changed, &mut state, PassMode::Cached), Err("read-only"));
        assert_eq!(pass(&props, &mut state, PassMode::Uncached), Err("read-only"));
    }
}
