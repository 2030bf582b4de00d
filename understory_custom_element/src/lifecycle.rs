// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrapper instance lifecycle: construct → mount → update* → unmount.
//!
//! The host framework owns scheduling. It is expected to:
//!
//! 1. Create the wrapper with the first render's props
//!    ([`CustomElement::instantiate`](crate::CustomElement::instantiate)) and
//!    create the element from [`CustomElementWrapper::blueprint`].
//! 2. Once the element is resolved, call [`CustomElementWrapper::mount`] from
//!    the effect queue selected by [`CustomElementWrapper::timing`].
//! 3. Call [`CustomElementWrapper::update`] from the same queue after every
//!    subsequent render.
//! 4. Call [`CustomElementWrapper::unmount`] before discarding the element.
//!
//! Listeners from one pass are always detached before the next pass runs, so
//! each update sees a clean slate for callbacks. Attribute and data writes are
//! still skipped for unchanged values.

use core::fmt;

use crate::config::EffectTiming;
use crate::definition::TagName;
use crate::props::{PropertySet, Props};
use crate::reconcile::{InitialAttributes, PassMode, PassReport, ReconcileState, Reconciler};
use crate::target::ElementTarget;

/// Where a wrapper instance is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Created; no element yet. Scalars are buffered as initial attributes.
    Constructed,
    /// An element is attached and receives every update.
    Mounted,
    /// Torn down. Terminal.
    Unmounted,
}

/// Error from a lifecycle operation.
#[derive(Clone, PartialEq, Eq)]
pub enum LifecycleError<E> {
    /// `mount` was called on an instance that already has an element.
    AlreadyMounted,
    /// The instance has been unmounted.
    Unmounted,
    /// The element rejected a write.
    Target(E),
}

impl<E: fmt::Debug> fmt::Debug for LifecycleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyMounted => f.write_str("AlreadyMounted"),
            Self::Unmounted => f.write_str("Unmounted"),
            Self::Target(err) => f.debug_tuple("Target").field(err).finish(),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for LifecycleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyMounted => f.write_str("custom element is already mounted"),
            Self::Unmounted => f.write_str("custom element has been unmounted"),
            Self::Target(err) => write!(f, "element write failed: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for LifecycleError<E> {}

/// What the host needs to create the element.
#[derive(Debug)]
pub struct Blueprint<'a, C> {
    /// Custom element tag name.
    pub tag: &'a TagName,
    /// Scalars to create the element with.
    pub attributes: &'a InitialAttributes,
    /// Child content, as passed in [`Props`].
    pub children: &'a C,
}

/// One live instance of a wrapped custom element.
///
/// `T` is the element handle and `C` the host's child content.
#[derive(Debug)]
pub struct CustomElementWrapper<T, C = ()> {
    tag: TagName,
    reconciler: Reconciler,
    phase: LifecyclePhase,
    properties: PropertySet,
    children: C,
    initial: InitialAttributes,
    target: Option<T>,
    state: ReconcileState,
}

impl<T, C> CustomElementWrapper<T, C> {
    pub(crate) fn new(tag: TagName, reconciler: Reconciler, props: Props<C>) -> Self {
        let initial = reconciler.reconcile_detached(&props.properties);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "custom_element.construct",
            tag = %tag,
            initial_attributes = initial.len(),
        );
        Self {
            tag,
            reconciler,
            phase: LifecyclePhase::Constructed,
            properties: props.properties,
            children: props.children,
            initial,
            target: None,
            state: ReconcileState::default(),
        }
    }

    /// The current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Which effect queue the host should run [`mount`](Self::mount) and
    /// [`update`](Self::update) from.
    #[must_use]
    pub fn timing(&self) -> EffectTiming {
        self.reconciler.config().effect_timing()
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> &TagName {
        &self.tag
    }

    /// What to create the element with.
    ///
    /// Once mounted the attribute buffer is discarded and `attributes` is
    /// empty; the element already carries them.
    #[must_use]
    pub fn blueprint(&self) -> Blueprint<'_, C> {
        Blueprint {
            tag: &self.tag,
            attributes: &self.initial,
            children: &self.children,
        }
    }

    /// The most recently rendered properties.
    #[must_use]
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// The most recently rendered children.
    #[must_use]
    pub fn children(&self) -> &C {
        &self.children
    }

    /// The mounted element, if any.
    #[must_use]
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Cache and listener registry for this instance.
    #[must_use]
    pub fn state(&self) -> &ReconcileState {
        &self.state
    }
}

impl<T: ElementTarget, C> CustomElementWrapper<T, C> {
    /// Attaches the live element and runs the first cached pass.
    ///
    /// Buffered initial attributes the element already carries seed the
    /// cache, so they are not written again. Attributes that differ, for
    /// instance because props changed after the element was created, are
    /// written by this pass.
    pub fn mount(&mut self, target: T) -> Result<PassReport, LifecycleError<T::Error>> {
        match self.phase {
            LifecyclePhase::Constructed => {}
            LifecyclePhase::Mounted => return Err(LifecycleError::AlreadyMounted),
            LifecyclePhase::Unmounted => return Err(LifecycleError::Unmounted),
        }
        let _seeded = self.state.seed_initial_attributes(&self.initial, &target);
        self.initial = InitialAttributes::default();
        self.phase = LifecyclePhase::Mounted;
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "custom_element.mount", tag = %self.tag, seeded = _seeded);

        let target = self.target.insert(target);
        self.reconciler
            .reconcile(&self.properties, target, &mut self.state, PassMode::Cached)
            .map_err(LifecycleError::Target)
    }

    /// Applies a new render's props.
    ///
    /// When mounted, the previous pass's listeners are detached first and a
    /// cached pass follows; its report is returned. Before mount, the initial
    /// attribute buffer is rebuilt instead and `None` is returned.
    pub fn update(
        &mut self,
        props: Props<C>,
    ) -> Result<Option<PassReport>, LifecycleError<T::Error>> {
        if self.phase == LifecyclePhase::Unmounted {
            return Err(LifecycleError::Unmounted);
        }
        self.properties = props.properties;
        self.children = props.children;

        let Some(target) = self.target.as_mut() else {
            self.initial = self.reconciler.reconcile_detached(&self.properties);
            return Ok(None);
        };
        self.reconciler
            .cleanup(target, &mut self.state)
            .map_err(LifecycleError::Target)?;
        self.reconciler
            .reconcile(&self.properties, target, &mut self.state, PassMode::Cached)
            .map(Some)
            .map_err(LifecycleError::Target)
    }

    /// Detaches all listeners and tears the instance down, returning the
    /// element if one was mounted.
    ///
    /// If detaching fails the instance stays mounted so the host can retry.
    pub fn unmount(&mut self) -> Result<Option<T>, LifecycleError<T::Error>> {
        if self.phase == LifecyclePhase::Unmounted {
            return Err(LifecycleError::Unmounted);
        }
        if let Some(target) = self.target.as_mut() {
            self.reconciler
                .cleanup(target, &mut self.state)
                .map_err(LifecycleError::Target)?;
        }
        self.phase = LifecyclePhase::Unmounted;
        self.state = ReconcileState::default();
        self.initial = InitialAttributes::default();
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "custom_element.unmount", tag = %self.tag);
        Ok(self.target.take())
    }
}
