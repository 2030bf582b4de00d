// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checks the `tracing` events emitted across a wrapper's lifecycle.

#![cfg(feature = "tracing")]

use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use understory_custom_element::{
    CustomElement, CustomElementWrapper, MemoryElement, PropertySet, Props, Value, WrapperConfig,
};

/// Messages seen, with the `detached` count of cleanup events.
#[derive(Default)]
struct Captured {
    messages: Vec<String>,
    detached: Vec<u64>,
}

struct CaptureLayer {
    captured: Arc<Mutex<Captured>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct Fields {
            message: Option<String>,
            detached: Option<u64>,
        }
        impl tracing::field::Visit for Fields {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
                if field.name() == "detached" {
                    self.detached = Some(value);
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut fields = Fields::default();
        event.record(&mut fields);
        // Per-property trace events carry free-form messages.
        let Some(message) = fields
            .message
            .filter(|m| m.starts_with("custom_element."))
        else {
            return;
        };
        let mut captured = self.captured.lock().expect("capture lock");
        if message == "custom_element.cleanup" {
            captured.detached.push(fields.detached.unwrap_or_default());
        }
        captured.messages.push(message);
    }
}

#[test]
fn lifecycle_emits_pass_and_cleanup_events() {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        captured: Arc::clone(&captured),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let definition = CustomElement::new("x-button", WrapperConfig::default()).unwrap();
    let props = PropertySet::new()
        .with("click", Value::callback(|_| {}))
        .with("label", "Save");
    let mut wrapper: CustomElementWrapper<MemoryElement> =
        definition.instantiate(Props::new(props.clone()));
    let blueprint = wrapper.blueprint();
    let element =
        MemoryElement::with_initial_attributes(blueprint.tag.as_str(), blueprint.attributes);

    wrapper.mount(element).unwrap();
    wrapper.update(Props::new(props)).unwrap();
    wrapper.unmount().unwrap();

    let captured = captured.lock().expect("capture lock");
    let messages: Vec<&str> = captured.messages.iter().map(String::as_str).collect();
    assert_eq!(
        messages,
        [
            "custom_element.pass",
            "custom_element.construct",
            "custom_element.mount",
            "custom_element.pass",
            "custom_element.cleanup",
            "custom_element.pass",
            "custom_element.cleanup",
            "custom_element.unmount",
        ]
    );
    assert_eq!(captured.detached, [1, 1]);
}
