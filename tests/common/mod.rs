//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

use aop_weaver::{Advice, AdviceKind, Value};
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness; filter with `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Records markers in the order advice and operations run
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, marker: impl Into<String>) {
        self.events.lock().push(marker.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Advice of `kind` that only records `marker`
    pub fn advice(&self, kind: AdviceKind, marker: &str) -> Advice {
        let recorder = self.clone();
        let marker = marker.to_string();
        Advice::new(kind, move |_| {
            recorder.record(marker.clone());
            Ok(Value::Null)
        })
    }
}
