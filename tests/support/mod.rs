//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use datatool::testkit::{config, FakeHost};
use datatool::{DataTool, Settings};

/// Poll `condition` every few milliseconds until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// In-memory SQLite settings whose sampler fires once per test.
pub fn quiet_settings() -> Settings {
    config::settings(Duration::from_secs(3600))
}

/// Start a plugin with a fake host reporting `live` players.
pub fn start(settings: &Settings, live: usize) -> (DataTool, Arc<FakeHost>) {
    let host = Arc::new(FakeHost::with_live(live));
    let tool = DataTool::enable(settings, host.clone()).expect("plugin starts");
    (tool, host)
}
