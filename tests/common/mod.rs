//! Shared test doubles
//!
//! Mock notifier and launcher that record every call for verification.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use speechlauncher::dispatch::Dispatcher;
use speechlauncher::launcher::{LaunchRequest, ProcessLauncher};
use speechlauncher::notify::Notifier;
use speechlauncher::pipeline::Pipeline;
use speechlauncher::{Config, LauncherError, LauncherResult};

/// Mock notifier that records (title, body) pairs
#[derive(Debug, Default)]
pub struct MockNotifier {
    pub shown: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    pub fn get_shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock launcher that records requests instead of spawning processes
#[derive(Debug, Default)]
pub struct MockLauncher {
    pub launched: Mutex<Vec<LaunchRequest>>,
    /// Simulate failure on every launch
    pub should_fail: Mutex<bool>,
}

impl MockLauncher {
    pub fn get_launched(&self) -> Vec<LaunchRequest> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessLauncher for MockLauncher {
    fn launch(&self, request: &LaunchRequest) -> LauncherResult<()> {
        self.launched.lock().unwrap().push(request.clone());
        if *self.should_fail.lock().unwrap() {
            return Err(LauncherError::Launch {
                command: request.command.clone(),
                reason: "Mock launch failure".to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub struct TestContext {
    pub pipeline: Pipeline,
    pub notifier: Arc<MockNotifier>,
    pub launcher: Arc<MockLauncher>,
}

impl TestContext {
    pub fn new(config: Config) -> Self {
        let notifier = Arc::new(MockNotifier::default());
        let launcher = Arc::new(MockLauncher::default());
        let dispatcher = Dispatcher::new(notifier.clone(), launcher.clone());
        Self {
            pipeline: Pipeline::new(Arc::new(config), dispatcher),
            notifier,
            launcher,
        }
    }

    pub fn sample() -> Self {
        Self::new(Config::sample())
    }
}
