//! Logger plugin: records every lifecycle call it receives.
//!
//! Useful as a smoke test for a host. It accepts any OS and graphics API, so
//! only the engine and compiler axes can reject it.

use plugin_api::{
    define_plugin_application, PluginApplication, PluginContext, VariantMap, COMPILER_ID,
    COMPILER_VERSION, ENGINE_VERSION,
};
use std::ffi::c_void;
use std::time::Instant;
use tracing::{debug, info};

/// Lifecycle hooks seen so far, in call order.
pub struct LoggerPlugin {
    name: String,
    created_at: Instant,
    calls: Vec<&'static str>,
}

impl LoggerPlugin {
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    fn record(&mut self, hook: &'static str) {
        self.calls.push(hook);
        debug!("📝 {}: {} call(s) recorded", self.name, self.calls.len());
    }
}

impl PluginApplication for LoggerPlugin {
    fn create(context: &PluginContext) -> Self {
        info!(
            "📝 {}: created (log level {}, graphics API {})",
            context.plugin_name(),
            context.log_level(),
            context.graphics_api().unwrap_or("unknown")
        );
        Self {
            name: context.plugin_name().to_string(),
            created_at: Instant::now(),
            calls: vec!["create"],
        }
    }

    fn setup(&mut self, parameters: &mut VariantMap) {
        info!(
            "📝 {}: setup with {} engine parameter(s) already requested",
            self.name,
            parameters.len()
        );
        self.record("setup");
    }

    fn start(&mut self) {
        info!("📝 {}: start", self.name);
        self.record("start");
    }

    fn stop(&mut self) {
        info!(
            "📝 {}: stop after {:.1}s",
            self.name,
            self.created_at.elapsed().as_secs_f64()
        );
        self.record("stop");
    }

    fn on_script_binding(&mut self, script_type_name: &str, script_context: *mut c_void) {
        info!(
            "📝 {}: script binding for {} (context {:p})",
            self.name, script_type_name, script_context
        );
        self.record("on_script_binding");
    }
}

impl Drop for LoggerPlugin {
    fn drop(&mut self) {
        info!(
            "📝 {}: destroyed after {} lifecycle call(s)",
            self.name,
            self.calls.len()
        );
    }
}

define_plugin_application!(LoggerPlugin,
    engine_version: [ENGINE_VERSION],
    compiler_id: [COMPILER_ID],
    compiler_version: [COMPILER_VERSION],
    os_version: [],
    graphics_api: [],
);
