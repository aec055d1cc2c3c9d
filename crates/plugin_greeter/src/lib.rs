//! Greeter plugin.
//!
//! During setup it asks the host to title the window "Hello World", and it
//! greets once started. It only runs on the graphics APIs it lists.

use plugin_api::{
    define_plugin_application, PluginApplication, PluginContext, VariantMap, COMPILER_ID,
    COMPILER_VERSION, ENGINE_VERSION,
};
use std::ffi::c_void;
use tracing::{info, warn};

pub const GREETING: &str = "Hello World";

/// Engine parameter the greeting is written to.
pub const WINDOW_TITLE: &str = "WindowTitle";

pub struct GreeterPlugin {
    name: String,
    graphics_api: String,
    greeted: bool,
}

impl GreeterPlugin {
    pub fn greeting(&self) -> String {
        format!("{GREETING} from {}!", self.name)
    }

    pub fn has_greeted(&self) -> bool {
        self.greeted
    }
}

impl PluginApplication for GreeterPlugin {
    fn create(context: &PluginContext) -> Self {
        Self {
            name: context.plugin_name().to_string(),
            graphics_api: context.graphics_api().unwrap_or("unknown").to_string(),
            greeted: false,
        }
    }

    fn setup(&mut self, parameters: &mut VariantMap) {
        if let Some(previous) = parameters.get(WINDOW_TITLE) {
            warn!("👋 Replacing window title {} requested by another plugin", previous);
        }
        parameters.insert(WINDOW_TITLE.into(), GREETING.into());
    }

    fn start(&mut self) {
        info!("👋 {} ({})", self.greeting(), self.graphics_api);
        self.greeted = true;
    }

    fn stop(&mut self) {
        if self.greeted {
            info!("👋 Goodbye from {}!", self.name);
        }
    }

    fn on_script_binding(&mut self, script_type_name: &str, _script_context: *mut c_void) {
        info!("👋 {} says hello to {}", self.name, script_type_name);
    }
}

define_plugin_application!(GreeterPlugin,
    engine_version: [ENGINE_VERSION],
    compiler_id: [COMPILER_ID],
    compiler_version: [COMPILER_VERSION],
    os_version: [],
    graphics_api: ["OpenGL", "D3D11", "Vulkan"],
);
