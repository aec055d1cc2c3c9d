//! Drives a plugin built with `define_plugin_application!` through the real
//! loader and registry. The exports live in this test binary, so the opener
//! hands out their addresses instead of opening a file.

use plugin_api::{
    define_plugin_application, symbols, CompatibilityFn, CreateApplicationFn,
    DestroyApplicationFn, PluginApplication, PluginContext, ScriptBindingFn, SetupFn, StartFn,
    StopFn, VariantMap, COMPILER_ID, COMPILER_VERSION, ENGINE_VERSION,
};
use plugin_system::{
    HostServices, LibraryOpener, PluginLibrary, PluginRegistry, PluginSystemError, RawSymbol,
    ScriptPluginApi,
};
use std::cell::RefCell;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

const PLUGIN_NAME: &str = "in_process_plugin";

static CREATED: AtomicUsize = AtomicUsize::new(0);
static STARTED: AtomicUsize = AtomicUsize::new(0);
static STOPPED: AtomicUsize = AtomicUsize::new(0);
static DROPPED: AtomicUsize = AtomicUsize::new(0);
static SAW_ITSELF_LOADED: AtomicBool = AtomicBool::new(false);

struct Overlay {
    graphics_api: String,
}

impl PluginApplication for Overlay {
    fn create(context: &PluginContext) -> Self {
        CREATED.fetch_add(1, Ordering::SeqCst);
        tracing::info!("overlay created for {}", context.plugin_name());
        Overlay {
            graphics_api: context.graphics_api().unwrap_or("none").to_string(),
        }
    }

    fn setup(&mut self, parameters: &mut VariantMap) {
        parameters.insert(
            "WindowTitle".into(),
            format!("Overlay on {}", self.graphics_api).into(),
        );
    }

    fn start(&mut self) {
        STARTED.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        STOPPED.fetch_add(1, Ordering::SeqCst);
    }

    fn on_script_binding(&mut self, script_type_name: &str, script_context: *mut c_void) {
        tracing::info!("bound to {}", script_type_name);
        let bridge =
            unsafe { ScriptPluginApi::<InProcessOpener>::from_script_context(script_context) };
        if let Some(bridge) = bridge {
            SAW_ITSELF_LOADED.store(bridge.is_loaded(PLUGIN_NAME), Ordering::SeqCst);
        }
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        DROPPED.fetch_add(1, Ordering::SeqCst);
    }
}

define_plugin_application!(Overlay,
    engine_version: [ENGINE_VERSION],
    compiler_id: [COMPILER_ID],
    compiler_version: [COMPILER_VERSION],
    os_version: [],
    graphics_api: ["OpenGL", "Vulkan"],
);

struct InProcessLibrary;

impl PluginLibrary for InProcessLibrary {
    fn symbol(&self, name: &str) -> Option<RawSymbol> {
        let raw = match name {
            symbols::GET_ENGINE_VERSION => GetUrhoCompatibleVersion as CompatibilityFn as RawSymbol,
            symbols::GET_COMPILER_ID => GetCompatibleCompilatorName as CompatibilityFn as RawSymbol,
            symbols::GET_COMPILER_VERSION => {
                GetCompatibleCompilatorVersion as CompatibilityFn as RawSymbol
            }
            symbols::GET_OS_VERSION => GetCompatibleOSVersion as CompatibilityFn as RawSymbol,
            symbols::GET_GRAPHICS_API => GetCompatibleGraphicAPI as CompatibilityFn as RawSymbol,
            symbols::CREATE_APPLICATION => {
                CreatePluginApplication as CreateApplicationFn as RawSymbol
            }
            symbols::DESTROY_APPLICATION => {
                DestroyPluginApplication as DestroyApplicationFn as RawSymbol
            }
            symbols::SETUP => Setup as SetupFn as RawSymbol,
            symbols::START => Start as StartFn as RawSymbol,
            symbols::STOP => Stop as StopFn as RawSymbol,
            symbols::ON_SCRIPT_BINDING => OnScriptBinding as ScriptBindingFn as RawSymbol,
            _ => return None,
        };
        Some(raw)
    }
}

struct InProcessOpener;

impl LibraryOpener for InProcessOpener {
    type Library = InProcessLibrary;

    fn open(&self, path: &Path) -> Result<InProcessLibrary, String> {
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(PLUGIN_NAME) => Ok(InProcessLibrary),
            _ => Err(format!("{}: no such file", path.display())),
        }
    }
}

struct TestHost {
    graphics_api: &'static str,
    log_directory: PathBuf,
}

impl HostServices for TestHost {
    fn os_version(&self) -> String {
        "TestOS 1".into()
    }

    fn graphics_api(&self) -> String {
        self.graphics_api.into()
    }

    fn quiet(&self) -> bool {
        true
    }

    fn log_directory(&self) -> PathBuf {
        self.log_directory.clone()
    }
}

#[test]
fn test_generated_exports_drive_full_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Rc::new(RefCell::new(PluginRegistry::with_opener(
        InProcessOpener,
        TestHost {
            graphics_api: "Vulkan",
            log_directory: temp_dir.path().to_path_buf(),
        },
    )));
    let bridge = ScriptPluginApi::new(Rc::clone(&registry));

    assert!(registry.borrow_mut().load("plugins/in_process_plugin", false));
    assert_eq!(CREATED.load(Ordering::SeqCst), 1);

    let declared = registry
        .borrow()
        .compatibility(PLUGIN_NAME)
        .cloned()
        .unwrap();
    assert_eq!(declared.engine_version, vec![ENGINE_VERSION]);
    assert_eq!(declared.graphics_api, vec!["OpenGL", "Vulkan"]);
    assert!(declared.os_version.is_empty());

    let mut parameters = VariantMap::new();
    registry.borrow().setup(&mut parameters);
    assert_eq!(
        parameters.get("WindowTitle").and_then(|v| v.as_str()),
        Some("Overlay on Vulkan")
    );

    registry.borrow().start();
    registry
        .borrow()
        .on_script_binding("AngelScript", bridge.as_script_context());
    assert!(SAW_ITSELF_LOADED.load(Ordering::SeqCst));

    // Loading again through the script bridge is a no-op
    assert!(bridge.load(PLUGIN_NAME, None));
    assert_eq!(CREATED.load(Ordering::SeqCst), 1);
    assert_eq!(STARTED.load(Ordering::SeqCst), 1);

    bridge.unload(PLUGIN_NAME, None);
    assert_eq!(STOPPED.load(Ordering::SeqCst), 1);
    assert_eq!(DROPPED.load(Ordering::SeqCst), 1);
    assert!(bridge.empty());

    let log = std::fs::read_to_string(temp_dir.path().join("in_process_plugin.log")).unwrap();
    assert!(log.contains("overlay created for in_process_plugin"));
    assert!(log.contains("bound to AngelScript"));
}

#[test]
fn test_generated_graphics_list_rejects_other_api() {
    let temp_dir = TempDir::new().unwrap();
    let mut registry = PluginRegistry::with_opener(
        InProcessOpener,
        TestHost {
            graphics_api: "D3D11",
            log_directory: temp_dir.path().to_path_buf(),
        },
    );

    match registry.try_load(PLUGIN_NAME, false) {
        Err(PluginSystemError::Incompatible {
            plugin_accessor,
            declared,
            ..
        }) => {
            assert_eq!(plugin_accessor, "GetCompatibleGraphicAPI");
            assert_eq!(declared, "OpenGL;Vulkan");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(registry.is_empty());
}
