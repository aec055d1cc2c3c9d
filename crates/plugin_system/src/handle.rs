//! A loaded plugin: its library, resolved entry points and live application.

use crate::compatibility::CompatibilityDescriptor;
use plugin_api::{
    CompatibilityFn, CreateApplicationFn, DestroyApplicationFn, HostContext, ScriptBindingFn,
    SetupFn, StartFn, StopFn, VariantMap,
};
use std::ffi::{c_void, CString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

/// Entry points of one plugin, resolved once at load time.
#[derive(Clone, Copy)]
pub struct PluginObject {
    pub get_engine_version: CompatibilityFn,
    pub get_compiler_id: CompatibilityFn,
    pub get_compiler_version: CompatibilityFn,
    pub get_os_version: CompatibilityFn,
    pub get_graphics_api: CompatibilityFn,
    pub create_application: CreateApplicationFn,
    pub destroy_application: DestroyApplicationFn,
    pub setup: SetupFn,
    pub start: StartFn,
    pub stop: StopFn,
    pub on_script_binding: ScriptBindingFn,
}

/// A plugin whose library is open and whose application object is live.
///
/// The application is destroyed through the plugin's own destroy entry point,
/// either by [`LoadedPlugin::destroy`] or on drop, and the library is released
/// afterwards.
pub struct LoadedPlugin<L> {
    name: String,
    path: PathBuf,
    compatibility: CompatibilityDescriptor,
    object: PluginObject,
    application: Option<NonNull<c_void>>,
    // Declared last so the code stays mapped until everything above is gone.
    library: L,
}

impl<L> LoadedPlugin<L> {
    pub(crate) fn new(
        name: String,
        path: PathBuf,
        compatibility: CompatibilityDescriptor,
        object: PluginObject,
        application: NonNull<c_void>,
        library: L,
    ) -> Self {
        Self {
            name,
            path,
            compatibility,
            object,
            application: Some(application),
            library,
        }
    }

    /// Canonical registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library file the plugin was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compatibility(&self) -> &CompatibilityDescriptor {
        &self.compatibility
    }

    pub fn setup(&self, parameters: &mut VariantMap) {
        if let Some(application) = self.application {
            unsafe { (self.object.setup)(application.as_ptr(), parameters) }
        }
    }

    pub fn start(&self) {
        if let Some(application) = self.application {
            unsafe { (self.object.start)(application.as_ptr()) }
        }
    }

    pub fn stop(&self) {
        if let Some(application) = self.application {
            unsafe { (self.object.stop)(application.as_ptr()) }
        }
    }

    pub fn on_script_binding(&self, script_type_name: &CString, script_context: *mut c_void) {
        if let Some(application) = self.application {
            unsafe {
                (self.object.on_script_binding)(
                    application.as_ptr(),
                    script_type_name.as_ptr(),
                    script_context,
                )
            }
        }
    }

    /// Destroys the application, then releases the library.
    pub fn destroy(mut self, host: *const HostContext) {
        self.destroy_application(host);
    }

    fn destroy_application(&mut self, host: *const HostContext) {
        if let Some(application) = self.application.take() {
            unsafe { (self.object.destroy_application)(host, application.as_ptr()) }
        }
    }
}

impl<L> Drop for LoadedPlugin<L> {
    fn drop(&mut self) {
        self.destroy_application(ptr::null());
    }
}

impl<L> fmt::Debug for LoadedPlugin<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("compatibility", &self.compatibility)
            .field("live", &self.application.is_some())
            .finish()
    }
}
