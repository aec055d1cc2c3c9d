//! Generic bodies of the exported entry points.
//!
//! [`define_plugin_application!`](crate::define_plugin_application) only
//! emits thin `#[no_mangle]` shims; the actual work lives here so every
//! plugin shares one implementation. The opaque state handed to the host is a
//! boxed [`ApplicationState`], created and freed exclusively on the plugin's
//! side of the boundary.
//!
//! Every call is wrapped in `catch_unwind`: a panic must never unwind into
//! the host. A panic while creating yields a null state, which the host
//! treats as a failed load. Panics in the other hooks are written to the
//! plugin log and swallowed.

use crate::abi::{read_c_string, HostContext};
use crate::application::{PluginApplication, PluginContext};
use crate::log::PluginLog;
use crate::VariantMap;
use std::any::Any;
use std::ffi::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use tracing::error;

/// Everything a plugin keeps alive between create and destroy.
struct ApplicationState<T> {
    application: T,
    log: PluginLog,
}

/// Body of `CreatePluginApplication`.
///
/// # Safety
///
/// `host` must be null or a valid [`HostContext`].
pub unsafe fn create_application<T: PluginApplication>(
    plugin_name: &str,
    host: *const HostContext,
) -> *mut c_void {
    let context = PluginContext::from_host(plugin_name, host);
    let log = PluginLog::open(&context);

    let created = log.in_scope(|| catch_unwind(AssertUnwindSafe(|| T::create(&context))));
    match created {
        Ok(application) => {
            let state = Box::new(ApplicationState { application, log });
            Box::into_raw(state).cast()
        }
        Err(payload) => {
            log.in_scope(|| {
                error!(
                    "Creating plugin application \"{}\" panicked: {}",
                    plugin_name,
                    panic_message(payload.as_ref())
                )
            });
            ptr::null_mut()
        }
    }
}

/// Body of `DestroyPluginApplication`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_application`] for
/// the same `T` that has not been destroyed yet.
pub unsafe fn destroy_application<T: PluginApplication>(
    _host: *const HostContext,
    state: *mut c_void,
) {
    if state.is_null() {
        return;
    }

    let state = Box::from_raw(state.cast::<ApplicationState<T>>());
    let ApplicationState { application, log } = *state;
    log.in_scope(|| {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || drop(application))) {
            error!(
                "Destroying plugin application panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    });
}

/// Body of `Setup`. A null parameter map is replaced by a scratch map.
///
/// # Safety
///
/// `state` as for [`destroy_application`]; `parameters` must be null or valid.
pub unsafe fn setup<T: PluginApplication>(state: *mut c_void, parameters: *mut VariantMap) {
    with_application::<T>(state, "Setup", |application| match parameters.as_mut() {
        Some(parameters) => application.setup(parameters),
        None => application.setup(&mut VariantMap::new()),
    });
}

/// Body of `Start`.
///
/// # Safety
///
/// `state` as for [`destroy_application`].
pub unsafe fn start<T: PluginApplication>(state: *mut c_void) {
    with_application::<T>(state, "Start", |application| application.start());
}

/// Body of `Stop`.
///
/// # Safety
///
/// `state` as for [`destroy_application`].
pub unsafe fn stop<T: PluginApplication>(state: *mut c_void) {
    with_application::<T>(state, "Stop", |application| application.stop());
}

/// Body of `OnScriptBinding`.
///
/// # Safety
///
/// `state` as for [`destroy_application`]; `script_type_name` must be null or
/// NUL-terminated.
pub unsafe fn on_script_binding<T: PluginApplication>(
    state: *mut c_void,
    script_type_name: *const c_char,
    script_context: *mut c_void,
) {
    let script_type_name = read_c_string(script_type_name).unwrap_or_default();
    with_application::<T>(state, "OnScriptBinding", |application| {
        application.on_script_binding(&script_type_name, script_context)
    });
}

unsafe fn with_application<T: PluginApplication>(
    state: *mut c_void,
    hook: &str,
    f: impl FnOnce(&mut T),
) {
    let Some(state) = state.cast::<ApplicationState<T>>().as_mut() else {
        return;
    };

    let ApplicationState { application, log } = state;
    log.in_scope(|| {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(application))) {
            error!("{} panicked: {}", hook, panic_message(payload.as_ref()));
        }
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
