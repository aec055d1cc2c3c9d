//! Script-facing view of the registry.
//!
//! Script engines see a single `PluginManager` object with the members listed
//! in [`SCRIPT_DECLARATIONS`]. [`ScriptPluginApi`] implements those members on
//! top of a registry shared with the host, and its address is what plugins
//! receive as the script context in `OnScriptBinding`.

use crate::error::ScriptCallError;
use crate::library::{LibraryOpener, NativeOpener};
use crate::registry::PluginRegistry;
use serde_json::Value;
use std::cell::RefCell;
use std::ffi::c_void;
use std::path::Path;
use std::rc::Rc;
use tracing::error;

/// Registry shared between the host and its script bridge.
pub type SharedRegistry<O = NativeOpener> = Rc<RefCell<PluginRegistry<O>>>;

/// Name of the script object type.
pub const SCRIPT_OBJECT_TYPE: &str = "PluginManager";

/// Declarations a script engine registers for [`SCRIPT_OBJECT_TYPE`].
pub const SCRIPT_DECLARATIONS: [&str; 6] = [
    "PluginManager@+ get_pluginManager()",
    "bool Load(const String&in, bool forceToStart = true)",
    "void Unload(const String&in, bool forceToStop = true)",
    "void UnloadAll()",
    "bool isLoaded(const String&in) const",
    "bool get_empty() const",
];

/// Script type name used for a script file.
pub fn script_type_for(script_file: &Path) -> &'static str {
    match script_file
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("lua") | Some("luc") => "Lua",
        _ => "AngelScript",
    }
}

/// Script-callable plugin management.
///
/// Script calls usually happen while plugins run, and a plugin may call back
/// from inside a registry broadcast. Such nested calls find the registry
/// borrowed and are refused with an error log instead of panicking.
pub struct ScriptPluginApi<O: LibraryOpener = NativeOpener> {
    registry: SharedRegistry<O>,
}

impl<O: LibraryOpener> ScriptPluginApi<O> {
    pub fn new(registry: SharedRegistry<O>) -> Self {
        Self { registry }
    }

    /// `Load(name, forceToStart = true)`.
    pub fn load(&self, name: &str, force_to_start: Option<bool>) -> bool {
        let Ok(mut registry) = self.registry.try_borrow_mut() else {
            error!("PluginManager.Load({}) called while the registry is busy", name);
            return false;
        };
        registry.load(name, force_to_start.unwrap_or(true))
    }

    /// `Unload(name, forceToStop = true)`.
    pub fn unload(&self, name: &str, force_to_stop: Option<bool>) {
        let Ok(mut registry) = self.registry.try_borrow_mut() else {
            error!("PluginManager.Unload({}) called while the registry is busy", name);
            return;
        };
        registry.unload(name, force_to_stop.unwrap_or(true));
    }

    pub fn unload_all(&self) {
        let Ok(mut registry) = self.registry.try_borrow_mut() else {
            error!("PluginManager.UnloadAll() called while the registry is busy");
            return;
        };
        registry.unload_all();
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.registry
            .try_borrow()
            .map(|registry| registry.is_loaded(name))
            .unwrap_or(false)
    }

    pub fn empty(&self) -> bool {
        self.registry
            .try_borrow()
            .map(|registry| registry.is_empty())
            .unwrap_or(true)
    }

    pub fn declarations(&self) -> &'static [&'static str] {
        &SCRIPT_DECLARATIONS
    }

    /// Dispatches a call by script member name.
    pub fn invoke(&self, member: &str, args: &[Value]) -> Result<Value, ScriptCallError> {
        match member {
            "Load" => {
                let name = string_arg(member, args, 0)?;
                let force = optional_bool_arg(member, args, 1)?;
                Ok(Value::Bool(self.load(name, force)))
            }
            "Unload" => {
                let name = string_arg(member, args, 0)?;
                let force = optional_bool_arg(member, args, 1)?;
                self.unload(name, force);
                Ok(Value::Null)
            }
            "UnloadAll" => {
                self.unload_all();
                Ok(Value::Null)
            }
            "isLoaded" => {
                let name = string_arg(member, args, 0)?;
                Ok(Value::Bool(self.is_loaded(name)))
            }
            "empty" | "get_empty" => Ok(Value::Bool(self.empty())),
            other => Err(ScriptCallError::UnknownMember(other.to_string())),
        }
    }

    /// Address handed to plugins as the script context.
    pub fn as_script_context(&self) -> *mut c_void {
        self as *const Self as *mut c_void
    }

    /// Recovers the bridge from a script context pointer.
    ///
    /// # Safety
    ///
    /// `context` must be null or come from [`Self::as_script_context`] on a
    /// bridge of the same type that is still alive.
    pub unsafe fn from_script_context<'a>(context: *mut c_void) -> Option<&'a Self> {
        context.cast::<Self>().cast_const().as_ref()
    }
}

fn string_arg<'a>(
    member: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, ScriptCallError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| ScriptCallError::BadArgument {
            member: member.to_string(),
            index,
            expected: "a string",
        })
}

fn optional_bool_arg(
    member: &str,
    args: &[Value],
    index: usize,
) -> Result<Option<bool>, ScriptCallError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(ScriptCallError::BadArgument {
            member: member.to_string(),
            index,
            expected: "a bool",
        }),
    }
}
