//! In-memory plugin libraries for unit tests.
//!
//! Lifecycle entry points record every call in a thread-local event log, and
//! each registered library counts how often it was opened and released.

use crate::host::HostServices;
use crate::library::{library_candidates, LibraryOpener, PluginLibrary, RawSymbol};
use plugin_api::abi::read_c_string;
use plugin_api::{
    symbols, CompatibilityFn, CreateApplicationFn, DestroyApplicationFn, HostContext,
    ScriptBindingFn, SetupFn, StartFn, StopFn, VariantMap,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{c_char, c_void};
use std::path::{Path, PathBuf};
use std::ptr;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Create,
    Destroy,
    Setup,
    Start,
    Stop,
    ScriptBinding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub hook: Hook,
    pub instance: usize,
    pub detail: Option<String>,
}

thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
    static NEXT_INSTANCE: Cell<usize> = const { Cell::new(1) };
}

fn record(hook: Hook, instance: usize, detail: Option<String>) {
    EVENTS.with(|events| {
        events.borrow_mut().push(Event {
            hook,
            instance,
            detail,
        })
    });
}

pub fn take_events() -> Vec<Event> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

pub fn hooks(events: &[Event]) -> Vec<Hook> {
    events.iter().map(|event| event.hook).collect()
}

/// Sorted instance ids that received `hook`.
pub fn instances(events: &[Event], hook: Hook) -> Vec<usize> {
    let mut ids: Vec<usize> = events
        .iter()
        .filter(|event| event.hook == hook)
        .map(|event| event.instance)
        .collect();
    ids.sort_unstable();
    ids
}

pub extern "C" fn wildcard_accessor() -> *const c_char {
    b"\0".as_ptr().cast()
}

pub extern "C" fn declares_2_or_3() -> *const c_char {
    b"2.0;3.0\0".as_ptr().cast()
}

pub extern "C" fn declares_0_9_or_1_0() -> *const c_char {
    b"0.9;1.0\0".as_ptr().cast()
}

pub extern "C" fn declares_other_host() -> *const c_char {
    b"SomethingElse;Other\0".as_ptr().cast()
}

pub extern "C" fn null_accessor() -> *const c_char {
    ptr::null()
}

unsafe fn instance_id(state: *mut c_void) -> usize {
    *state.cast::<usize>()
}

pub unsafe extern "C" fn mock_create(host: *const HostContext) -> *mut c_void {
    let id = NEXT_INSTANCE.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    let graphics_api = host.as_ref().and_then(|host| host.graphics_api());
    record(Hook::Create, id, graphics_api);
    Box::into_raw(Box::new(id)).cast()
}

pub unsafe extern "C" fn create_null(_host: *const HostContext) -> *mut c_void {
    ptr::null_mut()
}

pub unsafe extern "C" fn mock_destroy(_host: *const HostContext, state: *mut c_void) {
    let id = Box::from_raw(state.cast::<usize>());
    record(Hook::Destroy, *id, None);
}

pub unsafe extern "C" fn mock_setup(state: *mut c_void, parameters: *mut VariantMap) {
    let id = instance_id(state);
    record(Hook::Setup, id, None);
    if let Some(parameters) = parameters.as_mut() {
        parameters.insert(format!("instance_{id}"), true.into());
    }
}

pub unsafe extern "C" fn mock_start(state: *mut c_void) {
    record(Hook::Start, instance_id(state), None);
}

pub unsafe extern "C" fn mock_stop(state: *mut c_void) {
    record(Hook::Stop, instance_id(state), None);
}

pub unsafe extern "C" fn mock_script_binding(
    state: *mut c_void,
    script_type_name: *const c_char,
    _script_context: *mut c_void,
) {
    record(
        Hook::ScriptBinding,
        instance_id(state),
        read_c_string(script_type_name),
    );
}

/// Export table of a fake plugin.
#[derive(Clone)]
pub struct MockPlugin {
    symbols: HashMap<&'static str, RawSymbol>,
}

impl MockPlugin {
    /// A plugin with every export present and every axis a wildcard.
    pub fn wildcard() -> Self {
        let mut plugin = Self {
            symbols: HashMap::new(),
        };
        for symbol in symbols::COMPATIBILITY {
            plugin = plugin.with_accessor(symbol, wildcard_accessor);
        }
        plugin
            .with_symbol(
                symbols::CREATE_APPLICATION,
                mock_create as CreateApplicationFn as RawSymbol,
            )
            .with_symbol(
                symbols::DESTROY_APPLICATION,
                mock_destroy as DestroyApplicationFn as RawSymbol,
            )
            .with_symbol(symbols::SETUP, mock_setup as SetupFn as RawSymbol)
            .with_symbol(symbols::START, mock_start as StartFn as RawSymbol)
            .with_symbol(symbols::STOP, mock_stop as StopFn as RawSymbol)
            .with_symbol(
                symbols::ON_SCRIPT_BINDING,
                mock_script_binding as ScriptBindingFn as RawSymbol,
            )
    }

    pub fn with_accessor(self, symbol: &'static str, accessor: CompatibilityFn) -> Self {
        self.with_symbol(symbol, accessor as RawSymbol)
    }

    pub fn with_symbol(mut self, symbol: &'static str, raw: RawSymbol) -> Self {
        self.symbols.insert(symbol, raw);
        self
    }

    pub fn without(mut self, symbol: &str) -> Self {
        self.symbols.remove(symbol);
        self
    }
}

/// Open and release counters of one mock library file.
#[derive(Debug, Default)]
pub struct LibraryStats {
    opened: Cell<usize>,
    released: Cell<usize>,
}

impl LibraryStats {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }
}

pub struct MockLibrary {
    symbols: HashMap<&'static str, RawSymbol>,
    stats: Rc<LibraryStats>,
}

impl PluginLibrary for MockLibrary {
    fn symbol(&self, name: &str) -> Option<RawSymbol> {
        self.symbols.get(name).copied()
    }
}

impl Drop for MockLibrary {
    fn drop(&mut self) {
        self.stats.released.set(self.stats.released.get() + 1);
    }
}

/// Serves registered mock plugins by path; every other path fails to open.
#[derive(Default)]
pub struct MockOpener {
    files: RefCell<HashMap<PathBuf, (MockPlugin, Rc<LibraryStats>)>>,
}

impl MockOpener {
    /// Registers a plugin at the primary path `name` resolves to.
    pub fn register(&self, name: &str, plugin: MockPlugin) -> Rc<LibraryStats> {
        self.register_at(library_candidates(name).remove(0), plugin)
    }

    pub fn register_at(&self, path: PathBuf, plugin: MockPlugin) -> Rc<LibraryStats> {
        let stats = Rc::new(LibraryStats::default());
        self.files
            .borrow_mut()
            .insert(path, (plugin, Rc::clone(&stats)));
        stats
    }
}

impl LibraryOpener for MockOpener {
    type Library = MockLibrary;

    fn open(&self, path: &Path) -> Result<MockLibrary, String> {
        let files = self.files.borrow();
        let (plugin, stats) = files
            .get(path)
            .ok_or_else(|| format!("{}: no such file", path.display()))?;
        stats.opened.set(stats.opened.get() + 1);
        Ok(MockLibrary {
            symbols: plugin.symbols.clone(),
            stats: Rc::clone(stats),
        })
    }
}

/// Host reporting fixed values on every axis.
pub struct MockHost;

impl HostServices for MockHost {
    fn engine_version(&self) -> String {
        "1.0".into()
    }

    fn compiler_version(&self) -> String {
        "1.80.0".into()
    }

    fn os_version(&self) -> String {
        "TestOS 1".into()
    }

    fn graphics_api(&self) -> String {
        "OpenGL".into()
    }

    fn quiet(&self) -> bool {
        true
    }
}
