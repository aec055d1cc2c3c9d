/// Exports a [`PluginApplication`](crate::PluginApplication) as a loadable plugin.
///
/// Generates the eleven C entry points the host resolves: five compatibility
/// accessors built from the given lists and six lifecycle shims that forward
/// to [`export`](crate::export). Invoke it exactly once per plugin library.
///
/// Each list holds `&str` constants. An empty list accepts any host value.
///
/// ```rust,ignore
/// define_plugin_application!(Greeter,
///     engine_version: [ENGINE_VERSION],
///     compiler_id: [COMPILER_ID],
///     compiler_version: [COMPILER_VERSION],
///     os_version: [],
///     graphics_api: ["OpenGL", "D3D11"],
/// );
/// ```
#[macro_export]
macro_rules! define_plugin_application {
    (
        $app:ty,
        engine_version: [$($engine:expr),* $(,)?],
        compiler_id: [$($compiler_id:expr),* $(,)?],
        compiler_version: [$($compiler_version:expr),* $(,)?],
        os_version: [$($os:expr),* $(,)?],
        graphics_api: [$($graphics:expr),* $(,)?] $(,)?
    ) => {
        const __PLUGIN_NAME: &str = env!("CARGO_CRATE_NAME");

        $crate::__compatibility_export!(GetUrhoCompatibleVersion $(, $engine)*);
        $crate::__compatibility_export!(GetCompatibleCompilatorName $(, $compiler_id)*);
        $crate::__compatibility_export!(GetCompatibleCompilatorVersion $(, $compiler_version)*);
        $crate::__compatibility_export!(GetCompatibleOSVersion $(, $os)*);
        $crate::__compatibility_export!(GetCompatibleGraphicAPI $(, $graphics)*);

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn CreatePluginApplication(
            host: *const $crate::HostContext,
        ) -> *mut ::std::ffi::c_void {
            $crate::export::create_application::<$app>(__PLUGIN_NAME, host)
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn DestroyPluginApplication(
            host: *const $crate::HostContext,
            state: *mut ::std::ffi::c_void,
        ) {
            $crate::export::destroy_application::<$app>(host, state)
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn Setup(
            state: *mut ::std::ffi::c_void,
            parameters: *mut $crate::VariantMap,
        ) {
            $crate::export::setup::<$app>(state, parameters)
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn Start(state: *mut ::std::ffi::c_void) {
            $crate::export::start::<$app>(state)
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn Stop(state: *mut ::std::ffi::c_void) {
            $crate::export::stop::<$app>(state)
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn OnScriptBinding(
            state: *mut ::std::ffi::c_void,
            script_type_name: *const ::std::ffi::c_char,
            script_context: *mut ::std::ffi::c_void,
        ) {
            $crate::export::on_script_binding::<$app>(state, script_type_name, script_context)
        }
    };
}

/// Joins compatibility values with `;` at compile time.
#[doc(hidden)]
#[macro_export]
macro_rules! __compatibility_list {
    () => {
        ""
    };
    ($first:expr $(, $rest:expr)*) => {
        $crate::__private::const_format::concatcp!($first $(, ";", $rest)*)
    };
}

/// Emits one NUL-terminated compatibility accessor.
#[doc(hidden)]
#[macro_export]
macro_rules! __compatibility_export {
    ($symbol:ident $(, $value:expr)*) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub extern "C" fn $symbol() -> *const ::std::ffi::c_char {
            const DECLARED: &str = $crate::__compatibility_list!($($value),*);
            const TERMINATED: &str = $crate::__private::const_format::concatcp!(DECLARED, "\0");
            TERMINATED.as_ptr().cast()
        }
    };
}
