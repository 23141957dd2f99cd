//! Error-reporting hooks for the CLI.

/// Installs the [`eyre`] and [`panic`](mod@std::panic) hooks as the global
/// ones.
///
/// A simple user-centric handler is installed by default; set
/// `LAYOUT_CHECK_DEBUG` in the environment for the verbose debug-centric one.
pub fn install() {
    let debug = std::env::var_os("LAYOUT_CHECK_DEBUG").is_some();
    if debug && std::env::var_os("RUST_BACKTRACE").is_none() {
        unsafe {
            std::env::set_var("RUST_BACKTRACE", "1");
        }
    }

    let panic_section =
        "This is a bug. Consider reporting it at https://github.com/layout-check/layout-check";
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(panic_section)
        .display_env_section(debug)
        .display_location_section(debug)
        .into_hooks();
    panic_hook.install();
    if let Err(err) = eyre_hook.install() {
        debug!("failed to install eyre error hook: {err}");
    }
}
