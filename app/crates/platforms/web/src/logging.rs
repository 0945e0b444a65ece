//! Console logging and panic reporting

/// Routes `log` records and panics to the browser console. Safe to call more
/// than once.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if log::max_level() == log::LevelFilter::Off {
        wasm_log::init(wasm_log::Config::new(log::Level::Info));
    }
}
