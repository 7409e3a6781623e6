//! Internationalization (i18n) module
//!
//! Picks the UI locale from the system settings. English and Simplified
//! Chinese are shipped; everything else falls back to English.
//! Log messages stay in English.

use tracing::debug;

/// Locales with a translation file under `locales/`
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// Map a BCP 47 tag such as `zh-Hans-CN` or `en_US.UTF-8` to a shipped locale
pub fn locale_for(tag: &str) -> &'static str {
    let tag = tag.to_lowercase();
    if tag.starts_with("zh") {
        "zh-CN"
    } else {
        "en"
    }
}

/// Set the process-wide locale from the system
pub fn init_locale() {
    let tag = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let locale = locale_for(&tag);
    rust_i18n::set_locale(locale);
    debug!(system = %tag, locale, "Locale selected");
}
