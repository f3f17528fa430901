// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Set panic hook for better error messages in the browser
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Log a warning to the browser console
pub fn console_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

/// Log a debug line to the browser console
pub fn console_debug(message: &str) {
    web_sys::console::debug_1(&message.into());
}
