// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PlanScale WebAssembly Bindings
//!
//! JavaScript/TypeScript API for blueprint measurement built with wasm-bindgen.

use wasm_bindgen::prelude::*;

mod measure_api;
mod prompt;
mod utils;

pub use measure_api::{BindingError, MeasureAPI};
pub use prompt::JsPrompt;
pub use utils::set_panic_hook as init_panic_hook;

/// Initialize the WASM module
///
/// Runs once when the module is instantiated; awaiting the module's init
/// promise is all the readiness signal an embedding needs.
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}

/// Get the version of PlanScale
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
