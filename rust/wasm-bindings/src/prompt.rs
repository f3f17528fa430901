// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement prompts backed by JavaScript callbacks

use js_sys::Function;
use planscale_core::{MeasurementPrompt, Rect};
use wasm_bindgen::{JsCast, JsValue};

/// Prompt that asks the page for real-world values
///
/// Each callback receives a message (and the selection rectangle for the
/// dimension prompts) and returns a string, a number, or `null` on cancel.
#[derive(Debug, Clone, Default)]
pub struct JsPrompt {
    real_distance: Option<Function>,
    real_width: Option<Function>,
    real_height: Option<Function>,
}

impl JsPrompt {
    /// Read `realDistance`, `realWidth` and `realHeight` from an options object
    pub fn from_options(options: &JsValue) -> Self {
        let callback = |key: &str| {
            js_sys::Reflect::get(options, &key.into())
                .ok()
                .and_then(|v| v.dyn_into::<Function>().ok())
        };
        Self {
            real_distance: callback("realDistance"),
            real_width: callback("realWidth"),
            real_height: callback("realHeight"),
        }
    }

    fn ask(callback: Option<&Function>, message: &str, rect: Option<&Rect>) -> Option<String> {
        let callback = callback?;
        let rect = rect
            .and_then(|r| serde_wasm_bindgen::to_value(r).ok())
            .unwrap_or(JsValue::UNDEFINED);
        let answer = callback
            .call2(&JsValue::NULL, &JsValue::from_str(message), &rect)
            .ok()?;
        answer_text(&answer)
    }
}

/// Strings pass through; numbers are formatted; anything else is a cancel
fn answer_text(answer: &JsValue) -> Option<String> {
    answer
        .as_string()
        .or_else(|| answer.as_f64().map(|n| n.to_string()))
}

impl MeasurementPrompt for JsPrompt {
    fn real_distance(&mut self) -> Option<String> {
        Self::ask(
            self.real_distance.as_ref(),
            "Enter the real distance between the two points",
            None,
        )
    }

    fn real_width(&mut self, rect: &Rect) -> Option<String> {
        Self::ask(
            self.real_width.as_ref(),
            "Enter the real width of the selection (feet)",
            Some(rect),
        )
    }

    fn real_height(&mut self, rect: &Rect) -> Option<String> {
        Self::ask(
            self.real_height.as_ref(),
            "Enter the real height of the selection (feet)",
            Some(rect),
        )
    }
}
