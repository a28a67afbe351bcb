/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Browser file picker via wasm-bindgen

use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/file_picker.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn open_file_picker(accept: &str) -> Result<JsValue, JsValue>;
}

/// A file chosen in the browser: name, reported MIME type, contents
pub type PickedFile = (String, Option<String>, Vec<u8>);

pub const ACCEPT: &str = "image/*,application/pdf";

/// Open the picker and return the chosen file, or `None` if cancelled.
pub async fn pick_file() -> Result<Option<PickedFile>, String> {
    let result = open_file_picker(ACCEPT)
        .await
        .map_err(|e| format!("File picker error: {:?}", e))?;

    if result.is_null() || result.is_undefined() {
        return Ok(None);
    }

    let name = js_sys::Reflect::get(&result, &"name".into())
        .map_err(|_| "Missing name field".to_string())?
        .as_string()
        .unwrap_or_default();
    let mime = js_sys::Reflect::get(&result, &"type".into())
        .ok()
        .and_then(|v| v.as_string())
        .filter(|m| !m.is_empty());
    let bytes_js = js_sys::Reflect::get(&result, &"bytes".into())
        .map_err(|_| "Missing bytes field".to_string())?;
    let uint8: js_sys::Uint8Array = bytes_js
        .dyn_into()
        .map_err(|_| "Expected Uint8Array for bytes".to_string())?;

    Ok(Some((name, mime, uint8.to_vec())))
}
