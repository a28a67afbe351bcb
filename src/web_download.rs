/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Browser blob helpers for WASM: report download and PDF preview tab.

use wasm_bindgen::JsCast;

fn object_url(data: &[u8], mime_type: &str) -> Result<String, String> {
    let array = js_sys::Uint8Array::from(data);
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&array.buffer());

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)
        .map_err(|e| format!("Failed to create Blob: {:?}", e))?;

    web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))
}

fn revoke_later(window: &web_sys::Window, url: String, delay_ms: i32) {
    let closure = wasm_bindgen::closure::Closure::once(move || {
        web_sys::Url::revoke_object_url(&url).ok();
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms,
        )
        .ok();
    closure.forget();
}

/// Trigger a browser file download from raw bytes.
pub fn download_file(filename: &str, data: &[u8], mime_type: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object available")?;
    let document = window.document().ok_or("No document available")?;
    let body = document.body().ok_or("No body element available")?;

    let url = object_url(data, mime_type)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor element: {:?}", e))?
        .dyn_into()
        .map_err(|_| "Created element is not an anchor".to_string())?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.style().set_property("display", "none").ok();

    body.append_child(&anchor).ok();
    anchor.click();
    body.remove_child(&anchor).ok();

    // Revoke after a short delay to ensure download starts
    revoke_later(&window, url, 5000);
    Ok(())
}

pub fn download_json(filename: &str, json: &str) -> Result<(), String> {
    download_file(filename, json.as_bytes(), "application/json")
}

/// Show a document with the browser's own viewer (used for PDFs).
pub fn open_in_new_tab(data: &[u8], mime_type: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object available")?;
    let url = object_url(data, mime_type)?;
    window
        .open_with_url_and_target(&url, "_blank")
        .map_err(|e| format!("Failed to open tab: {:?}", e))?;
    // The tab loads asynchronously; keep the URL alive for a while
    revoke_later(&window, url, 60_000);
    Ok(())
}
