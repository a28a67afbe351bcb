/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Client for the remote stamp/signature analysis service.
//! Detection and official-stamp matching happen server side; this only ships
//! the document and decodes the verdict.

use std::future::Future;

use reqwest::multipart::{Form, Part};

use crate::config::ServiceConfig;
use crate::error::AnalyzerError;
use crate::model::{AnalysisRequest, AnalysisResult};

#[derive(Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, AnalyzerError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));

        Ok(Self {
            http: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload the document and decode the service verdict.
    pub async fn analyze_stamps_and_signatures(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let file = Part::bytes(request.bytes.clone())
            .file_name(request.filename.clone())
            .mime_str(&request.mime)?;
        let form = Form::new()
            .part("file", file)
            .text("user_id", request.user_id.clone());

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            return Err(AnalyzerError::Service {
                status: status.as_u16(),
                message: error_message(&body, reason),
            });
        }
        parse_response(&body)
    }
}

pub fn parse_response(body: &[u8]) -> Result<AnalysisResult, AnalyzerError> {
    let mut result: AnalysisResult = serde_json::from_slice(body)?;
    if result
        .matched_stamp_type
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        result.matched_stamp_type = None;
    }
    Ok(result)
}

/// Pull a human readable message out of an error response body.
pub fn error_message(body: &[u8], fallback: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(serde_json::Value::String(msg)) = map.get(key)
                && !msg.trim().is_empty()
            {
                return msg.trim().to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Run an analysis future off the UI thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    std::thread::spawn(move || {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(task),
            Err(e) => log::error!("Failed to start analysis runtime: {}", e),
        }
    });
}

#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
}
