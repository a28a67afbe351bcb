/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("request to analysis service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("unexpected response from analysis service: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },
}
