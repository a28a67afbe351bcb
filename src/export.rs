/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! JSON report of an analysis, saved next to the reviewed document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::model::{AnalysisResult, Detection, StampValidation};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport<'a> {
    pub file_name: &'a str,
    pub analysis_date: String,
    pub stamp: &'a Detection,
    pub signature: &'a Detection,
    pub stamp_validation: StampValidation,
    pub matched_stamp_type: Option<&'a str>,
}

impl<'a> ExportReport<'a> {
    pub fn new(file_name: &'a str, result: &'a AnalysisResult, now: DateTime<Utc>) -> Self {
        Self {
            file_name,
            analysis_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            stamp: &result.stamp,
            signature: &result.signature,
            stamp_validation: result.stamp_validation,
            matched_stamp_type: result.matched_stamp_type.as_deref(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn report_filename(now: DateTime<Utc>) -> String {
    format!("stamp_signature_analysis_{}.json", now.timestamp_millis())
}
