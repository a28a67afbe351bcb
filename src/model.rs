/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    /// Classify an accepted document, or `None` if it is neither an image nor a PDF.
    pub fn detect(filename: &str, mime: Option<&str>, bytes: &[u8]) -> Option<Self> {
        let lower = filename.to_lowercase();
        let mime = mime.map(str::trim).filter(|m| !m.is_empty());

        if mime == Some("application/pdf") || lower.ends_with(".pdf") || bytes.starts_with(b"%PDF")
        {
            return Some(DocumentKind::Pdf);
        }
        let image_mime = mime.is_some_and(|m| m.starts_with("image/"));
        if image_mime || IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Some(DocumentKind::Image)
        } else {
            None
        }
    }
}

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tif", ".tiff",
];

/// Best-effort MIME type when the platform does not report one.
pub fn guess_mime(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    let ext = lower.rsplit('.').next().unwrap_or_default();
    match ext {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[derive(Clone, Debug)]
pub struct SelectedDocument {
    pub filename: String,
    pub mime: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl SelectedDocument {
    pub fn new(filename: String, mime: Option<String>, bytes: Vec<u8>) -> Result<Self, String> {
        let kind = DocumentKind::detect(&filename, mime.as_deref(), &bytes)
            .ok_or_else(|| format!("{}: only images and PDF documents are supported", filename))?;
        let mime = match mime.filter(|m| !m.trim().is_empty()) {
            Some(m) => m,
            None if kind == DocumentKind::Pdf => "application/pdf".to_string(),
            None => guess_mime(&filename).to_string(),
        };
        Ok(Self {
            filename,
            mime,
            kind,
            bytes,
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == DocumentKind::Pdf
    }

    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.bytes.len() as f64 / 1024.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionStatus {
    Present,
    Absent,
}

impl std::fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionStatus::Present => write!(f, "Present"),
            DetectionStatus::Absent => write!(f, "Absent"),
        }
    }
}

/// Axis-aligned box in source image pixels, carried on the wire as `[x, y, w, h]`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f64; 4]")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Largest magnitude an f64 holds without losing integer precision
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for BoundingBox {
    // Whole-pixel coordinates go out as integers, the way the service sends them
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeTuple;

        let mut tuple = serializer.serialize_tuple(4)?;
        for value in [self.x, self.y, self.width, self.height] {
            if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
                tuple.serialize_element(&(value as i64))?;
            } else {
                tuple.serialize_element(&value)?;
            }
        }
        tuple.end()
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "Status")]
    pub status: DetectionStatus,
    #[serde(rename = "Coordinates", default)]
    pub coordinates: Option<BoundingBox>,
}

impl Detection {
    /// Box to draw, only when the detection is present and localized.
    pub fn located(&self) -> Option<BoundingBox> {
        match self.status {
            DetectionStatus::Present => self.coordinates,
            DetectionStatus::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status == DetectionStatus::Present
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampValidation {
    Y,
    #[default]
    N,
}

impl StampValidation {
    pub fn is_valid(self) -> bool {
        self == StampValidation::Y
    }
}

impl std::fmt::Display for StampValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StampValidation::Y => write!(f, "Y"),
            StampValidation::N => write!(f, "N"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "Stamp")]
    pub stamp: Detection,
    #[serde(rename = "Signature")]
    pub signature: Detection,
    #[serde(rename = "StampValidation", default)]
    pub stamp_validation: StampValidation,
    #[serde(rename = "MatchedStampType", default)]
    pub matched_stamp_type: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    NeedsReview,
}

impl Verdict {
    pub fn sentence(self) -> &'static str {
        match self {
            Verdict::Verified => "This document has valid stamps and signatures",
            Verdict::NeedsReview => "This document may require additional verification",
        }
    }
}

impl AnalysisResult {
    pub fn verdict(&self) -> Verdict {
        if self.stamp.is_present() && self.signature.is_present() && self.stamp_validation.is_valid()
        {
            Verdict::Verified
        } else {
            Verdict::NeedsReview
        }
    }
}

/// Payload handed to a background analysis task.
#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    pub id: u64,
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    Analyzing { request_id: u64 },
    Done,
    Failed,
}

pub struct AppState {
    pub document: Option<SelectedDocument>,
    pub phase: AnalysisPhase,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub status_message: String,
    next_request_id: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            document: None,
            phase: AnalysisPhase::Idle,
            result: None,
            error: None,
            status_message: "Select a document to analyze for stamps and signatures".into(),
            next_request_id: 1,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, AnalysisPhase::Analyzing { .. })
    }

    pub fn select_document(&mut self, document: SelectedDocument) {
        if let AnalysisPhase::Analyzing { request_id } = self.phase {
            log::info!("Dropping in-flight analysis #{} for new selection", request_id);
        }
        self.status_message = format!("{} ({})", document.filename, document.size_label());
        self.document = Some(document);
        self.phase = AnalysisPhase::Idle;
        self.result = None;
        self.error = None;
    }

    /// Move into `Analyzing` and hand out the request to run.
    pub fn begin_analysis(&mut self, user_id: Option<&str>) -> Option<AnalysisRequest> {
        if self.is_analyzing() {
            return None;
        }
        let user_id = user_id.map(str::trim).filter(|u| !u.is_empty())?;
        let document = self.document.as_ref()?;

        let request = AnalysisRequest {
            id: self.next_request_id,
            filename: document.filename.clone(),
            mime: document.mime.clone(),
            bytes: document.bytes.clone(),
            user_id: user_id.to_string(),
        };
        self.next_request_id += 1;
        self.phase = AnalysisPhase::Analyzing {
            request_id: request.id,
        };
        self.error = None;
        self.status_message = format!("Analyzing {}...", request.filename);
        Some(request)
    }

    /// Apply a finished analysis. Returns `false` when the outcome is stale.
    pub fn complete_analysis(
        &mut self,
        request_id: u64,
        outcome: Result<AnalysisResult, String>,
    ) -> bool {
        if self.phase != (AnalysisPhase::Analyzing { request_id }) {
            return false;
        }
        match outcome {
            Ok(result) => {
                self.status_message = format!("Analysis complete: {}", result.verdict().sentence());
                self.result = Some(result);
                self.phase = AnalysisPhase::Done;
            }
            Err(message) => {
                self.status_message = "Analysis failed".into();
                self.error = Some(message);
                self.phase = AnalysisPhase::Failed;
            }
        }
        true
    }

    /// Back to the empty state. Request ids keep counting so nothing in flight
    /// can match a later request.
    pub fn reset(&mut self) {
        let next_request_id = self.next_request_id;
        *self = AppState::new();
        self.next_request_id = next_request_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_doc(name: &str) -> SelectedDocument {
        SelectedDocument::new(name.into(), Some("image/png".into()), vec![0u8; 2560]).unwrap()
    }

    fn result(stamp: DetectionStatus, sig: DetectionStatus, valid: StampValidation) -> AnalysisResult {
        AnalysisResult {
            stamp: Detection {
                status: stamp,
                coordinates: Some(BoundingBox::from([10.0, 40.0, 80.0, 60.0])),
            },
            signature: Detection {
                status: sig,
                coordinates: None,
            },
            stamp_validation: valid,
            matched_stamp_type: None,
        }
    }

    #[test]
    fn detects_document_kinds() {
        assert_eq!(
            DocumentKind::detect("scan.PDF", None, b""),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect("blob", Some("application/pdf"), b""),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect("noext", None, b"%PDF-1.7\n"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect("photo", Some("image/jpeg"), b""),
            Some(DocumentKind::Image)
        );
        assert_eq!(
            DocumentKind::detect("photo.JPG", None, b""),
            Some(DocumentKind::Image)
        );
        assert_eq!(DocumentKind::detect("notes.txt", Some("text/plain"), b""), None);
        assert_eq!(DocumentKind::detect("notes.txt", None, b""), None);
    }

    #[test]
    fn rejects_unsupported_document() {
        let err = SelectedDocument::new("a.docx".into(), None, vec![1, 2, 3]).unwrap_err();
        assert!(err.contains("a.docx"));
    }

    #[test]
    fn fills_missing_mime() {
        let doc = SelectedDocument::new("stamp.jpeg".into(), None, vec![]).unwrap();
        assert_eq!(doc.mime, "image/jpeg");
        let doc = SelectedDocument::new("x".into(), Some(String::new()), b"%PDF".to_vec()).unwrap();
        assert_eq!(doc.mime, "application/pdf");
    }

    #[test]
    fn size_label_in_kilobytes() {
        assert_eq!(image_doc("a.png").size_label(), "2.5 KB");
    }

    #[test]
    fn begin_requires_document_and_user() {
        let mut state = AppState::new();
        assert!(state.begin_analysis(Some("u1")).is_none());

        state.select_document(image_doc("a.png"));
        assert!(state.begin_analysis(None).is_none());
        assert!(state.begin_analysis(Some("  ")).is_none());
        assert_eq!(state.phase, AnalysisPhase::Idle);

        let req = state.begin_analysis(Some("u1")).unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.filename, "a.png");
        assert!(state.is_analyzing());
        // A second click while running is ignored
        assert!(state.begin_analysis(Some("u1")).is_none());
    }

    #[test]
    fn completion_stores_result() {
        let mut state = AppState::new();
        state.select_document(image_doc("a.png"));
        let req = state.begin_analysis(Some("u1")).unwrap();
        let r = result(DetectionStatus::Present, DetectionStatus::Present, StampValidation::Y);

        assert!(state.complete_analysis(req.id, Ok(r.clone())));
        assert_eq!(state.phase, AnalysisPhase::Done);
        assert_eq!(state.result, Some(r));
        assert!(state.error.is_none());
    }

    #[test]
    fn failure_keeps_previous_result() {
        let mut state = AppState::new();
        state.select_document(image_doc("a.png"));
        let first = state.begin_analysis(Some("u1")).unwrap();
        let r = result(DetectionStatus::Present, DetectionStatus::Absent, StampValidation::N);
        state.complete_analysis(first.id, Ok(r.clone()));

        let second = state.begin_analysis(Some("u1")).unwrap();
        assert!(second.id > first.id);
        assert!(state.complete_analysis(second.id, Err("timeout".into())));
        assert_eq!(state.phase, AnalysisPhase::Failed);
        assert_eq!(state.error.as_deref(), Some("timeout"));
        assert_eq!(state.result, Some(r));
    }

    #[test]
    fn new_selection_discards_stale_outcome() {
        let mut state = AppState::new();
        state.select_document(image_doc("a.png"));
        let req = state.begin_analysis(Some("u1")).unwrap();

        state.select_document(image_doc("b.png"));
        assert_eq!(state.phase, AnalysisPhase::Idle);

        let r = result(DetectionStatus::Present, DetectionStatus::Present, StampValidation::Y);
        assert!(!state.complete_analysis(req.id, Ok(r)));
        assert!(state.result.is_none());
        assert_eq!(state.document.as_ref().unwrap().filename, "b.png");
    }

    #[test]
    fn reset_discards_in_flight_outcome() {
        let mut state = AppState::new();
        state.select_document(image_doc("a.png"));
        let old = state.begin_analysis(Some("u1")).unwrap();

        state.reset();
        assert_eq!(state.phase, AnalysisPhase::Idle);
        assert!(state.document.is_none());

        state.select_document(image_doc("b.png"));
        let new = state.begin_analysis(Some("u1")).unwrap();
        assert_ne!(old.id, new.id);

        let r = result(DetectionStatus::Present, DetectionStatus::Present, StampValidation::Y);
        assert!(!state.complete_analysis(old.id, Ok(r.clone())));
        assert!(state.result.is_none());
        assert!(state.is_analyzing());

        assert!(state.complete_analysis(new.id, Ok(r)));
        assert_eq!(state.phase, AnalysisPhase::Done);
    }

    #[test]
    fn selection_clears_result_and_error() {
        let mut state = AppState::new();
        state.select_document(image_doc("a.png"));
        let req = state.begin_analysis(Some("u1")).unwrap();
        state.complete_analysis(req.id, Err("boom".into()));

        state.select_document(image_doc("b.png"));
        assert!(state.error.is_none());
        assert!(state.result.is_none());
    }

    #[test]
    fn verdict_needs_all_three() {
        use DetectionStatus::*;
        use StampValidation::*;
        assert_eq!(result(Present, Present, Y).verdict(), Verdict::Verified);
        assert_eq!(result(Present, Present, N).verdict(), Verdict::NeedsReview);
        assert_eq!(result(Absent, Present, Y).verdict(), Verdict::NeedsReview);
        assert_eq!(result(Present, Absent, Y).verdict(), Verdict::NeedsReview);
    }

    #[test]
    fn absent_detection_has_no_box() {
        let d = Detection {
            status: DetectionStatus::Absent,
            coordinates: Some(BoundingBox::from([1.0, 2.0, 3.0, 4.0])),
        };
        assert!(d.located().is_none());
    }

    #[test]
    fn bounding_box_keeps_integer_coordinates() {
        let b = BoundingBox::from([120.0, 45.5, 16_777_217.0, 80.0]);
        assert_eq!(
            serde_json::to_string(&b).unwrap(),
            "[120,45.5,16777217,80]"
        );
        let back: BoundingBox = serde_json::from_str("[120,45.5,16777217,80]").unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn bounding_box_display_matches_wire_order() {
        let b = BoundingBox::from([120.0, 45.5, 200.0, 80.0]);
        assert_eq!(b.to_string(), "[120, 45.5, 200, 80]");
    }
}
