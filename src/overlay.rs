/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Bounding-box overlay for detected stamps and signatures.
//! Geometry is computed in source image pixels and mapped onto the scaled
//! preview at paint time.

use egui::emath::RectTransform;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2, pos2, vec2};

use crate::model::{AnalysisResult, BoundingBox};

pub const VALID_STAMP_COLOR: Color32 = Color32::from_rgb(0x10, 0xB9, 0x81);
pub const UNVERIFIED_STAMP_COLOR: Color32 = Color32::from_rgb(0xF5, 0x9E, 0x0B);
pub const SIGNATURE_COLOR: Color32 = Color32::from_rgb(0x3B, 0x82, 0xF6);

const STROKE_WIDTH: f32 = 3.0;
const LABEL_HEIGHT: f32 = 25.0;
const STAMP_LABEL_WIDTH: f32 = 120.0;
const SIGNATURE_LABEL_WIDTH: f32 = 100.0;
const LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_TEXT_INSET: Vec2 = vec2(10.0, 8.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    Stamp,
    Signature,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBox {
    pub kind: OverlayKind,
    /// Detected region, source pixels
    pub rect: Rect,
    /// Filled tab holding the label, source pixels
    pub label_rect: Rect,
    pub label: String,
    pub color: Color32,
}

impl OverlayBox {
    fn new(kind: OverlayKind, bbox: BoundingBox, label: String, width: f32, color: Color32) -> Self {
        let (x, y) = (bbox.x as f32, bbox.y as f32);
        let rect = Rect::from_min_size(pos2(x, y), vec2(bbox.width as f32, bbox.height as f32));
        // Tab sits above the box; flip inside when there is no room above
        let label_top = if y >= LABEL_HEIGHT { y - LABEL_HEIGHT } else { y };
        let label_rect = Rect::from_min_size(pos2(x, label_top), vec2(width, LABEL_HEIGHT));
        Self {
            kind,
            rect,
            label_rect,
            label,
            color,
        }
    }

    /// Baseline-left anchor of the label text, source pixels
    pub fn text_anchor(&self) -> Pos2 {
        pos2(
            self.label_rect.min.x + LABEL_TEXT_INSET.x,
            self.label_rect.max.y - LABEL_TEXT_INSET.y,
        )
    }
}

pub fn stamp_color(valid: bool) -> Color32 {
    if valid {
        VALID_STAMP_COLOR
    } else {
        UNVERIFIED_STAMP_COLOR
    }
}

pub fn overlay_boxes(result: &AnalysisResult) -> Vec<OverlayBox> {
    let mut boxes = Vec::with_capacity(2);
    let valid = result.stamp_validation.is_valid();

    if let Some(bbox) = result.stamp.located() {
        let mark = if valid { '✔' } else { '✖' };
        boxes.push(OverlayBox::new(
            OverlayKind::Stamp,
            bbox,
            format!("Stamp {}", mark),
            STAMP_LABEL_WIDTH,
            stamp_color(valid),
        ));
    }
    if let Some(bbox) = result.signature.located() {
        boxes.push(OverlayBox::new(
            OverlayKind::Signature,
            bbox,
            "Signature".into(),
            SIGNATURE_LABEL_WIDTH,
            SIGNATURE_COLOR,
        ));
    }
    boxes
}

/// Map source pixel space onto the on-screen preview rect.
pub fn source_to_screen(source_size: Vec2, image_rect: Rect) -> RectTransform {
    RectTransform::from_to(Rect::from_min_size(Pos2::ZERO, source_size), image_rect)
}

pub fn paint_overlays(painter: &Painter, image_rect: Rect, source_size: Vec2, boxes: &[OverlayBox]) {
    if source_size.x <= 0.0 || source_size.y <= 0.0 {
        return;
    }
    let to_screen = source_to_screen(source_size, image_rect);
    let scale = to_screen.scale().x;
    let stroke_width = (STROKE_WIDTH * scale).max(1.5);
    let font = FontId::proportional((LABEL_FONT_SIZE * scale).max(9.0));

    // Keep labels from bleeding into neighbouring widgets
    let painter = painter.with_clip_rect(image_rect);
    for overlay in boxes {
        painter.rect_stroke(
            to_screen.transform_rect(overlay.rect),
            0.0,
            Stroke::new(stroke_width, overlay.color),
            StrokeKind::Middle,
        );
        painter.rect_filled(to_screen.transform_rect(overlay.label_rect), 0.0, overlay.color);
        painter.text(
            to_screen.transform_pos(overlay.text_anchor()),
            Align2::LEFT_BOTTOM,
            &overlay.label,
            font.clone(),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Detection, DetectionStatus, StampValidation};

    fn detection(status: DetectionStatus, coords: Option<[f64; 4]>) -> Detection {
        Detection {
            status,
            coordinates: coords.map(BoundingBox::from),
        }
    }

    fn result(stamp: Detection, signature: Detection, valid: StampValidation) -> AnalysisResult {
        AnalysisResult {
            stamp,
            signature,
            stamp_validation: valid,
            matched_stamp_type: None,
        }
    }

    #[test]
    fn valid_stamp_is_green_with_check() {
        let r = result(
            detection(DetectionStatus::Present, Some([50.0, 100.0, 200.0, 150.0])),
            detection(DetectionStatus::Absent, None),
            StampValidation::Y,
        );
        let boxes = overlay_boxes(&r);

        assert_eq!(boxes.len(), 1);
        let stamp = &boxes[0];
        assert_eq!(stamp.kind, OverlayKind::Stamp);
        assert_eq!(stamp.color, VALID_STAMP_COLOR);
        assert_eq!(stamp.label, "Stamp ✔");
        assert_eq!(stamp.rect, Rect::from_min_max(pos2(50.0, 100.0), pos2(250.0, 250.0)));
        assert_eq!(stamp.label_rect, Rect::from_min_max(pos2(50.0, 75.0), pos2(170.0, 100.0)));
        assert_eq!(stamp.text_anchor(), pos2(60.0, 92.0));
    }

    #[test]
    fn unverified_stamp_is_amber_with_cross() {
        let r = result(
            detection(DetectionStatus::Present, Some([50.0, 100.0, 200.0, 150.0])),
            detection(DetectionStatus::Present, Some([300.0, 400.0, 120.0, 40.0])),
            StampValidation::N,
        );
        let boxes = overlay_boxes(&r);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].color, UNVERIFIED_STAMP_COLOR);
        assert_eq!(boxes[0].label, "Stamp ✖");
        assert_eq!(boxes[1].kind, OverlayKind::Signature);
        assert_eq!(boxes[1].color, SIGNATURE_COLOR);
        assert_eq!(boxes[1].label, "Signature");
        assert_eq!(boxes[1].label_rect.width(), 100.0);
    }

    #[test]
    fn skips_absent_or_unlocated_detections() {
        let r = result(
            detection(DetectionStatus::Absent, Some([1.0, 2.0, 3.0, 4.0])),
            detection(DetectionStatus::Present, None),
            StampValidation::Y,
        );
        assert!(overlay_boxes(&r).is_empty());
    }

    #[test]
    fn label_moves_inside_box_at_top_edge() {
        let r = result(
            detection(DetectionStatus::Absent, None),
            detection(DetectionStatus::Present, Some([10.0, 4.0, 150.0, 60.0])),
            StampValidation::N,
        );
        let boxes = overlay_boxes(&r);
        assert_eq!(boxes[0].label_rect.min, pos2(10.0, 4.0));
        assert_eq!(boxes[0].label_rect.max.y, 29.0);
    }

    #[test]
    fn maps_source_pixels_onto_scaled_preview() {
        let image_rect = Rect::from_min_size(pos2(20.0, 40.0), vec2(500.0, 250.0));
        let to_screen = source_to_screen(vec2(2000.0, 1000.0), image_rect);

        assert_eq!(to_screen.transform_pos(pos2(0.0, 0.0)), pos2(20.0, 40.0));
        assert_eq!(to_screen.transform_pos(pos2(400.0, 200.0)), pos2(120.0, 90.0));
        assert_eq!(to_screen.scale(), vec2(0.25, 0.25));
    }
}
