/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Analysis results panel: detection table, validation and summary

use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::model::{AnalysisResult, Detection, Verdict};
use crate::overlay;
use crate::stamps;

const GOOD: Color32 = Color32::from_rgb(100, 200, 100);
const BAD: Color32 = Color32::from_rgb(255, 100, 100);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

fn status_mark(ok: bool) -> RichText {
    if ok {
        RichText::new("✔").color(GOOD)
    } else {
        RichText::new("✖").color(BAD)
    }
}

pub fn render_results(ui: &mut Ui, result: &AnalysisResult) {
    ui.strong("Detection");
    ui.add_space(2.0);
    render_detection_table(ui, result);

    ui.add_space(8.0);
    ui.separator();
    ui.strong("Stamp Validation");
    ui.add_space(2.0);

    let valid = result.stamp_validation.is_valid();
    ui.horizontal(|ui| {
        ui.label(status_mark(valid));
        ui.label(
            RichText::new(format!("Valid: {}", result.stamp_validation))
                .color(if valid { GOOD } else { BAD })
                .strong(),
        );
    });
    if let Some(matched) = &result.matched_stamp_type {
        ui.label(RichText::new(format!("Matched: {}", matched)).color(GOOD));
        if !stamps::is_registered(matched) {
            ui.colored_label(MUTED, "(not in the local registry copy)");
        }
    }
    if !valid {
        ui.colored_label(BAD, "No match found in master list");
    }

    ui.add_space(8.0);
    ui.separator();
    render_summary(ui, result);

    ui.add_space(8.0);
    ui.collapsing("Registered official stamps", |ui| {
        for stamp in stamps::OFFICIAL_STAMPS {
            let highlighted = result.matched_stamp_type.as_deref() == Some(*stamp);
            let text = RichText::new(format!("• {}", stamp)).small();
            ui.label(if highlighted { text.color(GOOD).strong() } else { text });
        }
    });
}

fn render_detection_table(ui: &mut Ui, result: &AnalysisResult) {
    let rows: [(&str, &Detection, Color32); 2] = [
        (
            "Stamp",
            &result.stamp,
            overlay::stamp_color(result.stamp_validation.is_valid()),
        ),
        ("Signature", &result.signature, overlay::SIGNATURE_COLOR),
    ];

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(80.0)) // kind
        .column(Column::exact(80.0)) // status
        .column(Column::remainder()) // coordinates
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Detection");
            });
            header.col(|ui| {
                ui.strong("Status");
            });
            header.col(|ui| {
                ui.strong("Coordinates");
            });
        })
        .body(|mut body| {
            for (name, detection, color) in rows {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(name).color(color));
                    });
                    row.col(|ui| {
                        ui.label(status_mark(detection.is_present()));
                        ui.label(detection.status.to_string());
                    });
                    row.col(|ui| match &detection.coordinates {
                        Some(bbox) => {
                            ui.monospace(bbox.to_string());
                        }
                        None => {
                            ui.colored_label(MUTED, "-");
                        }
                    });
                });
            }
        });
}

fn render_summary(ui: &mut Ui, result: &AnalysisResult) {
    ui.strong("Validation Summary");
    ui.add_space(2.0);
    ui.label(format!("• Stamp: {}", result.stamp.status));
    ui.label(format!("• Signature: {}", result.signature.status));
    ui.label(format!(
        "• Official Stamp Validation: {}",
        result.stamp_validation
    ));
    if let Some(matched) = &result.matched_stamp_type {
        ui.label(format!("• Matched Stamp Type: {}", matched));
    }

    let verdict = result.verdict();
    let color = match verdict {
        Verdict::Verified => GOOD,
        Verdict::NeedsReview => overlay::UNVERIFIED_STAMP_COLOR,
    };
    ui.add_space(4.0);
    ui.label(RichText::new(verdict.sentence()).color(color).small());
}
