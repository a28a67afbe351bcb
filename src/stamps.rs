/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Registered official stamp texts.
//! The analysis service validates against this registry; the app only lists it.

pub const OFFICIAL_STAMPS: &[&str] = &[
    "OFFICER COMMANDING 14th BN A.P.S.P. ANANTHAPURAMU",
    "STATE OFFICER TO ADGP APSP HEAD OFFICE MANGALAGIRI",
    "Inspector General of Police APSP Bns, Amaravathi",
    "Dy. Inspector General of Police-IV APSP Battalions, Mangalagiri",
    "Sd/- B. Sreenivasulu, IPS., Addl. Commissioner of Police, Vijayawada City",
    "Dr. SHANKHABRATA BAGCHI IPS., Addl. Director General of Police, APSP Battalions",
];

/// Whether a matched stamp type reported by the service is a registered one.
pub fn is_registered(matched: &str) -> bool {
    let matched = matched.trim();
    OFFICIAL_STAMPS
        .iter()
        .any(|stamp| stamp.eq_ignore_ascii_case(matched))
}
