//! Venue display palette
//!
//! Assigns every venue a CSS colour for the calendar front end. Venues are
//! sorted, then dealt round-robin onto nine well-spaced hues. The first venue
//! on a hue gets the plain colour; later ones get a gradient towards a
//! neighbouring hue so they stay distinguishable.

use crate::records::CanonicalEventRecord;
use std::collections::{BTreeMap, BTreeSet};

const HUES: [u16; 9] = [0, 20, 45, 75, 110, 160, 200, 245, 290];
const SATURATION: u8 = 80;
const LIGHTNESS: u8 = 52;
const ANALOGOUS_SHIFT: u16 = 45;

fn hsl(hue: u16) -> String {
    format!("hsl({}, {}%, {}%)", hue, SATURATION, LIGHTNESS)
}

fn gradient(hue: u16, target: u16) -> String {
    format!(
        "linear-gradient(to right, {} 0%, {} 50%, {} 100%)",
        hsl(hue),
        hsl(hue),
        hsl(target)
    )
}

/// Builds the venue → CSS colour mapping
///
/// The result depends only on the set of (non-blank) venues, so reruns over
/// the same data produce the same palette.
pub fn venue_palette(records: &[CanonicalEventRecord]) -> BTreeMap<String, String> {
    let venues: BTreeSet<&str> = records
        .iter()
        .map(|record| record.venue.as_str())
        .filter(|venue| !venue.trim().is_empty())
        .collect();

    venues
        .into_iter()
        .enumerate()
        .map(|(i, venue)| {
            let hue = HUES[i % HUES.len()];
            let colour = match i / HUES.len() {
                0 => hsl(hue),
                1 => gradient(hue, (hue + 360 - ANALOGOUS_SHIFT) % 360),
                _ => gradient(hue, (hue + ANALOGOUS_SHIFT) % 360),
            };
            (venue.to_string(), colour)
        })
        .collect()
}
