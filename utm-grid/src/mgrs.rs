//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! MGRS grid zone designator and 100 km square letters

use crate::math::ang_normalize;

/// Latin alphabet without I and O
const MGRS_LETTERS: &[u8; 24] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Row letters cycle through the first 20 letters
const ROW_LETTERS: i64 = 20;

/// UTM zone number (1..=60) of a longitude in degrees.
pub fn zone_number(lon: f64) -> i64 {
    ((ang_normalize(lon) + 180.0) / 6.0).floor() as i64 + 1
}

/// Latitude band letter of a latitude in degrees.
pub fn band_letter(lat: f64) -> char {
    let idx = (lat / 8.0 + 12.0).floor() as i64;
    letter(idx.max(0).min(MGRS_LETTERS.len() as i64 - 1))
}

fn letter(idx: i64) -> char {
    MGRS_LETTERS[idx as usize] as char
}

/// Grid zone designator with 100 km square, e.g. `15T WL`.
///
/// `easting`/`northing` are projected coordinates including false offsets.
/// Legacy (NAD27-class) sheets letter their rows with an extra offset of 10.
pub fn grid_zone_designator(
    lon: f64,
    lat: f64,
    easting: f64,
    northing: f64,
    legacy_datum: bool,
) -> String {
    let zone = zone_number(lon);
    let set = (zone - 1).rem_euclid(6);

    let col_idx = (easting / 1e5).floor() as i64 - 1;
    let column = letter((8 * set + col_idx).rem_euclid(MGRS_LETTERS.len() as i64));

    let mut row_offset = if set & 1 == 1 { 5 } else { 0 };
    if legacy_datum {
        row_offset += 10;
    }
    let row_idx = (northing / 1e5).floor() as i64 + row_offset;
    let row = letter(row_idx.rem_euclid(ROW_LETTERS));

    format!("{}{} {}{}", zone, band_letter(lat), column, row)
}

/// Grid coordinate with the 100 km digits in parentheses, e.g. `(50)94123`.
pub fn format_grid_coordinate(v: f64) -> String {
    let units = v.floor() as i64;
    format!(
        "({}){:05}",
        (v / 1e5).floor() as i64,
        units.rem_euclid(100_000)
    )
}
