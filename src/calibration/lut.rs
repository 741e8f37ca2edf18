//! Offset target table.
//!
//! Empirical temperature rise (°C) that full-power heating must achieve
//! before the residual humidity reading is trusted as the sensor's offset
//! error.  Rows are 5 %RH bins starting at 10 %RH, columns 5 °C bins
//! starting at 15 °C.  Bins are half-open on the low end and out-of-range
//! inputs clamp to the nearest edge bin.

const HUMIDITY_ROWS: usize = 8;
const TEMPERATURE_COLS: usize = 4;

const HUMIDITY_BASE_PCT: f32 = 10.0;
const TEMPERATURE_BASE_C: f32 = 15.0;
const BIN_WIDTH: f32 = 5.0;

#[rustfmt::skip]
const TARGET_RISE_C: [[f32; TEMPERATURE_COLS]; HUMIDITY_ROWS] = [
    //  15°C   20°C   25°C   30°C
    [32.99, 30.94, 31.78, 31.92], // 10 %RH
    [36.36, 34.06, 36.43, 37.85], // 15 %RH
    [40.33, 38.16, 41.44, 43.37], // 20 %RH
    [44.13, 42.31, 45.45, 46.89], // 25 %RH
    [47.14, 45.81, 48.01, 48.39], // 30 %RH
    [49.34, 48.52, 49.26, 48.99], // 35 %RH
    [50.29, 49.79, 49.83, 49.06], // 40 %RH
    [50.79, 50.34, 49.89, 49.06], // 45 %RH
];

/// `floor((value - base) / width)` clamped to `[0, count - 1]`.
/// NaN lands in bin 0.
fn bucket(value: f32, base: f32, count: usize) -> usize {
    let idx = ((value - base) / BIN_WIDTH).floor();
    if idx.is_nan() || idx <= 0.0 {
        0
    } else {
        (idx as usize).min(count - 1)
    }
}

/// Humidity row for an initial reading.
pub fn humidity_row(humidity_pct: f32) -> usize {
    bucket(humidity_pct, HUMIDITY_BASE_PCT, HUMIDITY_ROWS)
}

/// Temperature column for an initial reading.
pub fn temperature_col(temperature_c: f32) -> usize {
    bucket(temperature_c, TEMPERATURE_BASE_C, TEMPERATURE_COLS)
}

/// Target temperature rise for an initial reading.
pub fn target_rise(humidity_pct: f32, temperature_c: f32) -> f32 {
    TARGET_RISE_C[humidity_row(humidity_pct)][temperature_col(temperature_c)]
}
