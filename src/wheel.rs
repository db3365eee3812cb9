//! Outcome selection and rotation math for the wheel.
//!
//! Angles use screen convention: degrees clockwise from the positive x-axis,
//! and a positive wheel rotation turns the wheel clockwise. Number 1 sits at
//! `SLOT_ZERO_ANGLE_DEG`, the pointer is fixed at the top of the circle.

use crate::config::WheelConfig;
use crate::entropy::SlotSource;
use crate::spin::SpinState;

pub const FULL_TURN_DEG: f64 = 360.0;
pub const POINTER_ANGLE_DEG: f64 = 270.0;
pub const SLOT_ZERO_ANGLE_DEG: f64 = 0.0;

/// Every n-th spin lands on the predestined number.
pub const PREDESTINED_EVERY: u32 = 3;

pub fn is_predestined_spin(spin_index: u32) -> bool {
    spin_index % PREDESTINED_EVERY == 0
}

/// Picks the number the next spin lands on.
///
/// Predestined spins ignore the source entirely. Other spins redraw until
/// the result differs from the last selected number.
pub fn select_target<S: SlotSource + ?Sized>(
    state: &SpinState,
    config: &WheelConfig,
    source: &mut S,
) -> u32 {
    if is_predestined_spin(state.spin_count + 1) {
        return config.predestined_number;
    }
    loop {
        let candidate = source.draw(config.total_slots);
        if state.last_selected_number != Some(candidate) {
            return candidate;
        }
    }
}

pub fn slot_width(config: &WheelConfig) -> f64 {
    FULL_TURN_DEG / config.total_slots as f64
}

/// Angle of the slot centre for `number` on the unrotated wheel.
pub fn slot_angle(number: u32, config: &WheelConfig) -> f64 {
    SLOT_ZERO_ANGLE_DEG + slot_width(config) * (number - 1) as f64
}

/// Wheel orientation in `[0, 360)` that puts `number` under the pointer.
pub fn resting_angle(number: u32, config: &WheelConfig) -> f64 {
    normalize(POINTER_ANGLE_DEG - slot_angle(number, config))
}

/// Cumulative rotation after spinning forward onto `target_number`.
///
/// Always adds the forward alignment delta plus `min_full_rotations` whole
/// turns, however large the delta already is.
pub fn compute_target_rotation(
    current_rotation_degrees: f64,
    target_number: u32,
    config: &WheelConfig,
) -> f64 {
    let aligned = resting_angle(target_number, config);
    let d0 = normalize(aligned - normalize(current_rotation_degrees));
    current_rotation_degrees + d0 + config.min_full_rotations as f64 * FULL_TURN_DEG
}

/// Number whose slot centre is closest to the pointer at `rotation_degrees`.
pub fn number_under_pointer(rotation_degrees: f64, config: &WheelConfig) -> u32 {
    let on_wheel = normalize(POINTER_ANGLE_DEG - rotation_degrees - SLOT_ZERO_ANGLE_DEG);
    let index = (on_wheel / slot_width(config)).round() as u32 % config.total_slots;
    index + 1
}

/// Maps any angle into `[0, 360)`.
pub fn normalize(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_TURN_DEG);
    // rem_euclid rounds up to the modulus for tiny negative inputs
    if wrapped >= FULL_TURN_DEG {
        0.0
    } else {
        wrapped
    }
}
