use std::time::Duration;

use crate::config::WheelConfig;
use crate::spin::{PendingSpin, SpinState};
use crate::wheel;

pub const PALETTE: [&str; 7] = [
    "red", "orange", "yellow", "green", "blue", "indigo", "violet",
];

pub fn slot_colour(number: u32) -> &'static str {
    PALETTE[(number.saturating_sub(1) as usize) % PALETTE.len()]
}

/// Cubic ease-out on `t` clamped to `[0, 1]`.
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Wheel angle `elapsed` into the animation of `pending`.
pub fn animated_rotation(pending: &PendingSpin, elapsed: Duration) -> f64 {
    let t = elapsed.as_secs_f64() / pending.duration.as_secs_f64();
    pending.from_degrees + (pending.to_degrees - pending.from_degrees) * ease_out(t)
}

pub fn spinning_frame(pending: &PendingSpin, elapsed: Duration, config: &WheelConfig) -> String {
    let angle = animated_rotation(pending, elapsed);
    let passing = wheel::number_under_pointer(angle, config);
    format!("  ... {:>10.2}° passing {:>2} ({})", angle, passing, slot_colour(passing))
}

/// True once the latest spin was a predestined one.
fn on_predestined_spin(state: &SpinState) -> bool {
    state.spin_count > 0 && wheel::is_predestined_spin(state.spin_count)
}

pub fn landed(number: u32, state: &SpinState) -> String {
    let mut out = format!("🎉 Selected: {} ({})", number, slot_colour(number));
    if on_predestined_spin(state) {
        out.push_str("\n✨ Lucky spin!");
    }
    out
}

pub fn status(state: &SpinState, config: &WheelConfig) -> String {
    let selected = match state.last_selected_number {
        Some(n) => format!("{} ({})", n, slot_colour(n)),
        None => "-".to_string(),
    };
    format!(
        "Spin Count: {}{} | Selected: {} | Rotation: {:.2}° | {} | Predestined: {} of 1..={}",
        state.spin_count,
        if on_predestined_spin(state) { " (Predestined spin)" } else { "" },
        selected,
        state.current_rotation_degrees,
        if state.is_spinning { "spinning" } else { "idle" },
        config.predestined_number,
        config.total_slots
    )
}
