//! Spin state machine. Transitions take the current state by reference and
//! return the next one; the session owns the only mutable copy.

use std::time::Duration;

use crate::config::WheelConfig;
use crate::entropy::SlotSource;
use crate::error::WheelError;
use crate::wheel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinPhase {
    Idle,
    Spinning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinState {
    pub spin_count: u32,
    /// Cumulative rotation, never wrapped back into one turn.
    pub current_rotation_degrees: f64,
    /// Set only when a spin's completion is applied.
    pub last_selected_number: Option<u32>,
    pub is_spinning: bool,
}

impl Default for SpinState {
    fn default() -> Self {
        Self {
            spin_count: 0,
            current_rotation_degrees: 0.0,
            last_selected_number: None,
            is_spinning: false,
        }
    }
}

impl SpinState {
    pub fn phase(&self) -> SpinPhase {
        if self.is_spinning {
            SpinPhase::Spinning
        } else {
            SpinPhase::Idle
        }
    }
}

/// A spin in flight, waiting for its completion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSpin {
    /// 1-based index of this spin within the session.
    pub spin_index: u32,
    pub target_number: u32,
    pub from_degrees: f64,
    pub to_degrees: f64,
    pub duration: Duration,
    pub predestined: bool,
}

/// Starts a spin. Returns `None` while another spin is in flight.
pub fn begin_spin<S: SlotSource + ?Sized>(
    state: &SpinState,
    config: &WheelConfig,
    source: &mut S,
) -> Option<(SpinState, PendingSpin)> {
    if state.is_spinning {
        return None;
    }

    let spin_index = state.spin_count + 1;
    let target_number = wheel::select_target(state, config, source);
    let to_degrees =
        wheel::compute_target_rotation(state.current_rotation_degrees, target_number, config);

    let pending = PendingSpin {
        spin_index,
        target_number,
        from_degrees: state.current_rotation_degrees,
        to_degrees,
        duration: Duration::from_millis(config.spin_duration_ms),
        predestined: wheel::is_predestined_spin(spin_index),
    };
    let next = SpinState {
        spin_count: spin_index,
        current_rotation_degrees: to_degrees,
        last_selected_number: state.last_selected_number,
        is_spinning: true,
    };
    Some((next, pending))
}

/// Applies a completion event. Events for any spin other than the one in
/// flight leave the state untouched.
pub fn complete_spin(state: &SpinState, pending: &PendingSpin) -> SpinState {
    if !state.is_spinning || pending.spin_index != state.spin_count {
        return state.clone();
    }
    SpinState {
        last_selected_number: Some(pending.target_number),
        is_spinning: false,
        ..state.clone()
    }
}

pub fn reset(state: &SpinState) -> Result<SpinState, WheelError> {
    match state.phase() {
        SpinPhase::Idle => Ok(SpinState::default()),
        SpinPhase::Spinning => Err(WheelError::Spinning),
    }
}
