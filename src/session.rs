use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::WheelConfig;
use crate::entropy::SlotSource;
use crate::error::WheelError;
use crate::spin::{self, PendingSpin, SpinState};

/// Completion timer for the spin in flight. The spin guard keeps a second
/// timer from ever being scheduled while this one is pending.
struct ScheduledCompletion {
    spin: PendingSpin,
    /// Set by the timer task once the full duration has elapsed.
    fired: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ScheduledCompletion {
    fn has_fired_for(&self, spin_index: u32) -> bool {
        self.spin.spin_index == spin_index && self.fired.load(Ordering::Acquire)
    }
}

/// Owns the wheel's mutable state for one session.
///
/// Completion events arrive on the receiver returned by [`Session::new`]
/// and must be fed back through [`Session::complete`] by the caller.
pub struct Session<S> {
    config: WheelConfig,
    state: SpinState,
    source: S,
    scheduled: Option<ScheduledCompletion>,
    completions: mpsc::UnboundedSender<PendingSpin>,
}

impl<S: SlotSource> Session<S> {
    pub fn new(
        config: WheelConfig,
        source: S,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PendingSpin>), WheelError> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            config,
            state: SpinState::default(),
            source,
            scheduled: None,
            completions: tx,
        };
        Ok((session, rx))
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn state(&self) -> &SpinState {
        &self.state
    }

    /// Starts a spin and schedules its completion after the configured
    /// duration. Returns `None` if a spin is already in flight.
    pub fn spin(&mut self) -> Option<PendingSpin> {
        let Some((next, pending)) = spin::begin_spin(&self.state, &self.config, &mut self.source)
        else {
            debug!("spin ignored, wheel is still spinning");
            return None;
        };
        self.state = next;

        let tx = self.completions.clone();
        let fired = Arc::new(AtomicBool::new(false));
        let timer_fired = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(pending.duration).await;
            timer_fired.store(true, Ordering::Release);
            if tx.send(pending).is_err() {
                debug!("spin {} finished after its session closed", pending.spin_index);
            }
        });
        self.scheduled = Some(ScheduledCompletion {
            spin: pending,
            fired,
            handle,
        });

        info!(
            "spin {} started: target {} rotating {:.3} -> {:.3}{}",
            pending.spin_index,
            pending.target_number,
            pending.from_degrees,
            pending.to_degrees,
            if pending.predestined { " (predestined)" } else { "" }
        );
        Some(pending)
    }

    /// Applies a completion event and returns the selected number, or
    /// `None` for an event that does not belong to the spin in flight or
    /// arrives before that spin's timer has fired.
    pub fn complete(&mut self, pending: &PendingSpin) -> Option<u32> {
        let fired = self
            .scheduled
            .as_ref()
            .is_some_and(|s| s.has_fired_for(pending.spin_index));
        if !fired {
            debug!("ignoring completion for spin {} before its timer fired", pending.spin_index);
            return None;
        }
        let next = spin::complete_spin(&self.state, pending);
        if next.is_spinning || !self.state.is_spinning {
            debug!("ignoring stale completion for spin {}", pending.spin_index);
            return None;
        }
        self.state = next;
        self.scheduled = None;
        info!("spin {} landed on {}", pending.spin_index, pending.target_number);
        self.state.last_selected_number
    }

    pub fn reset(&mut self) -> Result<(), WheelError> {
        self.state = spin::reset(&self.state)?;
        info!("wheel reset");
        Ok(())
    }

    /// Changes the predestined number. Out-of-range values are rejected and
    /// the previous number stays in effect.
    pub fn set_predestined(&mut self, number: u32) -> Result<(), WheelError> {
        self.config = self.config.with_predestined(number)?;
        info!("predestined number set to {}", number);
        Ok(())
    }

    pub fn in_flight(&self) -> Option<&PendingSpin> {
        self.scheduled.as_ref().map(|s| &s.spin)
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedSource;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_double_spin_fires_one_completion() {
        let (mut session, mut rx) =
            Session::new(WheelConfig::default(), ScriptedSource::new(&[20, 21])).unwrap();

        let first = session.spin().unwrap();
        assert!(session.spin().is_none());
        assert_eq!(session.state().spin_count, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, first);
        assert_eq!(session.complete(&event), Some(20));
        assert_eq!(session.state().spin_count, 1);
        assert!(!session.state().is_spinning);
        assert!(session.in_flight().is_none());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_waits_full_duration() {
        let (mut session, mut rx) =
            Session::new(WheelConfig::default(), ScriptedSource::new(&[20])).unwrap();
        session.spin().unwrap();

        assert!(timeout(Duration::from_millis(4_999), rx.recv()).await.is_err());
        assert_eq!(session.state().last_selected_number, None);
        assert!(session.state().is_spinning);

        let event = timeout(Duration::from_millis(10), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.complete(&event), Some(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_spins_land_on_predestined() {
        let config = WheelConfig {
            total_slots: 70,
            predestined_number: 7,
            ..WheelConfig::default()
        };
        let (mut session, mut rx) = Session::new(config, ScriptedSource::new(&[40, 41])).unwrap();

        let mut landed = Vec::new();
        for _ in 0..3 {
            session.spin().unwrap();
            let event = rx.recv().await.unwrap();
            landed.push(session.complete(&event).unwrap());
        }
        assert_eq!(landed, vec![40, 41, 7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_rejected_while_spinning() {
        let (mut session, mut rx) =
            Session::new(WheelConfig::default(), ScriptedSource::new(&[20])).unwrap();
        session.spin().unwrap();
        assert_eq!(session.reset(), Err(WheelError::Spinning));
        assert_eq!(session.state().spin_count, 1);

        let event = rx.recv().await.unwrap();
        session.complete(&event);
        session.reset().unwrap();
        assert_eq!(session.state(), &SpinState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_completion_is_rejected() {
        let (mut session, mut rx) =
            Session::new(WheelConfig::default(), ScriptedSource::new(&[20, 21])).unwrap();
        let pending = session.spin().unwrap();

        assert_eq!(session.complete(&pending), None);
        assert!(session.state().is_spinning);
        assert_eq!(session.state().last_selected_number, None);
        assert!(session.spin().is_none());
        assert_eq!(session.state().spin_count, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.spin_index, 1);
        assert_eq!(session.complete(&event), Some(20));
        assert_eq!(session.complete(&event), None);

        let second = session.spin().unwrap();
        assert_eq!(second.spin_index, 2);
        assert_eq!(rx.recv().await.unwrap().spin_index, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WheelConfig {
            predestined_number: 71,
            ..WheelConfig::default()
        };
        assert!(matches!(
            Session::new(config, ScriptedSource::new(&[])),
            Err(WheelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_set_predestined_keeps_old_value_on_reject() {
        let (mut session, _rx) =
            Session::new(WheelConfig::default(), ScriptedSource::new(&[])).unwrap();
        assert!(session.set_predestined(71).is_err());
        assert_eq!(session.config().predestined_number, 7);
        session.set_predestined(42).unwrap();
        assert_eq!(session.config().predestined_number, 42);
    }
}
