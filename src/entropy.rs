use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform slot draws. Injected so tests can script outcomes.
pub trait SlotSource {
    /// Draws a number uniformly from `1..=total_slots`.
    fn draw(&mut self, total_slots: u32) -> u32;
}

pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SlotSource for RngSource<R> {
    fn draw(&mut self, total_slots: u32) -> u32 {
        self.rng.gen_range(1..=total_slots)
    }
}

/// Replays a fixed list of draws, then panics.
#[cfg(test)]
pub struct ScriptedSource {
    draws: std::collections::VecDeque<u32>,
    pub calls: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(draws: &[u32]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            calls: 0,
        }
    }
}

#[cfg(test)]
impl SlotSource for ScriptedSource {
    fn draw(&mut self, _total_slots: u32) -> u32 {
        self.calls += 1;
        self.draws.pop_front().expect("scripted source exhausted")
    }
}
