use crate::KilnResourceState;
use std::sync::atomic::{AtomicU32, Ordering};

/// Tracked resource state, stored on the resource itself so every context sees the same
/// value. Plain load/store, barriers are recorded by a single context at a time.
#[derive(Debug)]
pub(crate) struct ResourceStateCell(AtomicU32);

impl ResourceStateCell {
    pub fn new(state: KilnResourceState) -> Self {
        ResourceStateCell(AtomicU32::new(state.bits()))
    }

    pub fn load(&self) -> KilnResourceState {
        KilnResourceState::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    pub fn store(
        &self,
        state: KilnResourceState,
    ) {
        self.0.store(state.bits(), Ordering::Release);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn store_then_load_round_trips() {
        let cell = ResourceStateCell::new(KilnResourceState::UNDEFINED);
        assert_eq!(cell.load(), KilnResourceState::UNDEFINED);
        cell.store(KilnResourceState::RENDER_TARGET);
        assert_eq!(cell.load(), KilnResourceState::RENDER_TARGET);
        cell.store(KilnResourceState::TRANSITIONING);
        assert!(cell.load().intersects(KilnResourceState::TRANSITIONING));
    }
}
