/// Hard cap on descriptors in one resource set, one dirty bit per slot
pub const MAX_DESCRIPTORS_PER_SET: usize = 64;

/// One bit per descriptor slot. Bits are visited lowest-first so batched writes come
/// out in slot order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DirtyMask(u64);

impl DirtyMask {
    pub fn mark(
        &mut self,
        slot: usize,
    ) {
        debug_assert!(slot < MAX_DESCRIPTORS_PER_SET);
        self.0 |= 1 << slot;
    }

    pub fn is_marked(
        &self,
        slot: usize,
    ) -> bool {
        debug_assert!(slot < MAX_DESCRIPTORS_PER_SET);
        self.0 & (1 << slot) != 0
    }

    pub fn any(&self) -> bool {
        self.0 != 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates the set slots in ascending order. The mask keeps its bits, callers
    /// decide when the slots stop being dirty via `clear`.
    pub fn iter(&self) -> DirtyMaskIter {
        DirtyMaskIter(self.0)
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

pub(crate) struct DirtyMaskIter(u64);

impl Iterator for DirtyMaskIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }

        let slot = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(slot)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn iter_visits_slots_in_ascending_order() {
        let mut mask = DirtyMask::default();
        mask.mark(63);
        mask.mark(0);
        mask.mark(17);
        mask.mark(17);

        assert_eq!(mask.count(), 3);
        let slots: Vec<_> = mask.iter().collect();
        assert_eq!(slots, vec![0, 17, 63]);
    }

    #[test]
    fn marks_survive_iteration_until_cleared() {
        let mut mask = DirtyMask::default();
        mask.mark(2);
        mask.mark(40);

        // Building a write batch must not consume the marks, a failed flush leaves
        // them in place for the next update
        let first: Vec<_> = mask.iter().collect();
        let second: Vec<_> = mask.iter().collect();
        assert_eq!(first, second);
        assert!(mask.any());
        assert_eq!(mask.count(), 2);

        mask.clear();
        assert!(!mask.any());
        assert_eq!(mask.iter().count(), 0);
    }

    #[test]
    fn marks_are_idempotent() {
        let mut mask = DirtyMask::default();
        mask.mark(5);
        mask.mark(5);
        assert_eq!(mask.count(), 1);
        assert!(mask.is_marked(5));
        assert!(!mask.is_marked(4));
    }
}
