/// Accepted-listing counter for one query or category.
///
/// `accepted` never exceeds `hard_cap`. Construct a fresh tracker per
/// resolution; nothing carries over between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaTracker {
    accepted: usize,
    target: usize,
    hard_cap: usize,
}

impl QuotaTracker {
    /// `hard_cap` is raised to `target` if it was set lower.
    #[must_use]
    pub fn new(target: usize, hard_cap: usize) -> Self {
        Self {
            accepted: 0,
            target,
            hard_cap: hard_cap.max(target),
        }
    }

    /// Records up to `n` accepted listings and returns how many fit under the cap.
    pub fn accept(&mut self, n: usize) -> usize {
        let taken = n.min(self.remaining_capacity());
        self.accepted += taken;
        taken
    }

    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[must_use]
    pub fn hard_cap(&self) -> usize {
        self.hard_cap
    }

    /// `max(0, target - accepted)`.
    #[must_use]
    pub fn deficit(&self) -> usize {
        self.target.saturating_sub(self.accepted)
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.accepted >= self.target
    }

    /// Room left before the hard cap.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.hard_cap.saturating_sub(self.accepted)
    }
}
