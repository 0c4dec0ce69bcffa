//! Three-slot role rotation
//!
//! The stencil reads two time levels (`t`, `t-1`) and writes a third
//! (`t+1`), so a plain ping-pong swap is not enough. Executors keep three
//! physical buffers in fixed slots `0..3`; a `RoleRing` says which slot plays
//! which role. Advancing the ring relabels the slots:
//!
//! ```text
//! next     -> current
//! current  -> previous
//! previous -> next      (its t-1 data is dead and becomes scratch)
//! ```
//!
//! No field data moves. The ring cycles with period 3, so an executor can
//! precompute one binding per phase.

/// Slot indices for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Roles {
    /// Slot holding `t`
    pub current: usize,
    /// Slot holding `t-1`
    pub previous: usize,
    /// Slot receiving `t+1`
    pub next: usize,
}

impl Roles {
    /// Rotation phase `0..3`, identical to the `current` slot
    #[must_use]
    pub fn phase(&self) -> usize {
        self.current
    }
}

/// Which physical slot currently plays which role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleRing {
    current: usize,
}

impl RoleRing {
    /// Number of slots in the ring
    pub const SLOTS: usize = 3;

    /// Initial assignment: slot 0 current, slot 1 previous, slot 2 next
    #[must_use]
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Slot indices for the current phase
    #[must_use]
    pub fn roles(&self) -> Roles {
        Self::roles_for_phase(self.current)
    }

    /// Slot indices a ring in `phase` would report
    #[must_use]
    pub fn roles_for_phase(phase: usize) -> Roles {
        let current = phase % Self::SLOTS;
        Roles {
            current,
            previous: (current + 1) % Self::SLOTS,
            next: (current + 2) % Self::SLOTS,
        }
    }

    /// Relabel the slots after a completed step
    pub fn advance(&mut self) {
        self.current = self.roles().next;
    }
}

/// Borrow the three slots as `(current, previous, next)`
///
/// The two read roles come back shared and the write role exclusive, so the
/// borrow checker enforces the read/write split of a step.
///
/// # Panics
///
/// Panics if `roles` does not name three distinct slots.
pub fn split_roles<T>(slots: &mut [T; 3], roles: Roles) -> (&T, &T, &mut T) {
    let [a, b, c] = slots;
    match (roles.current, roles.previous, roles.next) {
        (0, 1, 2) => (&*a, &*b, c),
        (1, 2, 0) => (&*b, &*c, a),
        (2, 0, 1) => (&*c, &*a, b),
        (0, 2, 1) => (&*a, &*c, b),
        (1, 0, 2) => (&*b, &*a, c),
        (2, 1, 0) => (&*c, &*b, a),
        other => panic!("invalid role assignment {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_roles() {
        let ring = RoleRing::new();
        assert_eq!(
            ring.roles(),
            Roles {
                current: 0,
                previous: 1,
                next: 2
            }
        );
    }

    #[test]
    fn test_advance_relabels_three_ways() {
        let mut ring = RoleRing::new();
        let before = ring.roles();
        ring.advance();
        let after = ring.roles();

        assert_eq!(after.current, before.next);
        assert_eq!(after.previous, before.current);
        assert_eq!(after.next, before.previous);
    }

    #[test]
    fn test_period_three() {
        let mut ring = RoleRing::new();
        let start = ring.roles();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(ring.roles().phase());
            ring.advance();
        }
        assert_eq!(ring.roles(), start);
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_roles_for_phase_agrees_with_ring() {
        let mut ring = RoleRing::new();
        for _ in 0..6 {
            let roles = ring.roles();
            assert_eq!(RoleRing::roles_for_phase(roles.phase()), roles);
            ring.advance();
        }
    }

    #[test]
    fn test_split_roles_follows_ring() {
        let mut slots = [10, 20, 30];
        let mut ring = RoleRing::new();

        let (current, previous, next) = split_roles(&mut slots, ring.roles());
        assert_eq!((*current, *previous, *next), (10, 20, 30));
        *next = 31;

        ring.advance();
        let (current, previous, next) = split_roles(&mut slots, ring.roles());
        assert_eq!((*current, *previous, *next), (31, 10, 20));
    }

    #[test]
    #[should_panic(expected = "invalid role assignment")]
    fn test_split_roles_rejects_aliasing() {
        let mut slots = [0, 0, 0];
        let _ = split_roles(
            &mut slots,
            Roles {
                current: 1,
                previous: 1,
                next: 2,
            },
        );
    }
}
