//! Ping-pong scheduling for the double-buffered field store.
//!
//! A single parity bit plus one shared tick counter covers every field: a
//! consumer that observes the settled assignment sees all fields from the
//! same generation. `begin_tick` hands out a role assignment without
//! mutating anything; the flip happens only in `commit`, so an aborted tick
//! leaves the previously settled generation fully intact.

/// One of the two physical buffer slots backing each field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// First physical half
    A,
    /// Second physical half
    B,
}

impl Slot {
    /// Index into a two-element buffer array.
    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    /// The opposite slot.
    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// A read/write role mapping for one tick. The same assignment applies to
/// every field, which is what keeps the coupled fields mutually consistent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleAssignment {
    current: Slot,
    tick: u64,
}

impl RoleAssignment {
    /// Slot holding the settled values every stage reads this tick.
    pub fn current(&self) -> Slot {
        self.current
    }

    /// Slot every enabled stage writes this tick.
    pub fn next(&self) -> Slot {
        self.current.other()
    }

    /// Tick this assignment was issued for.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

/// Parity-bit scheduler with a shared tick counter.
#[derive(Debug)]
pub struct PingPongSchedule {
    current: Slot,
    tick: u64,
}

impl Default for PingPongSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl PingPongSchedule {
    /// A fresh schedule at tick 0 with slot A settled.
    pub fn new() -> Self {
        Self { current: Slot::A, tick: 0 }
    }

    /// Assignment for the tick about to be encoded. Does not mutate state.
    pub fn begin_tick(&self) -> RoleAssignment {
        RoleAssignment { current: self.current, tick: self.tick }
    }

    /// The settled assignment consumers should read from.
    pub fn settled(&self) -> RoleAssignment {
        RoleAssignment { current: self.current, tick: self.tick }
    }

    /// Commit a completed tick: flip parity and advance the counter for all
    /// fields at once.
    pub fn commit(&mut self, assignment: RoleAssignment) {
        debug_assert_eq!(assignment.tick, self.tick, "commit for a stale tick");
        self.current = self.current.other();
        self.tick += 1;
    }

    /// Abort a tick: the settled generation stays exactly as it was.
    pub fn abort(&mut self, _assignment: RoleAssignment) {}

    /// Reset to tick 0 with slot A settled (reseed path).
    pub fn reset(&mut self) {
        self.current = Slot::A;
        self.tick = 0;
    }

    /// Ticks committed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_alternates_roles() {
        let mut s = PingPongSchedule::new();
        for _ in 0..5 {
            let a = s.begin_tick();
            s.commit(a);
            let b = s.begin_tick();
            assert_eq!(b.current(), a.next());
            assert_eq!(b.next(), a.current());
            s.commit(b);
        }
        assert_eq!(s.tick(), 10);
    }

    #[test]
    fn abort_preserves_assignment() {
        let mut s = PingPongSchedule::new();
        let a = s.begin_tick();
        s.abort(a);
        assert_eq!(s.begin_tick(), a);
        assert_eq!(s.tick(), 0);
    }

    #[test]
    fn reset_returns_to_origin() {
        let mut s = PingPongSchedule::new();
        let a = s.begin_tick();
        s.commit(a);
        s.reset();
        assert_eq!(s.tick(), 0);
        assert_eq!(s.settled().current(), Slot::A);
    }
}
