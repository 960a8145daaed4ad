//! Host-side hazard tracking and pass-break planning.
//!
//! wgpu inserts backend memory barriers at compute-pass and submission
//! boundaries, so the planning question is where those boundaries must go:
//! two dispatches may share one pass only if neither reads nor overwrites a
//! buffer the other wrote inside that pass. The planner walks the ordered
//! per-frame op list, tracks reads and the last writer per physical buffer,
//! and emits the minimal set of pass breaks. The visualization composite
//! additionally forces a break, which is also where the compute-to-render
//! handoff on the display buffer lands.

use smallvec::SmallVec;

use crate::binding::{Binding, BindingSet};
use crate::field::FieldId;
use crate::schedule::Slot;

/// Identity of one physical device buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKey {
    /// One half of a double-buffered field.
    Field(FieldId, Slot),
    /// The single-buffered display composite.
    Display,
}

/// Declared accesses of one op in the per-frame sequence.
#[derive(Clone, Debug)]
pub struct OpAccess {
    /// Diagnostic label
    pub label: &'static str,
    /// Buffers read
    pub reads: SmallVec<[BufferKey; 8]>,
    /// Buffers written
    pub writes: SmallVec<[BufferKey; 4]>,
    /// Force a pass break before this op regardless of hazards
    pub force_break: bool,
}

impl OpAccess {
    /// Resolve a stage's binding set against the current slot into
    /// physical buffer accesses.
    pub fn for_stage(
        label: &'static str,
        binding: &BindingSet,
        current: Slot,
        force_break: bool,
    ) -> Self {
        let mut reads = SmallVec::new();
        let mut writes = SmallVec::new();
        for b in binding.entries() {
            match b {
                Binding::ReadCurrent(f) => reads.push(BufferKey::Field(*f, current)),
                Binding::WriteNext(f) => {
                    writes.push(BufferKey::Field(*f, current.other()))
                }
                Binding::WriteDisplay => writes.push(BufferKey::Display),
            }
        }
        Self { label, reads, writes, force_break }
    }
}

/// Where compute-pass boundaries go: `breaks[i]` means op `i` starts a new
/// pass. `breaks[0]` is always true.
#[derive(Clone, Debug)]
pub struct BarrierPlan {
    breaks: Vec<bool>,
}

impl BarrierPlan {
    /// Plan pass boundaries for an ordered op list.
    pub fn plan(ops: &[OpAccess]) -> Self {
        let mut breaks = vec![false; ops.len()];
        let mut written: Vec<BufferKey> = Vec::new();
        let mut read: Vec<BufferKey> = Vec::new();
        for (i, op) in ops.iter().enumerate() {
            let raw = op.reads.iter().any(|k| written.contains(k));
            let waw = op.writes.iter().any(|k| written.contains(k));
            let war = op.writes.iter().any(|k| read.contains(k));
            if i == 0 || op.force_break || raw || waw || war {
                breaks[i] = true;
                written.clear();
                read.clear();
            }
            written.extend(op.writes.iter().copied());
            read.extend(op.reads.iter().copied());
        }
        Self { breaks }
    }

    /// Whether op `i` must open a new compute pass.
    pub fn is_break(&self, i: usize) -> bool {
        self.breaks.get(i).copied().unwrap_or(true)
    }

    /// Number of passes the plan produces.
    pub fn pass_count(&self) -> usize {
        self.breaks.iter().filter(|b| **b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(
        label: &'static str,
        reads: &[BufferKey],
        writes: &[BufferKey],
        force_break: bool,
    ) -> OpAccess {
        OpAccess {
            label,
            reads: reads.iter().copied().collect(),
            writes: writes.iter().copied().collect(),
            force_break,
        }
    }

    const EA: BufferKey = BufferKey::Field(FieldId::Elevation, Slot::A);
    const EB: BufferKey = BufferKey::Field(FieldId::Elevation, Slot::B);
    const TA: BufferKey = BufferKey::Field(FieldId::Temperature, Slot::A);
    const TB: BufferKey = BufferKey::Field(FieldId::Temperature, Slot::B);

    #[test]
    fn independent_ops_share_one_pass() {
        let ops = [
            op("erosion", &[EA], &[EB], false),
            op("climate", &[TA, EA], &[TB], false),
        ];
        let plan = BarrierPlan::plan(&ops);
        assert_eq!(plan.pass_count(), 1);
    }

    #[test]
    fn raw_hazard_breaks_the_pass() {
        let ops = [
            op("erosion", &[EA], &[EB], false),
            op("reader", &[EB], &[TB], false),
        ];
        let plan = BarrierPlan::plan(&ops);
        assert!(plan.is_break(1));
        assert_eq!(plan.pass_count(), 2);
    }

    #[test]
    fn waw_and_war_hazards_break_the_pass() {
        let waw = [
            op("w1", &[], &[EB], false),
            op("w2", &[], &[EB], false),
        ];
        assert!(BarrierPlan::plan(&waw).is_break(1));
        let war = [
            op("reader", &[EA], &[TB], false),
            op("writer", &[], &[EA], false),
        ];
        assert!(BarrierPlan::plan(&war).is_break(1));
    }

    #[test]
    fn forced_break_applies_without_hazard() {
        let ops = [
            op("erosion", &[EA], &[EB], false),
            op("viz", &[TA], &[BufferKey::Display], true),
        ];
        let plan = BarrierPlan::plan(&ops);
        assert_eq!(plan.pass_count(), 2);
    }

    #[test]
    fn stage_resolution_maps_roles_to_slots() {
        let set = BindingSet::new()
            .read(FieldId::Elevation)
            .write(FieldId::Elevation);
        let acc = OpAccess::for_stage("erosion", &set, Slot::A, false);
        assert_eq!(acc.reads.as_slice(), &[EA]);
        assert_eq!(acc.writes.as_slice(), &[EB]);
        let acc = OpAccess::for_stage("erosion", &set, Slot::B, false);
        assert_eq!(acc.reads.as_slice(), &[EB]);
        assert_eq!(acc.writes.as_slice(), &[EA]);
    }
}
