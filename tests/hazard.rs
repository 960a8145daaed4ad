use vivaria::binding::BindingSet;
use vivaria::field::FieldId;
use vivaria::hazard::{BarrierPlan, OpAccess};
use vivaria::schedule::Slot;

fn erosion_set() -> BindingSet {
    BindingSet::new()
        .read(FieldId::Elevation)
        .read(FieldId::Biome)
        .write(FieldId::Elevation)
}

fn climate_set() -> BindingSet {
    BindingSet::new()
        .read(FieldId::Elevation)
        .read(FieldId::Temperature)
        .read(FieldId::Humidity)
        .write(FieldId::Temperature)
        .write(FieldId::Humidity)
}

fn biome_set() -> BindingSet {
    BindingSet::new()
        .read(FieldId::Elevation)
        .read(FieldId::Temperature)
        .read(FieldId::Humidity)
        .read(FieldId::Biome)
        .write(FieldId::Biome)
}

fn viz_set() -> BindingSet {
    BindingSet::new()
        .read(FieldId::Elevation)
        .read(FieldId::Temperature)
        .read(FieldId::Humidity)
        .read(FieldId::Biome)
        .write_display()
}

/// The full tick reads only settled halves, so all three simulation stages
/// fit in a single compute pass; the composite needs exactly one break.
#[test]
fn full_tick_needs_exactly_two_passes() {
    let cur = Slot::A;
    let ops = vec![
        OpAccess::for_stage("erosion", &erosion_set(), cur, false),
        OpAccess::for_stage("climate-diffusion", &climate_set(), cur, false),
        OpAccess::for_stage("biome-ca", &biome_set(), cur, false),
        // The composite reads the post-commit halves the stages just wrote.
        OpAccess::for_stage("visualization-composite", &viz_set(), cur.other(), true),
    ];
    let plan = BarrierPlan::plan(&ops);
    assert!(plan.is_break(0));
    assert!(!plan.is_break(1));
    assert!(!plan.is_break(2));
    assert!(plan.is_break(3));
    assert_eq!(plan.pass_count(), 2);
}

/// A composite-only frame (no tick fired) is a single pass.
#[test]
fn composite_only_frame_is_one_pass() {
    let ops = vec![OpAccess::for_stage(
        "visualization-composite",
        &viz_set(),
        Slot::B,
        true,
    )];
    let plan = BarrierPlan::plan(&ops);
    assert_eq!(plan.pass_count(), 1);
}

/// If a hypothetical stage chained on another stage's same-tick output the
/// planner would split the pass; the plan is driven by accesses, not names.
#[test]
fn chained_reader_forces_a_split() {
    let cur = Slot::A;
    let producer = OpAccess::for_stage("erosion", &erosion_set(), cur, false);
    // A consumer bound as if the produced half were its settled input.
    let consumer = OpAccess::for_stage("erosion", &erosion_set(), cur.other(), false);
    let plan = BarrierPlan::plan(&[producer, consumer]);
    assert!(plan.is_break(1));
}
