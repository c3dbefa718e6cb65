use super::*;

fn sample(kinds: PrimitiveSet, field: &str, node: u32, heap: u32) -> Feature {
    let mut fields = IndexMap::new();
    fields.insert(field.to_string(), NodeId(node));
    Feature {
        kinds,
        fields: Some(fields),
        heap_values: [ObjId(heap)].into_iter().collect(),
        prototypes: [ObjId(heap + 100)].into_iter().collect(),
        ..Feature::default()
    }
}

fn merged(a: &Feature, b: &Feature) -> (Feature, Vec<(NodeId, NodeId)>) {
    let mut out = a.clone();
    let mut pending = Vec::new();
    out.merge_from(b.clone(), &mut pending);
    (out, pending)
}

#[test]
fn merge_is_monotonic() {
    let a = sample(PrimitiveSet::STRING, "x", 1, 1);
    let b = sample(PrimitiveSet::NUMBER | PrimitiveSet::NON_VOID, "y", 2, 2);
    let (m, pending) = merged(&a, &b);

    assert!(m.kinds.contains(a.kinds) && m.kinds.contains(b.kinds));
    let names: Vec<&str> = m.fields.as_ref().unwrap().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert!(m.heap_values.is_superset(&a.heap_values));
    assert!(m.heap_values.is_superset(&b.heap_values));
    assert!(m.prototypes.is_superset(&b.prototypes));
    assert!(pending.is_empty());
    assert!(m.weight() > a.weight() && m.weight() > b.weight());
}

#[test]
fn merge_is_idempotent() {
    let a = sample(PrimitiveSet::BOOLEAN, "x", 1, 1);
    let (m, pending) = merged(&a, &a);
    assert_eq!(m, a);
    // The shared field is paired with itself, which the solver skips.
    assert_eq!(pending, vec![(NodeId(1), NodeId(1))]);
}

#[test]
fn merge_is_commutative_on_sets() {
    let a = sample(PrimitiveSet::STRING, "x", 1, 1);
    let b = sample(PrimitiveSet::NULL, "x", 2, 2);
    let (ab, _) = merged(&a, &b);
    let (ba, _) = merged(&b, &a);

    assert_eq!(ab.kinds, ba.kinds);
    assert_eq!(
        ab.heap_values.iter().collect::<std::collections::BTreeSet<_>>(),
        ba.heap_values.iter().collect::<std::collections::BTreeSet<_>>()
    );
    assert_eq!(ab.fields.as_ref().unwrap().len(), ba.fields.as_ref().unwrap().len());
}

#[test]
fn shared_slots_are_handed_back() {
    let left = Feature {
        function: Some(FunctionShape {
            args: smallvec::smallvec![NodeId(1)],
            ret: NodeId(2),
            this: NodeId(3),
        }),
        index_value: Some(NodeId(4)),
        ..Feature::default()
    };
    let right = Feature {
        function: Some(FunctionShape {
            args: smallvec::smallvec![NodeId(11), NodeId(12)],
            ret: NodeId(13),
            this: NodeId(14),
        }),
        index_value: Some(NodeId(15)),
        ..Feature::default()
    };
    let (m, pending) = merged(&left, &right);

    assert_eq!(m.function.as_ref().unwrap().args.len(), 2);
    assert!(pending.contains(&(NodeId(1), NodeId(11))));
    assert!(pending.contains(&(NodeId(2), NodeId(13))));
    assert!(pending.contains(&(NodeId(3), NodeId(14))));
    assert!(pending.contains(&(NodeId(4), NodeId(15))));
}

#[test]
fn hints_are_not_kinds() {
    let set = PrimitiveSet::STRING | PrimitiveSet::NON_VOID | PrimitiveSet::STRING_OR_NUMBER;
    assert_eq!(set.kinds(), PrimitiveSet::STRING);
    assert_eq!(set.hints(), PrimitiveSet::HINTS);
    assert_eq!(
        PrimitiveSet::from(dtsgen_heap::PrimitiveKind::Undefined),
        PrimitiveSet::UNDEFINED
    );
}
