use proptest::prelude::*;
use tree_data::prelude::*;

fn axis(n: usize) -> Axis {
    Axis::try_new((0..n).map(|i| format!("l{i}"))).unwrap()
}

proptest! {
    #[test]
    fn label_resolution_is_idempotent(n in 1usize..40, picks in prop::collection::vec(0usize..40, 0..20)) {
        let ax = axis(n);
        let mut seen = std::collections::HashSet::new();
        let labels: Vec<String> = picks
            .into_iter()
            .map(|p| p % n)
            .filter(|p| seen.insert(*p))
            .map(|p| format!("l{p}"))
            .collect();
        let sel = Selector::labels(labels.clone());
        let a = sel.resolve(&ax, AxisKind::Obs).unwrap();
        let b = sel.resolve(&ax, AxisKind::Obs).unwrap();
        prop_assert_eq!(&a, &b);
        // requested order is kept verbatim
        let back: Vec<String> = a.iter().map(|&p| ax.label(p).unwrap().to_string()).collect();
        prop_assert_eq!(back, labels);
    }

    #[test]
    fn mask_resolves_to_true_positions(mask in prop::collection::vec(any::<bool>(), 0..40)) {
        let ax = axis(mask.len());
        let got = Selector::mask(mask.clone()).resolve(&ax, AxisKind::Var).unwrap();
        let want: Vec<usize> = mask.iter().enumerate().filter(|(_, m)| **m).map(|(i, _)| i).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn slices_stay_in_range(n in 0usize..30, start in 0usize..40, stop in 0usize..40, step in 1usize..5) {
        let ax = axis(n);
        let got = Selector::stepped(start..stop, step).resolve(&ax, AxisKind::Obs).unwrap();
        prop_assert!(got.iter().all(|&p| p < n));
        prop_assert!(got.windows(2).all(|w| w[1] == w[0] + step));
        let want: Vec<usize> = (start.min(n)..stop.min(n)).step_by(step).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn subset_is_ancestor_closed(h in 1usize..5, picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10)) {
        let g = TreeGraph::balanced_tree(2, h);
        let leaves = g.leaves();
        let targets: Vec<&str> = picks.iter().map(|ix| leaves[ix.index(leaves.len())]).collect();
        let subset = ancestor_closure(&g, targets.iter().copied(), EmptySubsetPolicy::Empty).unwrap();
        for t in &targets {
            prop_assert!(subset.contains(t));
            for a in g.ancestors(t) {
                prop_assert!(subset.contains(a));
            }
        }
        let sub = subset_tree(&g, &subset);
        // induced subgraph of a tree on an ancestor-closed set is a tree
        if !targets.is_empty() {
            prop_assert_eq!(sub.root().unwrap(), "0");
            prop_assert_eq!(sub.edge_count() + 1, sub.node_count());
        }
        // edges keep the source's insertion order
        let order: Vec<(&str, &str)> = g.edges().filter(|(u, v)| subset.contains(u) && subset.contains(v)).collect();
        prop_assert_eq!(sub.edges().collect::<Vec<_>>(), order);
    }
}

#[test]
fn duplicate_positions_are_rejected() {
    let ax = axis(4);
    let err = Selector::positions([1, 1]).resolve(&ax, AxisKind::Obs).unwrap_err();
    assert_eq!(err, SelectorError::DuplicatePosition { axis: AxisKind::Obs, position: 1 });
}
