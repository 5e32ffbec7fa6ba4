// Integration tests - the tree core, session refresh, and providers
// working together

mod common;

use std::rc::Rc;

use proptest::prelude::*;
use treescope::session::Session;
use treescope::tree::{ObjectTree, ViewOptions};

use common::{branch, leaf, SampleObject, SyntheticProvider};

fn tree_of(root: Rc<SampleObject>) -> ObjectTree {
    let provider = SyntheticProvider::new(root);
    let handle = provider.root_handle();
    let mut tree = ObjectTree::new(provider);
    tree.initialize(handle).unwrap();
    tree
}

fn session_of(root: Rc<SampleObject>) -> Session {
    let provider = SyntheticProvider::new(root);
    let handle = provider.root_handle();
    let mut session = Session::new(provider, ViewOptions::default());
    session.view_mut().set_viewport_height(5);
    session.initialize(handle).unwrap();
    session
}

fn names(tree: &ObjectTree) -> Vec<&str> {
    tree.rows().iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn leaf_and_branch_siblings_render_queries() {
    // root -> A (leaf), B -> X, Y
    let root = branch(
        "root",
        vec![leaf("A", "1"), branch("B", vec![leaf("X", "2"), leaf("Y", "3")])],
    );
    let mut tree = tree_of(root);
    assert_eq!(names(&tree), vec!["A", "B"]);
    assert!(!tree.node(0).has_children);
    assert!(tree.node(1).has_children);

    tree.expand(1).unwrap();
    assert_eq!(names(&tree), vec!["A", "B", "X", "Y"]);
    assert_eq!(tree.node(2).level, 1);
    assert_eq!(tree.node(3).level, 1);

    assert!(!tree.is_last_visible_sibling(2), "Y still follows X");
    assert!(tree.is_last_visible_sibling(3));
    assert!(
        !tree.level_continues_below(2, 0),
        "no further level-0 row follows X"
    );
}

#[test]
fn ancestor_guide_continues_while_an_uncle_is_pending() {
    // root -> C1 -> (a, b), C2 -> z
    let root = branch(
        "root",
        vec![
            branch("C1", vec![leaf("a", "1"), leaf("b", "2")]),
            branch("C2", vec![leaf("z", "3")]),
        ],
    );
    let mut tree = tree_of(root);
    tree.expand(0).unwrap();
    assert_eq!(names(&tree), vec!["C1", "a", "b", "C2"]);

    // C2's subtree is still coming, so the level-0 guide must keep running
    // past a's row.
    assert!(tree.level_continues_below(1, 0));
    assert!(tree.level_continues_below(1, 1));
    assert!(!tree.level_continues_below(2, 1));
}

#[test]
fn refresh_relocates_the_anchor_row_by_key_after_indices_shift() {
    let mids: Vec<_> = (1..=8).map(|i| leaf(&format!("m{i}"), "v")).collect();
    let kids: Vec<_> = (0..10).map(|i| leaf(&format!("c{i}"), "v")).collect();
    let mut children = vec![branch("first", kids)];
    children.extend(mids);
    let mut session = session_of(branch("root", children));

    {
        let (view, tree) = session.view_and_tree_mut();
        view.set_viewport_height(3);
        tree.expand(0).unwrap();
        view.after_structure_change(tree);
        // rows: [first, c0..c9, m1..m8]
        view.select(Some(14), tree);
        view.update_scroll_for_selection();
        view.select(Some(12), tree); // "m2", both selected and first-visible
    }
    assert_eq!(session.view().scroll(), 12);
    let anchor_key = session.current_node().unwrap().key();
    assert_eq!(session.current_node().unwrap().name, "m2");

    // collapse the unrelated earlier node: every index shifts down by 10
    {
        let (view, tree) = session.view_and_tree_mut();
        let old_len = tree.len();
        tree.collapse(0);
        view.structure_changed(0, old_len, tree);
    }
    assert_eq!(session.view().selected(), Some(2));
    assert_eq!(session.view().scroll(), 2);

    session.refresh().unwrap();

    let selected = session.view().selected().unwrap();
    assert_eq!(session.tree().node(selected).key(), anchor_key);
    assert_eq!(session.view().scroll(), selected, "anchor is first-visible");
    assert_eq!(session.tree().node(selected).name, "m2");
}

#[test]
fn refresh_anchors_on_the_parent_of_a_disappearing_selection() {
    let doomed_child = leaf("transient", "x");
    doomed_child.doomed.set(true);
    let root = branch(
        "root",
        vec![branch("holder", vec![doomed_child, leaf("stable", "y")])],
    );
    let mut session = session_of(root);

    {
        let (view, tree) = session.view_and_tree_mut();
        tree.expand(0).unwrap();
        view.after_structure_change(tree);
        view.select(Some(1), tree); // "transient"
    }
    let parent_key = session.tree().node(0).key();

    session.refresh().unwrap();

    let selected = session.view().selected().unwrap();
    assert_eq!(session.tree().node(selected).key(), parent_key);
    assert_eq!(session.tree().node(selected).name, "holder");
}

#[test]
fn collapse_removes_exactly_what_nested_expansion_inserted() {
    let root = branch(
        "root",
        vec![
            branch(
                "top",
                vec![
                    branch("mid", vec![leaf("deep1", "1"), leaf("deep2", "2")]),
                    leaf("flat", "3"),
                ],
            ),
            leaf("tail", "4"),
        ],
    );
    let mut tree = tree_of(root);
    let initial = tree.len();

    tree.expand(0).unwrap();
    let after_top = tree.len();
    tree.expand(1).unwrap();
    let after_mid = tree.len();
    assert_eq!(after_top, initial + 2);
    assert_eq!(after_mid, after_top + 2);

    tree.collapse(0);
    assert_eq!(
        tree.len(),
        initial,
        "collapsing the top removes the nested expansion too"
    );
    assert_eq!(names(&tree), vec!["top", "tail"]);
}

// --- randomized structural invariants ---

#[derive(Debug, Clone)]
enum Shape {
    Leaf,
    Branch(Vec<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let terminal = Just(Shape::Leaf);
    terminal.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 1..4).prop_map(Shape::Branch)
    })
}

fn build(shape: &Shape, counter: &mut usize) -> Rc<SampleObject> {
    let name = format!("n{}", *counter);
    *counter += 1;
    match shape {
        Shape::Leaf => leaf(&name, "v"),
        Shape::Branch(children) => {
            let built = children.iter().map(|c| build(c, counter)).collect();
            branch(&name, built)
        }
    }
}

fn assert_level_staircase(tree: &ObjectTree) {
    for (i, row) in tree.rows().iter().enumerate() {
        if i == 0 {
            assert_eq!(row.level, 0, "first visible row must be at level 0");
        } else {
            assert!(
                row.level <= tree.node(i - 1).level + 1,
                "row {i} at level {} after level {}",
                row.level,
                tree.node(i - 1).level
            );
        }
    }
}

/// Independent definition of "last visible sibling": no later row at the
/// same level before a shallower one.
fn naive_is_last_sibling(tree: &ObjectTree, index: usize) -> bool {
    let level = tree.node(index).level;
    !tree.rows()[index + 1..]
        .iter()
        .take_while(|row| row.level >= level)
        .any(|row| row.level == level)
}

proptest! {
    #[test]
    fn random_toggles_preserve_the_level_staircase(
        shapes in prop::collection::vec(arb_shape(), 1..5),
        toggles in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let mut counter = 0;
        let children = shapes.iter().map(|s| build(s, &mut counter)).collect();
        let mut tree = tree_of(branch("root", children));

        for toggle in toggles {
            if tree.is_empty() {
                break;
            }
            let index = toggle.index(tree.len());
            tree.toggle(index).unwrap();
            assert_level_staircase(&tree);
            for i in 0..tree.len() {
                prop_assert_eq!(
                    tree.is_last_visible_sibling(i),
                    naive_is_last_sibling(&tree, i)
                );
            }
        }
    }

    #[test]
    fn expand_collapse_round_trips_under_any_prior_state(
        shapes in prop::collection::vec(arb_shape(), 1..5),
        warmup in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        target in any::<prop::sample::Index>(),
    ) {
        let mut counter = 0;
        let children = shapes.iter().map(|s| build(s, &mut counter)).collect();
        let mut tree = tree_of(branch("root", children));

        for toggle in warmup {
            if tree.is_empty() {
                break;
            }
            tree.toggle(toggle.index(tree.len())).unwrap();
        }
        prop_assume!(!tree.is_empty());

        let index = target.index(tree.len());
        prop_assume!(tree.node(index).has_children && !tree.is_expanded(index));

        let before: Vec<_> = tree.rows().iter().map(|n| n.key()).collect();
        tree.expand(index).unwrap();
        tree.collapse(index);
        let after: Vec<_> = tree.rows().iter().map(|n| n.key()).collect();
        prop_assert_eq!(before, after);
    }
}
