//! Drag-and-drop tree edits on the command forest

use rounddrop::domain::tree::{all_ids, count, duplicate_ids, has_empty_children, iter};
use rounddrop::domain::{
    find_by_id, rename_by_id, reorder, reorder_with_policy, sibling_list_containing, CommandId,
    CommandNode, DropIntent, DropPolicy, ReorderOutcome,
};
use rounddrop::util::testing::{init_test_setup, sample_forest};
use rstest::rstest;

fn id(s: &str) -> CommandId {
    CommandId::from(s)
}

fn ids(list: &[CommandNode]) -> Vec<&str> {
    list.iter().map(|n| n.id.as_str()).collect()
}

fn flat(names: &[&str]) -> Vec<CommandNode> {
    names
        .iter()
        .map(|n| CommandNode::command(*n, n.to_uppercase(), format!("/{n}")))
        .collect()
}

#[test]
fn given_two_roots_when_dropping_into_first_then_second_becomes_its_child() {
    init_test_setup();
    let forest = flat(&["a", "b"]);

    let (forest, outcome) = reorder(forest, &id("b"), &id("a"), DropIntent::Into);

    assert_eq!(outcome, ReorderOutcome::Moved);
    assert_eq!(ids(&forest), vec!["a"]);
    assert_eq!(ids(forest[0].children()), vec!["b"]);
}

#[test]
fn given_target_with_empty_children_when_dropping_into_then_list_holds_dragged_node() {
    let mut target = CommandNode::group("a", "A");
    target.children = Some(Vec::new());
    let forest = vec![target, CommandNode::command("b", "B", "/b")];

    let (forest, _) = reorder(forest, &id("b"), &id("a"), DropIntent::Into);

    assert_eq!(forest.len(), 1);
    assert_eq!(ids(forest[0].children()), vec!["b"]);
}

#[test]
fn given_deep_leaf_when_dropped_into_other_root_then_old_parent_children_collapse() {
    let forest = vec![
        CommandNode::group("a", "A").with_children(vec![CommandNode::group("b", "B")
            .with_children(vec![CommandNode::command("c", "C", "/c")])]),
        CommandNode::command("d", "D", "/d"),
    ];

    let (forest, outcome) = reorder(forest, &id("c"), &id("d"), DropIntent::Into);

    assert!(outcome.is_moved());
    let expected = vec![
        CommandNode::group("a", "A").with_children(vec![CommandNode::group("b", "B")]),
        CommandNode::command("d", "D", "/d").with_children(vec![CommandNode::command(
            "c", "C", "/c",
        )]),
    ];
    assert_eq!(forest, expected);
}

#[rstest]
#[case(DropIntent::After, vec!["a", "c", "b"])]
#[case(DropIntent::Before, vec!["c", "a", "b"])]
fn given_three_roots_when_dropping_relative_to_first_then_order_follows_intent(
    #[case] intent: DropIntent,
    #[case] expected: Vec<&str>,
) {
    let forest = flat(&["a", "b", "c"]);

    let (forest, outcome) = reorder(forest, &id("c"), &id("a"), intent);

    assert!(outcome.is_moved());
    assert_eq!(ids(&forest), expected);
}

#[test]
fn given_only_child_when_moved_to_root_then_parent_children_collapse() {
    let forest = vec![
        CommandNode::command("a", "A", "/a"),
        CommandNode::group("b", "B").with_children(vec![CommandNode::command("c", "C", "/c")]),
    ];

    let (forest, outcome) = reorder(forest, &id("c"), &id("a"), DropIntent::After);

    assert!(outcome.is_moved());
    assert_eq!(ids(&forest), vec!["a", "c", "b"]);
    let b = find_by_id(&forest, &id("b")).unwrap();
    assert_eq!(b.children, None);
    assert!(!has_empty_children(&forest));
}

#[test]
fn given_node_when_dropped_onto_itself_then_it_is_discarded() {
    let forest = sample_forest();

    let (forest, outcome) = reorder(forest, &id("a"), &id("a"), DropIntent::After);

    assert!(matches!(outcome, ReorderOutcome::TargetNotFound { restored: false, .. }));
    assert!(find_by_id(&forest, &id("a")).is_none());
    assert_eq!(count(&forest), 5);
}

#[test]
fn given_group_when_dropped_into_own_descendant_then_subtree_is_discarded() {
    let forest = sample_forest();

    let (forest, outcome) = reorder(forest, &id("g"), &id("t2"), DropIntent::Into);

    match outcome {
        ReorderOutcome::TargetNotFound { target, node, restored } => {
            assert_eq!(target, id("t2"));
            assert_eq!(node.id, id("g"));
            assert!(!restored);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(ids(&forest), vec!["a", "b"]);
    for gone in ["g", "t1", "s", "t2"] {
        assert!(find_by_id(&forest, &id(gone)).is_none(), "{gone} still present");
    }
}

#[test]
fn given_group_when_dropped_into_descendant_with_restore_policy_then_tree_is_unchanged() {
    let original = sample_forest();

    let (forest, outcome) = reorder_with_policy(
        original.clone(),
        &id("g"),
        &id("s"),
        DropIntent::Into,
        DropPolicy::Restore,
    );

    assert!(matches!(outcome, ReorderOutcome::TargetNotFound { restored: true, .. }));
    assert_eq!(forest, original);
}

#[test]
fn given_unknown_drag_id_when_reordering_then_forest_is_unchanged() {
    let original = sample_forest();

    let (forest, outcome) = reorder(original.clone(), &id("nope"), &id("a"), DropIntent::Into);

    assert_eq!(outcome, ReorderOutcome::DragNotFound(id("nope")));
    assert_eq!(forest, original);
}

#[test]
fn given_unknown_target_when_reordering_then_dragged_node_is_discarded() {
    let forest = sample_forest();

    let (forest, outcome) = reorder(forest, &id("t1"), &id("ghost"), DropIntent::Before);

    assert!(!outcome.is_moved());
    assert!(find_by_id(&forest, &id("t1")).is_none());
    assert_eq!(count(&forest), 5);
}

#[test]
fn given_nested_target_when_dropping_before_then_lands_in_that_level() {
    let forest = sample_forest();

    let (forest, outcome) = reorder(forest, &id("b"), &id("t2"), DropIntent::Before);

    assert!(outcome.is_moved());
    let level = sibling_list_containing(&forest, &id("t2")).unwrap();
    assert_eq!(ids(level), vec!["b", "t2"]);
    assert_eq!(ids(&forest), vec!["a", "g"]);
}

#[test]
fn given_any_sequence_of_moves_then_ids_stay_unique_and_lists_non_empty() {
    let mut forest = sample_forest();
    let moves = [
        ("t2", "a", DropIntent::Into),
        ("b", "t1", DropIntent::After),
        ("s", "b", DropIntent::Before),
        ("a", "g", DropIntent::Into),
        ("t1", "t2", DropIntent::Into),
        ("g", "g", DropIntent::After),
    ];

    for (drag, target, intent) in moves {
        let before = count(&forest);
        let (next, outcome) = reorder(forest, &id(drag), &id(target), intent);
        forest = next;

        assert!(duplicate_ids(&forest).is_empty());
        assert!(!has_empty_children(&forest));
        match outcome {
            ReorderOutcome::Moved | ReorderOutcome::DragNotFound(_) => {
                assert_eq!(count(&forest), before)
            }
            ReorderOutcome::TargetNotFound { node, .. } => {
                let removed = iter(std::slice::from_ref(&*node)).count();
                assert_eq!(count(&forest), before - removed);
            }
        }
    }
}

#[test]
fn given_nested_id_when_renaming_then_only_that_label_changes() {
    let original = sample_forest();

    let renamed = rename_by_id(original.clone(), &id("t2"), "Scratch");

    for node in iter(&renamed) {
        let before = find_by_id(&original, &node.id).unwrap();
        if node.id == id("t2") {
            assert_eq!(node.label, "Scratch");
        } else {
            assert_eq!(node.label, before.label);
        }
    }
    assert_eq!(all_ids(&renamed), all_ids(&original));
}

#[test]
fn given_unknown_id_when_renaming_then_forest_is_unchanged() {
    let original = sample_forest();

    let renamed = rename_by_id(original.clone(), &id("ghost"), "X");

    assert_eq!(renamed, original);
}

#[test]
fn given_id_under_second_root_when_looking_up_level_then_returns_its_siblings() {
    let forest = vec![
        CommandNode::group("r1", "R1").with_children(flat(&["x", "y"])),
        CommandNode::group("r2", "R2").with_children(vec![
            CommandNode::group("inner", "Inner").with_children(flat(&["deep"])),
            CommandNode::command("z", "Z", "/z"),
        ]),
    ];

    let level = sibling_list_containing(&forest, &id("deep")).unwrap();
    assert_eq!(ids(level), vec!["deep"]);

    let level = sibling_list_containing(&forest, &id("z")).unwrap();
    assert_eq!(ids(level), vec!["inner", "z"]);

    let level = sibling_list_containing(&forest, &id("r2")).unwrap();
    assert_eq!(ids(level), vec!["r1", "r2"]);

    assert!(sibling_list_containing(&forest, &id("ghost")).is_none());
}
