use recipekit_designer::{
    GridSnap, Point, PointerOutcome, SelectionController, Shape, ShapePatch, ShapeStore,
    ShapeType, Tool,
};

fn two_boxes() -> ShapeStore {
    let mut store = ShapeStore::new();
    store.add(Shape::rectangle("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
    store.add(Shape::rectangle("b", 10.0, 10.0, 10.0, 10.0)).unwrap();
    store
}

#[test]
fn test_click_replaces_and_additive_toggles() {
    let mut sel = SelectionController::new();
    sel.click("a", false);
    sel.click("b", false);
    assert_eq!(sel.selected().iter().collect::<Vec<_>>(), vec!["b"]);

    sel.click("a", true);
    assert!(sel.is_selected("a") && sel.is_selected("b"));
    sel.click("b", true);
    assert_eq!(sel.selected_count(), 1);
    assert!(sel.is_selected("a"));
}

#[test]
fn test_escape_clears() {
    let mut sel = SelectionController::new();
    sel.click("a", false);
    sel.escape();
    assert_eq!(sel.selected_count(), 0);
}

#[test]
fn test_empty_click_with_select_tool_clears() {
    let mut store = two_boxes();
    let mut sel = SelectionController::new();
    sel.click("a", false);
    let outcome = sel.pointer_down(&mut store, Point::new(500.0, 500.0), false, &GridSnap::default());
    assert_eq!(outcome, PointerOutcome::Cleared);
    assert_eq!(sel.selected_count(), 0);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_empty_click_with_placement_tool_creates_snapped_shape() {
    let mut store = two_boxes();
    let mut sel = SelectionController::new();
    sel.click("a", false);
    sel.set_tool(Tool::Circle);

    let outcome = sel.pointer_down(&mut store, Point::new(203.0, 118.0), false, &GridSnap::default());
    let PointerOutcome::Created(id) = outcome else {
        panic!("expected a created shape, got {outcome:?}");
    };
    let shape = store.get(&id).unwrap();
    assert_eq!(shape.shape_type(), ShapeType::Circle);
    assert_eq!(shape.position(), Point::new(200.0, 120.0));
    // Selection is left untouched.
    assert_eq!(sel.selected().iter().collect::<Vec<_>>(), vec!["a"]);
}

#[test]
fn test_hit_test_prefers_topmost() {
    let mut store = ShapeStore::new();
    store.add(Shape::rectangle("under", 0.0, 0.0, 50.0, 50.0)).unwrap();
    store.add(Shape::rectangle("over", 20.0, 20.0, 50.0, 50.0)).unwrap();
    let sel = SelectionController::new();
    let hit = sel.hit_test(&store, Point::new(30.0, 30.0), 0.0).unwrap();
    assert_eq!(hit.id, "over");
    let hit = sel.hit_test(&store, Point::new(5.0, 5.0), 0.0).unwrap();
    assert_eq!(hit.id, "under");
}

#[test]
fn test_group_drag_moves_selection_by_same_delta() {
    let mut store = two_boxes();
    let mut sel = SelectionController::new();
    sel.click("a", false);
    sel.click("b", true);

    let mut drag = sel.begin_drag(&store, "a").unwrap();
    drag.drag_to(&mut store, Point::new(2.0, 3.0));
    drag.drag_to(&mut store, Point::new(5.0, 5.0));
    drag.finish(&mut store, &GridSnap::disabled());

    assert_eq!(store.get("a").unwrap().position(), Point::new(5.0, 5.0));
    assert_eq!(store.get("b").unwrap().position(), Point::new(15.0, 15.0));
}

#[test]
fn test_drag_end_snaps_whole_group() {
    let mut store = two_boxes();
    let mut sel = SelectionController::new();
    sel.select_all(&store);

    let mut drag = sel.begin_drag(&store, "a").unwrap();
    drag.drag_to(&mut store, Point::new(23.0, 38.0));
    let landed = drag.finish(&mut store, &GridSnap::new(true, 20.0));

    assert_eq!(landed, Point::new(20.0, 40.0));
    assert_eq!(store.get("a").unwrap().position(), Point::new(20.0, 40.0));
    // b started 10 units off a, and keeps that offset.
    assert_eq!(store.get("b").unwrap().position(), Point::new(30.0, 50.0));
}

#[test]
fn test_drag_unselected_shape_selects_it_alone() {
    let mut store = two_boxes();
    let mut sel = SelectionController::new();
    sel.click("b", false);
    let mut drag = sel.begin_drag(&store, "a").unwrap();
    assert_eq!(sel.selected().iter().collect::<Vec<_>>(), vec!["a"]);
    drag.drag_to(&mut store, Point::new(40.0, 0.0));
    assert_eq!(store.get("b").unwrap().position(), Point::new(10.0, 10.0));
}

#[test]
fn test_cancel_restores_start_positions() {
    let mut store = two_boxes();
    let mut sel = SelectionController::new();
    sel.select_all(&store);
    let mut drag = sel.begin_drag(&store, "b").unwrap();
    assert_eq!(drag.start_positions().len(), 2);
    drag.drag_to(&mut store, Point::new(100.0, 100.0));
    drag.cancel(&mut store);
    assert_eq!(store.get("a").unwrap().position(), Point::new(0.0, 0.0));
    assert_eq!(store.get("b").unwrap().position(), Point::new(10.0, 10.0));
}

#[test]
fn test_bulk_edit_and_delete() {
    let mut store = two_boxes();
    store.add(Shape::circle("c", 100.0, 100.0, 5.0)).unwrap();
    let mut sel = SelectionController::new();
    sel.click("a", false);
    sel.click("c", true);

    assert_eq!(sel.apply_to_selected(&mut store, &ShapePatch::new().opacity(0.5)), 2);
    assert_eq!(store.get("a").unwrap().style.opacity, Some(0.5));
    assert_eq!(store.get("b").unwrap().style.opacity, None);

    assert_eq!(sel.delete_selected(&mut store), 2);
    assert_eq!(sel.selected_count(), 0);
    assert_eq!(store.list().iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
}
