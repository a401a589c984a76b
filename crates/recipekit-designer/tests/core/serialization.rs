use recipekit_core::{Ingredient, Recipe};
use recipekit_designer::serialization::ShapeRecord;
use recipekit_designer::{
    deserialize, fallback_layout, restore_shapes, serialize, BindingAssets, BindingTag, Color,
    Point, Shape, ShapeKind, ShapeType, TemplateDocument,
};

fn soup() -> Recipe {
    Recipe::new("1", "Leek Soup")
        .with_ingredients(vec![Ingredient::new("leeks", "2", ""), Ingredient::new("stock", "1", "l")])
        .with_steps("Sweat the leeks. Add stock. Blend.")
}

fn tart() -> Recipe {
    Recipe::new("2", "Lemon Tart").with_plating_guide("Dust with sugar")
}

#[test]
fn test_bad_width_becomes_fallback_record() {
    let shapes = vec![
        Shape::text("note", 10.0, 10.0, "hello", 12.0),
        Shape::rectangle("broken", 5.0, 7.0, f64::NAN, 10.0),
        Shape::circle("dot", 50.0, 50.0, 4.0),
    ];
    let doc = serialize(&shapes);
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.fields[1], ShapeRecord::fallback("broken"));
    assert_eq!(doc.fields[1].shape_type, "unknown");
    assert_eq!((doc.fields[1].x, doc.fields[1].y), (0.0, 0.0));
    assert_eq!(doc.fields[0].text.as_deref(), Some("hello"));
    assert_eq!(doc.fields[2].radius, Some(4.0));

    // The whole document still encodes.
    let json = serde_json::to_string(&doc).unwrap();
    assert!(json.contains(r#""type":"unknown""#));
}

#[test]
fn test_non_numeric_stored_width_is_skipped_on_load() {
    let json = r#"{
        "version": "1.0",
        "fields": [
            {"id": "keep", "type": "circle", "x": 1, "y": 2, "radius": 3},
            {"id": "bad", "type": "rectangle", "x": 0, "y": 0, "width": "wide", "height": 4},
            {"id": "ghost", "type": "unknown", "x": 0, "y": 0}
        ]
    }"#;
    let doc: TemplateDocument = serde_json::from_str(json).unwrap();
    let shapes = restore_shapes(&doc);
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].id, "keep");
    assert_eq!(shapes[0].position(), Point::new(1.0, 2.0));
}

#[test]
fn test_records_hold_only_primitives() {
    let mut shapes = fallback_layout();
    shapes.push(
        Shape::line("rule", 10.0, 20.0, vec![Point::new(0.0, 0.0), Point::new(30.0, 5.0)])
            .with_stroke(Color::rgb(1, 2, 3), 2.0),
    );
    let doc = serialize(&deserialize(&serialize(&shapes), &soup(), &BindingAssets::placeholders()));
    let value = serde_json::to_value(&doc).unwrap();
    for field in value["fields"].as_array().unwrap() {
        for (key, v) in field.as_object().unwrap() {
            let primitive = v.is_number()
                || v.is_string()
                || v.is_boolean()
                || v.as_array().is_some_and(|a| a.iter().all(|n| n.is_number()));
            assert!(primitive, "{key} is not primitive: {v}");
        }
    }
    let rule = doc.fields.iter().find(|r| r.id == "rule").unwrap();
    assert_eq!(rule.points, Some(vec![0.0, 0.0, 30.0, 5.0]));
    let image = doc.fields.iter().find(|r| r.id == "recipe-image").unwrap();
    assert_eq!(image.has_image, Some(true));
}

#[test]
fn test_round_trip_preserves_layout() {
    let mut shapes = fallback_layout();
    shapes.push(
        Shape::rectangle("badge", 600.0, 30.0, 80.0, 24.0)
            .with_fill(Color::rgb(0xee, 0x55, 0x22))
            .with_opacity(0.8),
    );
    shapes.push(Shape::text("caption", 40.0, 580.0, "Chef's table", 10.0).bound_to(BindingTag::Title));
    let template = serialize(&shapes);

    for recipe in [soup(), tart(), Recipe::new("3", "")] {
        let rebound = deserialize(&template, &recipe, &BindingAssets::placeholders());
        assert_eq!(serialize(&rebound).layout(), template.layout());
    }
}

#[test]
fn test_rehydration_rebinds_tagged_and_keeps_custom() {
    let mut shapes = fallback_layout();
    shapes.push(Shape::text("motto", 10.0, 10.0, "Mise en place", 9.0));
    let template = serialize(&shapes);

    let rebound = deserialize(&template, &tart(), &BindingAssets::placeholders());
    let text_of = |id: &str| {
        rebound
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.text_content())
            .map(str::to_string)
    };
    assert_eq!(text_of("title").as_deref(), Some("Lemon Tart"));
    assert_eq!(text_of("plating-guide-content").as_deref(), Some("Dust with sugar"));
    assert_eq!(text_of("ingredients-content").as_deref(), Some("No ingredients listed"));
    assert_eq!(text_of("motto").as_deref(), Some("Mise en place"));

    let image = rebound.iter().find(|s| s.id == "recipe-image").unwrap();
    match &image.kind {
        ShapeKind::Image(img) => assert!(img.bitmap.as_ref().is_some_and(|b| b.is_placeholder())),
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_explicit_binding_survives_round_trip() {
    let shapes = vec![Shape::text("big-title", 0.0, 0.0, "", 30.0).bound_to(BindingTag::Title)];
    let doc = serialize(&shapes);
    assert_eq!(doc.fields[0].binding.as_deref(), Some("title"));
    let restored = restore_shapes(&doc);
    assert_eq!(restored[0].binding_tag(), Some(BindingTag::Title));
    assert_eq!(restored[0].shape_type(), ShapeType::Text);
}

#[test]
fn test_duplicate_ids_keep_first() {
    let doc = TemplateDocument::new(vec![
        ShapeRecord {
            radius: Some(1.0),
            ..ShapeRecord::new("dup", "circle", 1.0, 1.0)
        },
        ShapeRecord {
            radius: Some(2.0),
            ..ShapeRecord::new("dup", "circle", 2.0, 2.0)
        },
    ]);
    let shapes = restore_shapes(&doc);
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].x, 1.0);
}

#[test]
fn test_stored_values_save_back_unchanged() {
    let json = r#"{
        "version": "1.0",
        "fields": [
            {"id": "frame", "type": "rectangle", "x": 0, "y": 0, "width": 40, "height": 10,
             "cornerRadius": 50, "fill": "black", "stroke": "rgb(1, 2, 3)"},
            {"id": "dot", "type": "circle", "x": 5, "y": 5, "radius": 2, "fill": "var(--accent)"},
            {"id": "note", "type": "text", "x": 1, "y": 1, "text": "Hi", "fontSize": 0, "width": 0,
             "fontFamily": "Serif"}
        ]
    }"#;
    let stored: TemplateDocument = serde_json::from_str(json).unwrap();
    let shapes = restore_shapes(&stored);
    assert_eq!(shapes.len(), 3);
    assert_eq!(shapes[0].style.fill_color(), Some(Color::BLACK));
    assert_eq!(shapes[0].style.stroke_color(), Some(Color::rgb(1, 2, 3)));
    assert_eq!(shapes[1].style.fill_color(), None);

    let saved = serialize(&shapes);
    assert_eq!(saved.fields, stored.fields);
}
