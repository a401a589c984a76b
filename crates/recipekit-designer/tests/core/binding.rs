use image::{Rgba, RgbaImage};
use proptest::prelude::*;
use recipekit_core::{Ingredient, Recipe};
use recipekit_designer::binding::{INGREDIENTS_FALLBACK, TITLE_FALLBACK};
use recipekit_designer::{
    apply_bindings, bind, populate, Bitmap, BindingAssets, BindingTag, BoundValue, Shape,
    ShapeKind,
};

fn ingredient() -> impl Strategy<Value = Ingredient> {
    (
        "[a-z]{1,8}",
        "[0-9]{0,2}",
        prop::sample::select(vec!["g", "ml", "cup", ""]),
    )
        .prop_map(|(n, q, m)| Ingredient::new(n, q, m))
}

#[test]
fn test_every_tag_has_a_value() {
    let fields = bind(&Recipe::new("1", ""), &BindingAssets::placeholders());
    assert_eq!(fields.len(), BindingTag::ALL.len());
    for tag in BindingTag::ALL {
        let value = fields.get(tag).unwrap();
        assert_eq!(tag.is_image(), matches!(value, BoundValue::Image { .. }), "{tag}");
    }
    assert_eq!(fields.text(BindingTag::Title), Some(TITLE_FALLBACK));
    assert_eq!(fields.text(BindingTag::StepsContent), Some("No steps provided"));
    assert_eq!(fields.text(BindingTag::PlatingGuideContent), Some("No plating guide provided"));
    assert_eq!(fields.text(BindingTag::AllergensContent), Some("None listed"));
    assert_eq!(fields.text(BindingTag::ServiceTypesContent), Some("Not specified"));
}

#[test]
fn test_full_recipe_values() {
    let recipe = Recipe::new("7", "Gnocchi")
        .with_ingredients(vec![
            Ingredient::new("potatoes", "500", "g"),
            Ingredient::new("egg", "1", ""),
        ])
        .with_allergens(["egg", "gluten"])
        .with_service_types(["dinner"]);
    let fields = bind(&recipe, &BindingAssets::placeholders());
    assert_eq!(fields.text(BindingTag::Title), Some("Gnocchi"));
    assert_eq!(
        fields.text(BindingTag::IngredientsContent),
        Some("500 g potatoes\n1 egg")
    );
    assert_eq!(fields.text(BindingTag::AllergensContent), Some("egg, gluten"));
    assert_eq!(fields.text(BindingTag::ServiceTypesContent), Some("dinner"));
}

#[test]
fn test_watermark_carries_low_opacity() {
    let logo = Bitmap::local(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));
    let assets = BindingAssets {
        watermark: logo.clone(),
        ..BindingAssets::placeholders()
    };
    let fields = bind(&Recipe::new("1", "x"), &assets);
    match fields.get(BindingTag::Watermark) {
        Some(BoundValue::Image { bitmap, opacity }) => {
            assert_eq!(bitmap, &logo);
            assert!((opacity - 0.1).abs() < 1e-9);
        }
        other => panic!("unexpected watermark value {other:?}"),
    }
}

#[test]
fn test_apply_bindings_skips_mismatched_kinds() {
    let mut shapes = vec![
        Shape::rectangle("title", 0.0, 0.0, 10.0, 10.0),
        Shape::text("steps-content", 0.0, 0.0, "stale", 12.0),
        Shape::text("free", 0.0, 0.0, "kept", 12.0),
    ];
    let fields = bind(&Recipe::new("1", "Soup").with_steps("Stir"), &BindingAssets::placeholders());
    assert_eq!(apply_bindings(&mut shapes, &fields), 1);
    assert!(matches!(shapes[0].kind, ShapeKind::Rectangle(_)));
    assert_eq!(shapes[1].text_content(), Some("Stir"));
    assert_eq!(shapes[2].text_content(), Some("kept"));
}

#[test]
fn test_population_and_rebinding_agree() {
    let recipe = Recipe::new("9", "Ragu").with_steps("Simmer for three hours");
    let assets = BindingAssets::placeholders();
    let populated = populate(&recipe, &assets);
    let rehydrated = recipekit_designer::deserialize(
        &recipekit_designer::serialize(&populated),
        &recipe,
        &assets,
    );
    assert_eq!(populated, rehydrated);
}

proptest! {
    #[test]
    fn prop_ingredients_fallback_iff_empty(list in prop::option::of(prop::collection::vec(ingredient(), 0..5))) {
        let empty = list.as_ref().map_or(true, |l| l.is_empty());
        let mut recipe = Recipe::new("p", "Prop");
        recipe.ingredients = list;
        let fields = bind(&recipe, &BindingAssets::placeholders());
        let text = fields.text(BindingTag::IngredientsContent).unwrap();
        prop_assert_eq!(text == INGREDIENTS_FALLBACK, empty);
    }
}
