use recipekit_core::{ResourceLoadError, StorageError};
use recipekit_designer::serialization::ShapeRecord;
use recipekit_designer::{
    fallback_layout, resolve_template, serialize, FileTemplateStore, MemoryTemplateStore,
    SaveTemplateRequest, TemplateDocument, TemplateName, TemplateStore,
};

fn single(id: &str) -> TemplateDocument {
    TemplateDocument::new(vec![ShapeRecord {
        radius: Some(5.0),
        ..ShapeRecord::new(id, "circle", 1.0, 2.0)
    }])
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTemplateStore::new(dir.path().join("templates"));

    assert_eq!(store.load(&TemplateName::Default).await.unwrap(), None);

    let mut doc = serialize(&fallback_layout());
    doc.touch();
    store
        .save(SaveTemplateRequest::new(&TemplateName::Default, doc.clone()))
        .await
        .unwrap();

    let loaded = store.load(&TemplateName::Default).await.unwrap().unwrap();
    assert_eq!(loaded.fields, doc.fields);
    assert_eq!(loaded.modified, doc.modified);

    let on_disk = std::fs::read_to_string(store.path_for("default")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
    assert!(value["template"]["fields"].is_array());
}

#[tokio::test]
async fn test_save_upserts_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTemplateStore::new(dir.path());
    let name = TemplateName::for_recipe("42");
    store.save(SaveTemplateRequest::new(&name, single("first"))).await.unwrap();
    store.save(SaveTemplateRequest::new(&name, single("second"))).await.unwrap();

    let loaded = store.load(&name).await.unwrap().unwrap();
    assert_eq!(loaded.fields.len(), 1);
    assert_eq!(loaded.fields[0].id, "second");
}

#[tokio::test]
async fn test_malformed_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTemplateStore::new(dir.path());
    std::fs::write(store.path_for("recipe-7"), "{ not json").unwrap();

    let err = store.load(&TemplateName::for_recipe("7")).await.unwrap_err();
    assert!(matches!(err, ResourceLoadError::MalformedTemplate { .. }));
}

#[tokio::test]
async fn test_unset_template_envelope_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTemplateStore::new(dir.path());
    std::fs::write(store.path_for("default"), r#"{"template": null}"#).unwrap();
    assert_eq!(store.load(&TemplateName::Default).await.unwrap(), None);
}

#[tokio::test]
async fn test_save_failure_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file, not a directory").unwrap();
    let store = FileTemplateStore::new(blocker.join("templates"));

    let err = store
        .save(SaveTemplateRequest::new(&TemplateName::Default, single("x")))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::WriteFailed { ref name, .. } if name == "default"));
}

#[tokio::test]
async fn test_resolve_prefers_override_then_default() {
    let store = MemoryTemplateStore::new()
        .with_template(&TemplateName::Default, single("global"))
        .with_template(&TemplateName::for_recipe("1"), single("special"));

    let one = resolve_template(&store, "1").await.unwrap();
    assert_eq!(one.fields[0].id, "special");
    let two = resolve_template(&store, "2").await.unwrap();
    assert_eq!(two.fields[0].id, "global");

    let empty = MemoryTemplateStore::new();
    assert!(resolve_template(&empty, "1").await.is_none());
}

#[tokio::test]
async fn test_resolve_skips_unreadable_override() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTemplateStore::new(dir.path());
    store
        .save(SaveTemplateRequest::new(&TemplateName::Default, single("global")))
        .await
        .unwrap();
    std::fs::write(store.path_for("recipe-3"), "[]").unwrap();

    let doc = resolve_template(&store, "3").await.unwrap();
    assert_eq!(doc.fields[0].id, "global");
}

#[tokio::test]
async fn test_memory_store_lists_names() {
    let store = MemoryTemplateStore::new();
    store
        .save(SaveTemplateRequest::new(&TemplateName::for_recipe("b"), single("x")))
        .await
        .unwrap();
    store
        .save(SaveTemplateRequest::new(&TemplateName::Default, single("y")))
        .await
        .unwrap();
    assert_eq!(store.names(), vec!["default".to_string(), "recipe-b".to_string()]);
}
