use satchel_storage::*;
use tempfile::TempDir;

fn exercise_contract(backend: &dyn Backend) {
    backend.probe().unwrap();
    assert!(backend.keys().unwrap().is_empty());

    backend.set("app:theme", "\"dark\"").unwrap();
    backend.set("app:lang", "\"uk\"").unwrap();
    backend.set("other", "1").unwrap();

    assert_eq!(backend.get("app:theme").unwrap().as_deref(), Some("\"dark\""));
    assert_eq!(
        backend.keys().unwrap(),
        vec!["app:lang".to_owned(), "app:theme".to_owned(), "other".to_owned()]
    );

    backend.remove("app:lang").unwrap();
    backend.remove("app:lang").unwrap();
    assert!(backend.get("app:lang").unwrap().is_none());

    backend.clear().unwrap();
    assert!(backend.keys().unwrap().is_empty());
    assert!(backend.get("other").unwrap().is_none());
}

#[test]
fn memory_backend_honours_contract() {
    exercise_contract(&MemoryBackend::new());
}

#[test]
fn file_backend_honours_contract() {
    let temp = TempDir::new().unwrap();
    let backend = FileBackend::builder().root(temp.path().join("slots")).open().unwrap();
    exercise_contract(&backend);
}

#[test]
fn shared_backend_sees_same_slots() {
    let backend = std::sync::Arc::new(MemoryBackend::new());
    let shared: std::sync::Arc<MemoryBackend> = std::sync::Arc::clone(&backend);

    shared.set("k", "v").unwrap();
    assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
    assert_eq!(backend.len(), 1);
}

#[test]
fn file_backend_ignores_foreign_files() {
    let temp = TempDir::new().unwrap();
    let backend = FileBackend::builder().root(temp.path()).open().unwrap();
    std::fs::write(temp.path().join("README"), "not a slot").unwrap();
    std::fs::create_dir_all(temp.path().join("zz")).unwrap();
    std::fs::write(temp.path().join("zz").join("notes.txt"), "also not a slot").unwrap();

    backend.set("real", "1").unwrap();
    assert_eq!(backend.keys().unwrap(), vec!["real".to_owned()]);

    backend.clear().unwrap();
    assert!(temp.path().join("README").exists(), "clear must only remove slot files");
}
