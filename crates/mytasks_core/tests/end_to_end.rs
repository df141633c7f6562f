use chrono::NaiveDate;
use mytasks_core::{
    open_store, sort_tasks, AuthService, SortKey, StorageBackend, StorageConfig, TaskService,
};

#[test]
fn alice_registers_logs_in_and_tracks_rent() {
    for backend in [StorageBackend::Sqlite, StorageBackend::FlatFile] {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&StorageConfig {
            backend,
            data_dir: dir.path().to_path_buf(),
        })
        .unwrap();
        let auth = AuthService::with_cost(store.as_ref(), 256, 1, 1).unwrap();
        let tasks = TaskService::new(store.as_ref());

        auth.register("alice", "secret").unwrap();
        let alice = auth.login("alice", "secret").unwrap();
        assert_eq!(alice.username(), "alice");

        tasks
            .add(&alice, "Pay rent", "2024-03-01", Some("bills"))
            .unwrap();

        let listed = tasks.list(&alice).unwrap();
        assert_eq!(listed.len(), 1, "{backend}");
        assert_eq!(listed[0].title, "Pay rent");
        assert_eq!(
            listed[0].due_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(listed[0].category, "bills");
        assert_eq!(listed[0].owner, "alice");

        assert_eq!(sort_tasks(&listed, "title").tasks, listed);
        assert_eq!(sort_tasks(&listed, "category").tasks, listed);
    }
}

#[test]
fn service_views_combine_storage_and_queries() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&StorageConfig {
        backend: StorageBackend::Sqlite,
        data_dir: dir.path().to_path_buf(),
    })
    .unwrap();
    let auth = AuthService::with_cost(store.as_ref(), 256, 1, 1).unwrap();
    let tasks = TaskService::new(store.as_ref());

    auth.register("carol", "pw").unwrap();
    let carol = auth.login("carol", "pw").unwrap();
    tasks.add(&carol, "Renew passport", "2024-06-10", Some("admin")).unwrap();
    tasks.add(&carol, "Buy milk", "2024-06-01", Some("home")).unwrap();
    tasks.add(&carol, "Buy bread", "2024-06-02", Some("home")).unwrap();

    let sorted = tasks.list_sorted(&carol, "bogus").unwrap();
    assert_eq!(sorted.key, SortKey::DueDate);
    assert_eq!(sorted.fallback_from.as_deref(), Some("bogus"));
    let titles: Vec<_> = sorted.tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy milk", "Buy bread", "Renew passport"]);

    let found = tasks.search(&carol, "BUY").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].title, "Buy milk");

    let reference = NaiveDate::from_ymd_opt(2024, 6, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let due = tasks.due(&carol, reference).unwrap();
    let due_titles: Vec<_> = due.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(due_titles, vec!["Buy milk", "Buy bread"]);
}
