use mytasks_core::{
    open_store, AuthError, AuthService, CredentialRepository, NewTask, RepoError, StorageBackend,
    StorageConfig, TaskError, TaskRepository, TaskService, TaskStore, ValidationError,
};
use tempfile::TempDir;

const BACKENDS: [StorageBackend; 2] = [StorageBackend::Sqlite, StorageBackend::FlatFile];

fn open(backend: StorageBackend) -> (TempDir, Box<dyn TaskStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&StorageConfig {
        backend,
        data_dir: dir.path().join("data"),
    })
    .unwrap();
    assert_eq!(store.backend(), backend);
    (dir, store)
}

fn auth_service(store: &dyn TaskStore) -> AuthService<&dyn TaskStore> {
    AuthService::with_cost(store, 256, 1, 1).unwrap()
}

#[test]
fn duplicate_registration_fails_and_keeps_first_credentials() {
    for backend in BACKENDS {
        let (_dir, store) = open(backend);
        let auth = auth_service(store.as_ref());

        auth.register("alice", "secret").unwrap();
        let first_hash = store.find_password_hash("alice").unwrap();

        let err = auth.register("alice", "other").unwrap_err();
        assert!(
            matches!(err, AuthError::AlreadyExists(ref name) if name == "alice"),
            "{backend}: unexpected error {err:?}"
        );
        assert_eq!(err.to_string(), "Username already exists");
        assert_eq!(store.find_password_hash("alice").unwrap(), first_hash);
        assert!(auth.verify("alice", "secret").unwrap());
        assert!(!auth.verify("alice", "other").unwrap());
    }
}

#[test]
fn usernames_are_case_sensitive() {
    for backend in BACKENDS {
        let (_dir, store) = open(backend);
        let auth = auth_service(store.as_ref());

        auth.register("alice", "lower").unwrap();
        auth.register("Alice", "upper").unwrap();
        assert!(auth.verify("alice", "lower").unwrap());
        assert!(auth.verify("Alice", "upper").unwrap());
        assert!(!auth.verify("ALICE", "lower").unwrap());
    }
}

#[test]
fn add_validates_before_persisting() {
    for backend in BACKENDS {
        let (_dir, store) = open(backend);
        let auth = auth_service(store.as_ref());
        auth.register("alice", "secret").unwrap();
        let alice = auth.login("alice", "secret").unwrap();
        let tasks = TaskService::new(store.as_ref());

        let err = tasks.add(&alice, "", "2024-01-01", None).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Validation(ValidationError::EmptyTitle)
        ));

        let err = tasks.add(&alice, "Buy milk", "not-a-date", None).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Validation(ValidationError::InvalidDueDate(_))
        ));
        assert!(err.to_string().contains("use YYYY-MM-DD"));
        assert!(tasks.list(&alice).unwrap().is_empty());

        tasks.add(&alice, "Buy milk", "2024-01-01", None).unwrap();
        let listed = tasks.list(&alice).unwrap();
        assert_eq!(listed.len(), 1, "{backend}");
        assert_eq!(listed[0].title, "Buy milk");
        assert_eq!(listed[0].due_date_text(), "2024-01-01");
        assert_eq!(listed[0].category, "");
    }
}

#[test]
fn list_is_empty_for_owner_without_tasks() {
    for backend in BACKENDS {
        let (_dir, store) = open(backend);
        let auth = auth_service(store.as_ref());
        auth.register("bob", "pw").unwrap();
        let bob = auth.login("bob", "pw").unwrap();

        assert!(TaskService::new(store.as_ref()).list(&bob).unwrap().is_empty());
        assert!(store.list_tasks("nobody").unwrap().is_empty());
    }
}

#[test]
fn list_preserves_insertion_order_and_owner_scope() {
    for backend in BACKENDS {
        let (_dir, store) = open(backend);
        let auth = auth_service(store.as_ref());
        auth.register("alice", "a").unwrap();
        auth.register("bob", "b").unwrap();
        let alice = auth.login("alice", "a").unwrap();
        let bob = auth.login("bob", "b").unwrap();
        let tasks = TaskService::new(store.as_ref());

        let first = tasks.add(&alice, "Zebra", "2024-05-01", None).unwrap();
        tasks.add(&bob, "Bob only", "2024-01-01", None).unwrap();
        let second = tasks.add(&alice, "Apple", "2024-01-01", Some("food")).unwrap();
        assert!(first < second, "{backend}: ids must follow insertion order");

        let listed = tasks.list(&alice).unwrap();
        let titles: Vec<_> = listed.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["Zebra", "Apple"], "{backend}");
        assert!(listed.iter().all(|task| task.owner == "alice"));
        assert_eq!(tasks.list(&bob).unwrap().len(), 1);
    }
}

#[test]
fn repository_rejects_tasks_for_unregistered_owner() {
    for backend in BACKENDS {
        let (_dir, store) = open(backend);
        let draft = NewTask::parse("ghost", "Haunt", "2024-01-01", None).unwrap();

        let err = store.insert_task(&draft).unwrap_err();
        assert!(
            matches!(err, RepoError::UnknownOwner(ref owner) if owner == "ghost"),
            "{backend}: unexpected error {err:?}"
        );
    }
}

#[test]
fn data_survives_reopening_the_store() {
    for backend in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend,
            data_dir: dir.path().to_path_buf(),
        };

        {
            let store = open_store(&config).unwrap();
            let auth = auth_service(store.as_ref());
            auth.register("alice", "secret").unwrap();
            let alice = auth.login("alice", "secret").unwrap();
            TaskService::new(store.as_ref())
                .add(&alice, "Persist me", "2024-02-29", Some("misc"))
                .unwrap();
        }

        let store = open_store(&config).unwrap();
        let auth = auth_service(store.as_ref());
        let alice = auth.login("alice", "secret").unwrap();
        let listed = TaskService::new(store.as_ref()).list(&alice).unwrap();
        assert_eq!(listed.len(), 1, "{backend}");
        assert_eq!(listed[0].title, "Persist me");
        assert_eq!(listed[0].category, "misc");
    }
}
