//! Integration tests for the dispatcher's public interface.
//!
//! A recording backend stands in for the OS shell so handler ownership and
//! status handling can be observed without launching anything.

use launcher_core::{
    AssociationHandler, Dispatcher, DispatcherOptions, DispatcherWorker, LauncherError,
    MethodOutcome, Result, ShellBackend, ShellStatus, WideString,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Record {
    live_handlers: AtomicUsize,
    released_handlers: AtomicUsize,
    enumerations: AtomicUsize,
    fail_enumeration: AtomicBool,
    opened: Mutex<Vec<String>>,
    revealed: Mutex<Vec<String>>,
    invoked: Mutex<Vec<(String, String)>>,
}

struct RecordingHandler {
    name: String,
    identity: String,
    record: Arc<Record>,
}

impl Drop for RecordingHandler {
    fn drop(&mut self) {
        self.record.live_handlers.fetch_sub(1, Ordering::SeqCst);
        self.record.released_handlers.fetch_add(1, Ordering::SeqCst);
    }
}

impl AssociationHandler for RecordingHandler {
    fn display_name(&self) -> Result<WideString> {
        Ok(WideString::from_utf8(&self.name)?)
    }

    fn identity(&self) -> Result<WideString> {
        Ok(WideString::from_utf8(&self.identity)?)
    }
}

struct RecordingShell {
    status: ShellStatus,
    applications: Vec<(&'static str, &'static str)>,
    record: Arc<Record>,
}

impl RecordingShell {
    fn new(record: Arc<Record>) -> Self {
        Self {
            status: ShellStatus::LAUNCHED,
            applications: vec![
                ("Notepad", "C:\\Windows\\notepad.exe"),
                ("WordPad", "C:\\Program Files\\Windows NT\\Accessories\\wordpad.exe"),
            ],
            record,
        }
    }
}

impl ShellBackend for RecordingShell {
    type Handler = RecordingHandler;

    fn reveal(&self, path: &WideString) -> Result<ShellStatus> {
        self.record.revealed.lock().unwrap().push(path.to_utf8()?);
        Ok(self.status)
    }

    fn open(&self, path: &WideString) -> Result<ShellStatus> {
        self.record.opened.lock().unwrap().push(path.to_utf8()?);
        Ok(self.status)
    }

    fn associated_handlers(&self, extension: &WideString) -> Result<Vec<RecordingHandler>> {
        self.record.enumerations.fetch_add(1, Ordering::SeqCst);
        if self.record.fail_enumeration.load(Ordering::SeqCst) {
            return Err(LauncherError::internal(
                "enumerate association handlers",
                format!(".{}", extension.to_utf8()?),
                "class not registered",
                Some(-2147221164),
            ));
        }
        Ok(self
            .applications
            .iter()
            .map(|&(name, identity)| {
                self.record.live_handlers.fetch_add(1, Ordering::SeqCst);
                RecordingHandler {
                    name: name.to_string(),
                    identity: identity.to_string(),
                    record: self.record.clone(),
                }
            })
            .collect())
    }

    fn invoke_handler(&self, handler: &RecordingHandler, path: &WideString) -> Result<()> {
        self.record
            .invoked
            .lock()
            .unwrap()
            .push((handler.identity.clone(), path.to_utf8()?));
        Ok(())
    }
}

fn dispatcher() -> (Dispatcher<RecordingShell>, Arc<Record>) {
    let record = Arc::new(Record::default());
    (Dispatcher::new(RecordingShell::new(record.clone())), record)
}

#[test]
fn test_reveal_passes_path_through() {
    let (mut dispatcher, record) = dispatcher();
    let path = "C:\\Users\\me\\Documents\\report 2024.pdf";
    let outcome = dispatcher.dispatch("showFileInNativeFileExplorer", &json!({"filePath": path}));
    assert_eq!(outcome, MethodOutcome::Success(json!(true)));
    assert_eq!(*record.revealed.lock().unwrap(), vec![path.to_string()]);
}

#[test]
fn test_snake_case_arguments_accepted() {
    let (mut dispatcher, record) = dispatcher();
    let outcome = dispatcher.dispatch("launchFile", &json!({"file_path": "/home/me/notes.md"}));
    assert!(outcome.is_success());
    assert_eq!(*record.opened.lock().unwrap(), vec!["/home/me/notes.md".to_string()]);
}

#[test]
fn test_status_at_threshold_is_open_error() {
    let record = Arc::new(Record::default());
    let mut shell = RecordingShell::new(record);
    shell.status = ShellStatus(32);
    let mut dispatcher = Dispatcher::new(shell);

    match dispatcher.dispatch("launchFile", &json!({"filePath": "C:\\a.txt"})) {
        MethodOutcome::Error(error) => {
            assert_eq!(error.code, "open_error");
            assert_eq!(error.rpc_code, -32001);
            assert_eq!(error.details, Some(json!({"path": "C:\\a.txt", "code": 32})));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_non_string_path_is_argument_error() {
    let (mut dispatcher, record) = dispatcher();
    let outcome = dispatcher.dispatch("launchFile", &json!({"filePath": 7}));
    assert_eq!(outcome.error_code(), Some("argument_error"));
    assert!(record.opened.lock().unwrap().is_empty());
}

#[test]
fn test_unknown_method_is_not_implemented() {
    let (mut dispatcher, _) = dispatcher();
    assert_eq!(
        dispatcher.dispatch("deleteFile", &json!({"filePath": "C:\\a.txt"})),
        MethodOutcome::NotImplemented
    );
}

#[test]
fn test_listing_replaces_previous_handlers() {
    let (mut dispatcher, record) = dispatcher();
    let params = json!({"filePath": "C:\\notes.txt"});

    let first = dispatcher.dispatch("getSupportedApplications", &params);
    assert!(first.is_success());
    assert_eq!(record.live_handlers.load(Ordering::SeqCst), 2);
    assert_eq!(record.released_handlers.load(Ordering::SeqCst), 0);

    let second = dispatcher.dispatch("getSupportedApplications", &params);
    assert_eq!(first, second);
    assert_eq!(record.live_handlers.load(Ordering::SeqCst), 2);
    assert_eq!(record.released_handlers.load(Ordering::SeqCst), 2);
    assert_eq!(dispatcher.registry().len(), 2);

    drop(dispatcher);
    assert_eq!(record.live_handlers.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listing_shape() {
    let (mut dispatcher, _) = dispatcher();
    let outcome = dispatcher.dispatch("getSupportedApplications", &json!({"filePath": "C:\\notes.TXT"}));
    assert_eq!(
        outcome,
        MethodOutcome::Success(json!([
            {"name": "Notepad", "url": "C:\\Windows\\notepad.exe", "icon": null},
            {
                "name": "WordPad",
                "url": "C:\\Program Files\\Windows NT\\Accessories\\wordpad.exe",
                "icon": null
            }
        ]))
    );
}

#[test]
fn test_path_without_extension_skips_enumeration() {
    let (mut dispatcher, record) = dispatcher();
    for path in ["C:\\Makefile", "/home/me/.bashrc", "C:\\dir.d\\README", "trailing."] {
        let outcome = dispatcher.dispatch("getSupportedApplications", &json!({"filePath": path}));
        assert_eq!(outcome.error_code(), Some("argument_error"), "path {}", path);
    }
    assert_eq!(record.enumerations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failed_enumeration_keeps_previous_handlers() {
    let (mut dispatcher, record) = dispatcher();
    let params = json!({"filePath": "C:\\notes.txt"});
    assert!(dispatcher.dispatch("getSupportedApplications", &params).is_success());

    record.fail_enumeration.store(true, Ordering::SeqCst);
    match dispatcher.dispatch("getSupportedApplications", &params) {
        MethodOutcome::Error(error) => {
            assert_eq!(error.code, "internal_error");
            assert_eq!(error.rpc_code, -32603);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(dispatcher.registry().len(), 2);
    assert_eq!(record.live_handlers.load(Ordering::SeqCst), 2);
    assert_eq!(record.released_handlers.load(Ordering::SeqCst), 0);

    // Handlers from the earlier listing still launch.
    let outcome = dispatcher.dispatch(
        "launchFile",
        &json!({"filePath": "C:\\notes.txt", "applicationPath": "C:\\Windows\\notepad.exe"}),
    );
    assert!(outcome.is_success());
    assert_eq!(record.invoked.lock().unwrap().len(), 1);
}

#[test]
fn test_launch_with_listed_application() {
    let (mut dispatcher, record) = dispatcher();
    dispatcher.dispatch("getSupportedApplications", &json!({"filePath": "C:\\notes.txt"}));

    let outcome = dispatcher.dispatch(
        "launchFile",
        &json!({"filePath": "C:\\notes.txt", "applicationPath": "C:\\Windows\\notepad.exe"}),
    );
    assert_eq!(outcome, MethodOutcome::Success(json!(true)));
    assert_eq!(
        *record.invoked.lock().unwrap(),
        vec![("C:\\Windows\\notepad.exe".to_string(), "C:\\notes.txt".to_string())]
    );
    assert!(record.opened.lock().unwrap().is_empty());
}

#[test]
fn test_launch_with_unlisted_application_is_silent_by_default() {
    let (mut dispatcher, record) = dispatcher();
    let outcome = dispatcher.dispatch(
        "launchFile",
        &json!({"filePath": "C:\\notes.txt", "applicationPath": "C:\\Windows\\notepad.exe"}),
    );
    assert_eq!(outcome, MethodOutcome::Success(json!(true)));
    assert!(record.invoked.lock().unwrap().is_empty());
    assert!(record.opened.lock().unwrap().is_empty());
}

#[test]
fn test_application_match_is_exact() {
    let record = Arc::new(Record::default());
    let mut dispatcher = Dispatcher::with_options(
        RecordingShell::new(record.clone()),
        DispatcherOptions {
            strict_application_match: true,
        },
    );
    dispatcher.dispatch("getSupportedApplications", &json!({"filePath": "C:\\notes.txt"}));

    let outcome = dispatcher.dispatch(
        "launchFile",
        &json!({"filePath": "C:\\notes.txt", "applicationPath": "c:\\windows\\NOTEPAD.EXE"}),
    );
    assert_eq!(outcome.error_code(), Some("application_not_found"));
    assert!(record.invoked.lock().unwrap().is_empty());
}

#[test]
fn test_empty_application_path_opens_with_default() {
    let (mut dispatcher, record) = dispatcher();
    let outcome = dispatcher.dispatch(
        "launchFile",
        &json!({"filePath": "C:\\notes.txt", "applicationPath": ""}),
    );
    assert!(outcome.is_success());
    assert_eq!(*record.opened.lock().unwrap(), vec!["C:\\notes.txt".to_string()]);
}

#[tokio::test]
async fn test_worker_releases_handlers_on_shutdown() {
    let record = Arc::new(Record::default());
    let backend_record = record.clone();
    let worker = DispatcherWorker::spawn(
        move || Ok(RecordingShell::new(backend_record)),
        DispatcherOptions::default(),
    )
    .await
    .unwrap();

    let listed = worker
        .call("getSupportedApplications", json!({"filePath": "C:\\notes.txt"}))
        .await;
    match listed {
        MethodOutcome::Success(Value::Array(apps)) => assert_eq!(apps.len(), 2),
        other => panic!("unexpected outcome: {:?}", other),
    }
    let launched = worker
        .call(
            "launchFile",
            json!({"filePath": "C:\\notes.txt", "applicationPath": "C:\\Windows\\notepad.exe"}),
        )
        .await;
    assert!(launched.is_success());
    assert_eq!(record.invoked.lock().unwrap().len(), 1);

    worker.shutdown();
    assert_eq!(record.live_handlers.load(Ordering::SeqCst), 0);
}
