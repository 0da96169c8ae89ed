use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::bail;
use async_trait::async_trait;
use picker_engine::{ExposedValue, LookupCapabilities, NullAdapter, PickerAdapter, PickerError, spawn_picker};
use picker_types::{ConfigError, ListRequest, ListResponse, PickerConfig, PickerOption, SelectionMode, SelectionSet};
use serde_json::json;
use tokio::{sync::Semaphore, time::sleep};

#[derive(Debug, Clone)]
struct User {
    id: String,
    name: String,
}

fn user(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
    }
}

fn numbered_users(count: usize) -> Vec<User> {
    (1..=count).map(|n| user(&format!("u{n:02}"), &format!("User {n:02}"))).collect()
}

#[derive(Debug, Clone, Copy)]
enum SignalStyle {
    Total,
    HasMore,
    Missing,
}

#[derive(Debug)]
struct ScriptedAdapter {
    users: Vec<User>,
    directory: Vec<User>,
    signal: SignalStyle,
    capabilities: LookupCapabilities,
    failing_pages: HashSet<u32>,
    failing_ids: HashSet<String>,
    gate: Option<Arc<Semaphore>>,
    hang: bool,
    list_calls: AtomicUsize,
    by_id_calls: AtomicUsize,
    by_ids_calls: AtomicUsize,
    requests: Mutex<Vec<ListRequest>>,
}

impl ScriptedAdapter {
    fn new(users: Vec<User>) -> Self {
        Self {
            directory: users.clone(),
            users,
            signal: SignalStyle::Total,
            capabilities: LookupCapabilities::NONE,
            failing_pages: HashSet::new(),
            failing_ids: HashSet::new(),
            gate: None,
            hang: false,
            list_calls: AtomicUsize::new(0),
            by_id_calls: AtomicUsize::new(0),
            by_ids_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn signal(mut self, signal: SignalStyle) -> Self {
        self.signal = signal;
        self
    }

    fn lookups(mut self, capabilities: LookupCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Users reachable through lookups but never listed.
    fn directory(mut self, directory: Vec<User>) -> Self {
        self.directory = directory;
        self
    }

    fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    fn failing_id(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.into());
        self
    }

    fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ListRequest {
        self.requests.lock().expect("requests lock").last().cloned().expect("at least one request")
    }
}

#[async_trait]
impl PickerAdapter for ScriptedAdapter {
    type Item = User;

    async fn list(&self, request: ListRequest) -> anyhow::Result<ListResponse<User>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().expect("requests lock").push(request.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.failing_pages.contains(&request.page) {
            bail!("backend unavailable");
        }

        let needle = request.search.as_deref().unwrap_or_default().to_lowercase();
        let matching: Vec<User> = self
            .users
            .iter()
            .filter(|user| user.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = matching.len();
        let items: Vec<User> = matching.into_iter().skip(request.offset()).take(request.page_size as usize).collect();

        Ok(match self.signal {
            SignalStyle::Total => ListResponse::with_total(items, total as u64),
            SignalStyle::HasMore => {
                let has_more = request.offset() + items.len() < total;
                ListResponse::with_has_more(items, has_more)
            }
            SignalStyle::Missing => ListResponse::without_signal(items),
        })
    }

    fn capabilities(&self) -> LookupCapabilities {
        self.capabilities
    }

    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(id) {
            bail!("lookup of {id} failed");
        }
        Ok(self.directory.iter().find(|user| user.id == id).cloned())
    }

    async fn get_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<User>> {
        self.by_ids_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.directory.iter().filter(|user| ids.contains(&user.id)).cloned().collect())
    }

    fn label_of(&self, item: &User) -> String {
        item.name.clone()
    }

    fn value_of(&self, item: &User) -> String {
        item.id.clone()
    }
}

fn config(page_size: u32, mode: SelectionMode) -> PickerConfig {
    PickerConfig {
        page_size,
        selection_mode: mode,
        ..PickerConfig::default()
    }
}

fn values(options: &[PickerOption]) -> Vec<&str> {
    options.iter().map(|option| option.value.as_str()).collect()
}

#[tokio::test]
async fn first_page_loads_on_spawn() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)));
    let picker = spawn_picker(adapter.clone(), config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");

    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(snapshot.options.len(), 10);
    assert_eq!(snapshot.options[0], PickerOption::new("u01", "User 01"));
    assert_eq!(snapshot.page, 1);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.value, ExposedValue::Single(None));

    assert_eq!(adapter.list_calls(), 1);
    assert_eq!(
        adapter.last_request(),
        ListRequest {
            page: 1,
            page_size: 10,
            search: None,
            params: None,
        }
    );
}

#[tokio::test]
async fn first_published_snapshot_reports_the_pending_page() {
    let gate = Arc::new(Semaphore::new(0));
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)).gated(gate.clone()));
    let picker = spawn_picker(adapter, config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");

    let initial = picker.latest();
    assert!(initial.busy);
    assert_eq!(initial.generation, 1);
    assert!(initial.options.is_empty());

    gate.add_permits(1);
    let loaded = picker.wait_until(|snapshot| !snapshot.busy).await.expect("first page");
    assert_eq!(loaded.options.len(), 10);
    assert_eq!(loaded.generation, 1);
}

#[tokio::test]
async fn subscribers_observe_each_fetch() {
    let gate = Arc::new(Semaphore::new(0));
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)).gated(gate.clone()));
    let picker = spawn_picker(adapter, config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");

    let mut updates = picker.subscribe();
    assert!(updates.borrow_and_update().busy);

    gate.add_permits(1);
    let first = updates.wait_for(|snapshot| !snapshot.busy).await.expect("first page").clone();
    assert_eq!(first.options.len(), 10);

    picker.request_next_page().expect("page 2");
    updates.changed().await.expect("fetch published");
    let fetching = updates.borrow_and_update().clone();
    assert!(fetching.busy);
    assert_eq!(fetching.page, 2);
    assert_eq!(fetching.options.len(), 10);

    gate.add_permits(1);
    let second = updates.wait_for(|snapshot| !snapshot.busy).await.expect("second page").clone();
    assert_eq!(second.options.len(), 20);
    assert_eq!(picker.latest(), second);

    picker.shutdown().expect("shutdown");
    assert!(updates.changed().await.is_err(), "publisher closes on shutdown");
}

#[tokio::test]
async fn paging_by_total_stops_after_the_last_page() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)));
    let picker = spawn_picker(adapter.clone(), config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");
    picker.idle().await.expect("first page");

    picker.request_next_page().expect("page 2");
    let second = picker.idle().await.expect("second page");
    assert_eq!(second.page, 2);
    assert!(second.has_more);

    picker.request_next_page().expect("page 3");
    let third = picker.idle().await.expect("third page");
    assert_eq!(third.page, 3);
    assert!(!third.has_more);
    assert_eq!(third.options.len(), 25);

    picker.request_next_page().expect("ignored request");
    let last = picker.idle().await.expect("idle");
    assert_eq!(last.page, 3);
    assert_eq!(adapter.list_calls(), 3);
}

#[tokio::test]
async fn next_page_requests_while_fetching_issue_one_call() {
    let gate = Arc::new(Semaphore::new(1));
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(40)).gated(gate.clone()));
    let picker = spawn_picker(adapter.clone(), config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");
    picker.idle().await.expect("first page");

    picker.request_next_page().expect("request");
    picker.request_next_page().expect("request");
    picker.request_next_page().expect("request");
    let pending = picker.snapshot().await.expect("snapshot");
    assert!(pending.busy);
    assert_eq!(pending.page, 2);

    gate.add_permits(1);
    let loaded = picker.idle().await.expect("second page");
    assert_eq!(loaded.page, 2);
    assert_eq!(loaded.options.len(), 20);
    assert_eq!(adapter.list_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn rapid_search_input_settles_into_one_session() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)));
    let picker = spawn_picker(adapter.clone(), config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");
    picker.idle().await.expect("first page");

    picker.set_search_input("use").expect("input");
    sleep(Duration::from_millis(100)).await;
    picker.set_search_input("user").expect("input");
    sleep(Duration::from_millis(100)).await;
    picker.set_search_input("user 1").expect("input");
    assert!(picker.snapshot().await.expect("snapshot").settling);

    let snapshot = picker.idle().await.expect("settled");
    assert_eq!(snapshot.search, "user 1");
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.options.len(), 10);
    assert!(snapshot.options.iter().all(|option| option.label.starts_with("User 1")));
    assert!(!snapshot.has_more);

    assert_eq!(adapter.list_calls(), 2, "intermediate terms never reach the adapter");
    assert_eq!(adapter.last_request().search.as_deref(), Some("user 1"));
}

#[tokio::test]
async fn selected_value_survives_a_search_reset() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)));
    let picker = spawn_picker(
        adapter.clone(),
        PickerConfig {
            debounce_ms: 5,
            ..config(10, SelectionMode::Multi)
        },
        SelectionSet::from_values(["u03"]),
    )
    .expect("spawn picker");
    let first = picker.idle().await.expect("first page");
    assert_eq!(first.value, ExposedValue::Multi(vec!["u03".into()]));

    picker.set_search_input("user 2").expect("input");
    let snapshot = picker.wait_until(|snapshot| snapshot.search == "user 2" && !snapshot.busy).await.expect("new session");

    assert_eq!(values(&snapshot.options), ["u03", "u20", "u21", "u22", "u23", "u24", "u25"]);
    assert_eq!(snapshot.value, ExposedValue::Multi(vec!["u03".into()]));
}

#[tokio::test]
async fn bulk_lookup_labels_missing_selected_values() {
    let adapter = Arc::new(
        ScriptedAdapter::new(vec![user("u2", "Bob")])
            .directory(vec![user("u1", "Ada"), user("u2", "Bob")])
            .lookups(LookupCapabilities::ALL),
    );
    let picker = spawn_picker(
        adapter.clone(),
        config(10, SelectionMode::Multi),
        SelectionSet::from_values(["u1", "u3"]),
    )
    .expect("spawn picker");

    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(values(&snapshot.options), ["u1", "u2"]);
    assert_eq!(snapshot.options[0].label, "Ada");
    assert_eq!(snapshot.value, ExposedValue::Multi(vec!["u1".into()]));
    assert_eq!(adapter.by_ids_calls.load(Ordering::SeqCst), 1);
    assert_eq!(adapter.by_id_calls.load(Ordering::SeqCst), 0);

    picker.request_next_page().expect("no more pages");
    picker.idle().await.expect("idle");
    assert_eq!(adapter.by_ids_calls.load(Ordering::SeqCst), 1, "unresolved values are not retried");
}

#[tokio::test]
async fn single_lookup_failures_are_isolated() {
    let adapter = Arc::new(
        ScriptedAdapter::new(vec![user("u2", "Bob")])
            .directory(vec![user("u1", "Ada"), user("u3", "Cy")])
            .lookups(LookupCapabilities::SINGLE)
            .failing_id("u1"),
    );
    let picker = spawn_picker(
        adapter.clone(),
        config(10, SelectionMode::Multi),
        SelectionSet::from_values(["u1", "u3"]),
    )
    .expect("spawn picker");

    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(values(&snapshot.options), ["u3", "u2"]);
    assert_eq!(snapshot.value, ExposedValue::Multi(vec!["u3".into()]));
    assert_eq!(adapter.by_id_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn single_select_exposes_value_only_once_labelled() {
    let hidden = Arc::new(ScriptedAdapter::new(numbered_users(3)).directory(numbered_users(12)));
    let picker = spawn_picker(hidden, config(10, SelectionMode::Single), SelectionSet::single(Some("u12"))).expect("spawn picker");
    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(snapshot.value, ExposedValue::Single(None));
    assert!(!snapshot.options.iter().any(|option| option.value == "u12"));

    let resolvable = Arc::new(
        ScriptedAdapter::new(numbered_users(3))
            .directory(numbered_users(12))
            .lookups(LookupCapabilities::SINGLE),
    );
    let picker = spawn_picker(resolvable, config(10, SelectionMode::Single), SelectionSet::single(Some("u12"))).expect("spawn picker");
    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(snapshot.value, ExposedValue::Single(Some("u12".into())));
    assert_eq!(snapshot.options[0], PickerOption::new("u12", "User 12"));
}

#[tokio::test]
async fn selection_change_resolves_new_values() {
    let adapter = Arc::new(
        ScriptedAdapter::new(numbered_users(5))
            .directory(numbered_users(30))
            .lookups(LookupCapabilities::BULK),
    );
    let picker = spawn_picker(adapter.clone(), config(10, SelectionMode::Multi), SelectionSet::empty()).expect("spawn picker");
    picker.idle().await.expect("idle");

    picker.set_selection(SelectionSet::from_values(["u02", "u27"])).expect("select");
    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(snapshot.value, ExposedValue::Multi(vec!["u02".into(), "u27".into()]));
    assert_eq!(snapshot.options[0].value, "u27");
    assert_eq!(adapter.by_ids_calls.load(Ordering::SeqCst), 1, "one missing value uses a one-element bulk call");
}

#[tokio::test]
async fn failed_fetch_keeps_options_and_stops_paging() {
    let adapter = Arc::new(
        ScriptedAdapter::new(numbered_users(30))
            .signal(SignalStyle::HasMore)
            .failing_page(2),
    );
    let picker = spawn_picker(adapter.clone(), config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");
    assert!(picker.idle().await.expect("first page").has_more);

    picker.request_next_page().expect("page 2");
    let snapshot = picker.idle().await.expect("failed page");
    assert_eq!(snapshot.options.len(), 10);
    assert!(!snapshot.has_more);
    assert!(!snapshot.busy);

    picker.request_next_page().expect("ignored request");
    picker.idle().await.expect("idle");
    assert_eq!(adapter.list_calls(), 2, "failures are not retried");
}

#[tokio::test]
async fn missing_signal_stops_paging() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(30)).signal(SignalStyle::Missing));
    let picker = spawn_picker(adapter, config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");
    let snapshot = picker.idle().await.expect("idle");
    assert_eq!(snapshot.options.len(), 10);
    assert!(!snapshot.has_more);
}

#[tokio::test]
async fn context_changes_start_new_sessions() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(25)));
    let picker = spawn_picker(
        adapter.clone(),
        PickerConfig {
            dependency_token: Some("org-1".into()),
            ..config(10, SelectionMode::Single)
        },
        SelectionSet::empty(),
    )
    .expect("spawn picker");
    picker.idle().await.expect("first page");
    picker.request_next_page().expect("page 2");
    assert_eq!(picker.idle().await.expect("page 2").page, 2);

    picker.set_dependency_token(Some("org-2".into())).expect("token");
    let snapshot = picker.idle().await.expect("token reset");
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.page, 1);
    assert_eq!(snapshot.options.len(), 10);

    picker.set_dependency_token(Some("org-2".into())).expect("same token");
    assert_eq!(picker.idle().await.expect("idle").generation, 2);

    let params = json!({"team": "core"}).as_object().cloned();
    picker.set_params(params.clone()).expect("params");
    assert_eq!(picker.idle().await.expect("params reset").generation, 3);
    assert_eq!(adapter.last_request().params, params);

    picker.reload().expect("reload");
    assert_eq!(picker.idle().await.expect("reload").generation, 4);
    assert_eq!(adapter.list_calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn timed_out_fetch_stops_paging() {
    let adapter = Arc::new(ScriptedAdapter::new(numbered_users(5)).hanging());
    let picker = spawn_picker(
        adapter,
        PickerConfig {
            request_timeout_ms: Some(50),
            ..config(10, SelectionMode::Single)
        },
        SelectionSet::empty(),
    )
    .expect("spawn picker");

    let snapshot = picker.idle().await.expect("idle");
    assert!(snapshot.options.is_empty());
    assert!(!snapshot.has_more);
}

#[tokio::test]
async fn null_adapter_settles_empty() {
    let picker = spawn_picker(Arc::new(NullAdapter), config(10, SelectionMode::Multi), SelectionSet::from_values(["x"])).expect("spawn picker");
    let snapshot = picker.idle().await.expect("idle");
    assert!(snapshot.options.is_empty());
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.value, ExposedValue::Multi(Vec::new()));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let result = spawn_picker(Arc::new(NullAdapter), config(0, SelectionMode::Single), SelectionSet::empty());
    assert_eq!(result.err(), Some(PickerError::Config(ConfigError::ZeroPageSize)));
}

#[tokio::test]
async fn handle_reports_closed_after_shutdown() {
    let picker = spawn_picker(Arc::new(NullAdapter), config(10, SelectionMode::Single), SelectionSet::empty()).expect("spawn picker");
    picker.idle().await.expect("idle");

    picker.shutdown().expect("shutdown");
    assert_eq!(picker.snapshot().await, Err(PickerError::Closed));
    assert_eq!(picker.request_next_page(), Err(PickerError::Closed));
}
