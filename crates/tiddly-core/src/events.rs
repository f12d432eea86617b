//! Lifecycle events and the hooks registered against them.
//!
//! Configuration maps event names to ordered lists of action specs:
//!
//! ```json
//! { "prestore": [["git", "add", "$0"]], "poststore": [["git", "commit"]] }
//! ```
//!
//! [`EventRegistry::parse`] turns that map into ordered [`BoundAction`]
//! lists; [`EventDispatcher`] runs them with per-request arguments.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::action::{ActionKind, BoundAction, Executor};
use crate::binder;
use crate::error::{Result, TiddlyError};

/// Raw event configuration: event name -> action specs, where each spec is
/// `[kind, arg...]`.
pub type EventMap = HashMap<String, Vec<Vec<String>>>;

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PreStore,
    PostStore,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::PreStore => "prestore",
            EventType::PostStore => "poststore",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = TiddlyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prestore" => Ok(EventType::PreStore),
            "poststore" => Ok(EventType::PostStore),
            _ => Err(TiddlyError::InvalidEventType),
        }
    }
}

// ---------------------------------------------------------------------------
// EventRegistry
// ---------------------------------------------------------------------------

/// An event that could not be registered, with the name as configured.
#[derive(Debug)]
pub struct EventRejection {
    pub name: String,
    pub error: TiddlyError,
}

impl fmt::Display for EventRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct EventRegistry {
    actions: HashMap<String, Arc<[BoundAction]>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `events` into this registry. Accepted events replace any earlier
    /// registration under the same name; names absent from `events` keep
    /// what they had. Rejected events are logged and returned, never fatal.
    pub fn parse(&mut self, events: &EventMap) -> Vec<EventRejection> {
        let rejections = self.parse_quietly(events);
        for rejection in &rejections {
            tracing::warn!(event = %rejection.name, "{rejection}");
        }
        rejections
    }

    /// Same as [`parse`](EventRegistry::parse) without logging the
    /// rejections, for callers that report them some other way.
    pub fn parse_quietly(&mut self, events: &EventMap) -> Vec<EventRejection> {
        let mut rejections = Vec::new();

        for (raw_name, specs) in events {
            let event_type = raw_name.to_lowercase();
            match parse_actions(&event_type, specs) {
                Ok(actions) => {
                    self.actions.insert(event_type, actions.into());
                }
                Err(error) => rejections.push(EventRejection {
                    name: raw_name.clone(),
                    error,
                }),
            }
        }

        rejections
    }

    /// Exact-name lookup. Callers pass the normalized (lowercase) name.
    pub fn get(&self, event_type: &str) -> Option<Arc<[BoundAction]>> {
        self.actions.get(event_type).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered event names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// True if any registered action uses `kind`.
    pub fn uses_kind(&self, kind: ActionKind) -> bool {
        self.actions
            .values()
            .any(|list| list.iter().any(|a| a.kind == kind))
    }
}

fn parse_actions(event_type: &str, specs: &[Vec<String>]) -> Result<Vec<BoundAction>> {
    if specs.is_empty() {
        return Err(TiddlyError::InvalidEventData);
    }

    event_type.parse::<EventType>()?;

    specs.iter().map(|spec| parse_action(spec)).collect()
}

fn parse_action(spec: &[String]) -> Result<BoundAction> {
    let (kind, template) = spec.split_first().ok_or(TiddlyError::InvalidEventData)?;
    let kind = kind.parse::<ActionKind>()?;
    Ok(BoundAction::new(kind, template.to_vec()))
}

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Process-wide hook registry plus the executor its actions run on.
///
/// Lookups take a read lock only long enough to clone the action list, so a
/// concurrent [`reload`](EventDispatcher::reload) never exposes a partially
/// parsed registry to a running dispatch.
pub struct EventDispatcher {
    registry: RwLock<EventRegistry>,
    executor: Executor,
}

impl EventDispatcher {
    pub fn new(registry: EventRegistry, executor: Executor) -> Self {
        Self {
            registry: RwLock::new(registry),
            executor,
        }
    }

    /// Build a dispatcher by parsing `events` into a fresh registry.
    pub fn from_events(events: &EventMap, executor: Executor) -> Self {
        let mut registry = EventRegistry::new();
        registry.parse(events);
        Self::new(registry, executor)
    }

    /// Parse `events` into the live registry (same extend semantics as
    /// [`EventRegistry::parse`]).
    pub fn reload(&self, events: &EventMap) -> Vec<EventRejection> {
        let mut next = self.snapshot();
        let rejections = next.parse(events);
        match self.registry.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        rejections
    }

    pub fn snapshot(&self) -> EventRegistry {
        match self.registry.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Run every action registered for `event_type`, in order. Unregistered
    /// events are a silent no-op. A failing action is logged and the rest
    /// still run; nothing propagates to the caller.
    pub fn dispatch(&self, event_type: &str, args: &[String]) {
        let actions = match self.registry.read() {
            Ok(guard) => guard.get(event_type),
            Err(poisoned) => poisoned.into_inner().get(event_type),
        };
        let Some(actions) = actions else {
            return;
        };

        for action in actions.iter() {
            let bound = binder::bind(&action.template, args);
            if let Err(e) = self.executor.execute(action.kind, bound) {
                tracing::warn!(event = %event_type, kind = %action.kind, "{e}: {event_type}");
            }
        }
    }

    pub fn fire(&self, event: EventType, args: &[String]) {
        self.dispatch(event.as_str(), args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::GitSettings;
    use crate::runner::testing::RecordingRunner;
    use crate::runner::ProcessOutput;
    use std::io::Write;
    use std::sync::Mutex;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn event_map(json: &str) -> EventMap {
        serde_json::from_str(json).unwrap()
    }

    fn dispatcher(events: &EventMap, runner: &Arc<RecordingRunner>) -> EventDispatcher {
        EventDispatcher::from_events(
            events,
            Executor::new(runner.clone(), GitSettings::default()),
        )
    }

    #[derive(Clone, Default)]
    struct LogBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that writes into a buffer, and return the
    /// captured log text.
    fn capture_logs(f: impl FnOnce()) -> String {
        let buf = LogBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn event_type_parse_is_exact() {
        assert_eq!("prestore".parse::<EventType>().unwrap(), EventType::PreStore);
        assert_eq!("poststore".parse::<EventType>().unwrap(), EventType::PostStore);
        assert!("PreStore".parse::<EventType>().is_err());
        assert!("badname".parse::<EventType>().is_err());
    }

    #[test]
    fn parses_and_normalizes_event_names() {
        let mut registry = EventRegistry::new();
        let rejected = registry.parse(&event_map(
            r#"{"PreStore": [["CMD", "echo", "$0"]], "poststore": [["git", "commit"]]}"#,
        ));
        assert!(rejected.is_empty());
        assert_eq!(registry.names(), vec!["poststore", "prestore"]);

        let pre = registry.get("prestore").unwrap();
        assert_eq!(
            pre.as_ref(),
            &[BoundAction::new(ActionKind::Cmd, strings(&["echo", "$0"]))]
        );
        assert!(registry.get("PreStore").is_none());
    }

    #[test]
    fn unknown_event_name_is_dropped_with_one_warning() {
        let mut registry = EventRegistry::new();
        let mut rejected = Vec::new();
        let logs = capture_logs(|| {
            rejected = registry.parse(&event_map(r#"{"badname": [["cmd", "x"]]}"#));
        });

        assert!(registry.is_empty());
        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0].error, TiddlyError::InvalidEventType));
        assert_eq!(logs.lines().count(), 1, "logs: {logs}");
        assert!(logs.contains("WARN"));
        assert!(logs.contains("badname"));

        let runner = Arc::new(RecordingRunner::default());
        let d = EventDispatcher::new(
            registry,
            Executor::new(runner.clone(), GitSettings::default()),
        );
        d.dispatch("badname", &strings(&["a"]));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn quiet_parse_returns_rejections_without_logging() {
        let mut registry = EventRegistry::new();
        let mut rejected = Vec::new();
        let logs = capture_logs(|| {
            rejected = registry.parse_quietly(&event_map(
                r#"{"badname": [["cmd", "x"]], "prestore": [["cmd", "true"]]}"#,
            ));
        });

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].name, "badname");
        assert_eq!(registry.names(), vec!["prestore"]);
        assert!(logs.is_empty(), "logs: {logs}");
    }

    #[test]
    fn empty_action_list_is_invalid_data() {
        let mut registry = EventRegistry::new();
        let rejected = registry.parse(&event_map(r#"{"prestore": []}"#));
        assert!(matches!(rejected[0].error, TiddlyError::InvalidEventData));
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_action_spec_rejects_the_event() {
        let mut registry = EventRegistry::new();
        let rejected = registry.parse(&event_map(r#"{"prestore": [["cmd", "true"], []]}"#));
        assert!(matches!(rejected[0].error, TiddlyError::InvalidEventData));
        assert!(registry.get("prestore").is_none());
    }

    #[test]
    fn one_unknown_kind_rejects_the_whole_event() {
        let events = event_map(r#"{"prestore": [["cmd", "echo", "$0"], ["unknownkind"]]}"#);
        let mut registry = EventRegistry::new();
        let rejected = registry.parse(&events);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            rejected[0].error,
            TiddlyError::InvalidEventActionType
        ));

        let runner = Arc::new(RecordingRunner::default());
        dispatcher(&events, &runner).dispatch("prestore", &strings(&["notes.html"]));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn reparse_extends_and_overwrites() {
        let mut registry = EventRegistry::new();
        registry.parse(&event_map(
            r#"{"prestore": [["cmd", "a"]], "poststore": [["cmd", "b"]]}"#,
        ));
        registry.parse(&event_map(r#"{"poststore": [["cmd", "c"], ["cmd", "d"]]}"#));

        assert_eq!(registry.get("prestore").unwrap().len(), 1);
        let post = registry.get("poststore").unwrap();
        assert_eq!(post.len(), 2);
        assert_eq!(post[0].template, strings(&["c"]));
    }

    #[test]
    fn rejected_reparse_keeps_previous_registration() {
        let mut registry = EventRegistry::new();
        registry.parse(&event_map(r#"{"prestore": [["cmd", "a"]]}"#));
        registry.parse(&event_map(r#"{"prestore": [["nope"]]}"#));
        assert_eq!(
            registry.get("prestore").unwrap()[0].template,
            strings(&["a"])
        );
    }

    #[test]
    fn dispatch_binds_runtime_args_in_order() {
        let events = event_map(
            r#"{"poststore": [["cmd", "cp", "$0", "backup/$0"], ["cmd", "echo", "$0", "$1"]]}"#,
        );
        let runner = Arc::new(RecordingRunner::default());
        dispatcher(&events, &runner).fire(EventType::PostStore, &strings(&["notes.html"]));
        assert_eq!(
            runner.calls(),
            vec![
                strings(&["cp", "notes.html", "backup/$0"]),
                strings(&["echo", "notes.html", "$1"]),
            ]
        );
    }

    #[test]
    fn failing_action_does_not_stop_the_chain() {
        let events = event_map(r#"{"prestore": [["cmd", "$3"], ["cmd", "false"], ["cmd", "true"]]}"#);
        let runner = Arc::new(RecordingRunner::default());
        runner.push_output(ProcessOutput {
            success: false,
            ..Default::default()
        });
        runner.push_output(ProcessOutput {
            success: false,
            ..Default::default()
        });
        let d = dispatcher(&events, &runner);

        let logs = capture_logs(|| d.dispatch("prestore", &strings(&["f.html"])));

        assert_eq!(
            runner.calls(),
            vec![strings(&["$3"]), strings(&["false"]), strings(&["true"])]
        );
        assert_eq!(logs.lines().count(), 2, "logs: {logs}");
        assert!(logs.lines().all(|l| l.contains("prestore")));
    }

    #[test]
    fn empty_program_fails_and_next_action_runs() {
        let events = event_map(r#"{"prestore": [["cmd"], ["cmd", "echo", "$0"]]}"#);
        let runner = Arc::new(RecordingRunner::default());
        let d = dispatcher(&events, &runner);
        let logs = capture_logs(|| d.dispatch("prestore", &strings(&["f.html"])));

        assert_eq!(runner.calls(), vec![strings(&["echo", "f.html"])]);
        assert!(logs.contains("no command specified"), "logs: {logs}");
    }

    #[test]
    fn unregistered_event_runs_nothing_and_logs_nothing() {
        let events = event_map(r#"{"prestore": [["cmd", "true"]]}"#);
        let runner = Arc::new(RecordingRunner::default());
        let d = dispatcher(&events, &runner);
        let logs = capture_logs(|| d.dispatch("poststore", &strings(&["f.html"])));
        assert!(runner.calls().is_empty());
        assert!(logs.is_empty(), "logs: {logs}");
    }

    #[test]
    fn dispatch_requires_normalized_name() {
        let events = event_map(r#"{"prestore": [["cmd", "true"]]}"#);
        let runner = Arc::new(RecordingRunner::default());
        dispatcher(&events, &runner).dispatch("PRESTORE", &[]);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn reload_swaps_in_new_actions() {
        let runner = Arc::new(RecordingRunner::default());
        let d = dispatcher(&event_map(r#"{"prestore": [["cmd", "old"]]}"#), &runner);
        let rejected = d.reload(&event_map(
            r#"{"prestore": [["cmd", "new"]], "bogus": [["cmd", "x"]]}"#,
        ));
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].name, "bogus");

        d.dispatch("prestore", &[]);
        assert_eq!(runner.calls(), vec![strings(&["new"])]);
    }

    #[test]
    fn rejection_display_names_the_event() {
        let mut registry = EventRegistry::new();
        let rejected = registry.parse(&event_map(r#"{"Bad": [["cmd"]]}"#));
        assert_eq!(rejected[0].to_string(), "invalid event type: Bad");
    }
}
