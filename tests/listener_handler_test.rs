//! Listener handler integration tests
//! Run with: cargo test --test listener_handler_test

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use serde_json::json;

use warta_bot::application::errors::HandlerError;
use warta_bot::application::handlers::{
    DefaultEmitters, ListenerHandler, ListenerHandlerOptions,
};
use warta_bot::domain::entities::{Listener, ListenerKind};
use warta_bot::domain::traits::EventSource;
use warta_bot::infrastructure::emitter::Emitter;
use warta_bot::infrastructure::listeners::ActionRegistry;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

fn defaults(client: Arc<Emitter>) -> DefaultEmitters {
    DefaultEmitters {
        client,
        command_handler: Arc::new(Emitter::new()),
        inhibitor_handler: Arc::new(Emitter::new()),
    }
}

/// Action registry with a `count` action that bumps `counter` by the
/// manifest's `with.step` (default 1) on every delivery.
fn counting_actions(counter: Arc<AtomicUsize>) -> ActionRegistry {
    let mut actions = ActionRegistry::with_builtins();
    actions.register("count", move |args| {
        let step = args.get("step").and_then(|s| s.as_u64()).unwrap_or(1) as usize;
        let counter = counter.clone();
        Arc::new(move |_payload| {
            counter.fetch_add(step, Ordering::SeqCst);
        })
    });
    actions
}

fn write_manifest(dir: &Path, file: &str, contents: &str) {
    std::fs::write(dir.join(file), contents).expect("Should write manifest");
}

fn handler_in(
    dir: &Path,
    client: Arc<Emitter>,
    counter: Arc<AtomicUsize>,
) -> Result<ListenerHandler, HandlerError> {
    ensure_init();
    ListenerHandler::new(
        defaults(client),
        ListenerHandlerOptions::new(dir),
        counting_actions(counter),
    )
}

#[test]
fn construction_with_missing_directory_loads_nothing() {
    let client = Arc::new(Emitter::new());
    let handler = handler_in(
        Path::new("/nonexistent/listeners"),
        client,
        Arc::new(AtomicUsize::new(0)),
    )
    .expect("Should construct with missing directory");

    assert!(handler.listeners().is_empty());
}

#[test]
fn reserved_emitter_names_cannot_be_overridden() {
    ensure_init();
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let imposter = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));

    let options =
        ListenerHandlerOptions::new(dir.path()).with_emitter("client", imposter.clone());
    let mut handler = ListenerHandler::new(
        defaults(client.clone()),
        options,
        counting_actions(counter.clone()),
    )
    .expect("Should construct");

    // All four reserved names plus nothing else.
    let names: Vec<&str> = handler.emitters().keys().map(|k| k.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "client",
            "command-handler",
            "inhibitor-handler",
            "listener-handler"
        ]
    );

    let exec_counter = counter.clone();
    handler
        .insert(Listener::new("probe", "client", "ping", move |_payload| {
            exec_counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("Should insert");
    handler.register("probe").expect("Should register");

    // The first-registered client wins; the imposter got nothing.
    imposter.emit("ping", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    client.emit("ping", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn extra_emitters_are_resolvable_by_name() {
    ensure_init();
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let custom = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));

    let options =
        ListenerHandlerOptions::new(dir.path()).with_emitter("scheduler", custom.clone());
    let mut handler = ListenerHandler::new(
        defaults(client),
        options,
        counting_actions(counter.clone()),
    )
    .expect("Should construct");

    let exec_counter = counter.clone();
    handler
        .insert(Listener::new("tick", "scheduler", "tick", move |_payload| {
            exec_counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("Should insert");
    handler.register("tick").expect("Should register");

    custom.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn register_then_deregister_leaves_no_subscription() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");

    handler
        .insert(Listener::new("tick", "client", "tick", |_payload| {}))
        .expect("Should insert");

    handler.register("tick").expect("Should register");
    assert_eq!(client.listener_count("tick"), 1);

    handler.deregister("tick").expect("Should deregister");
    assert_eq!(client.listener_count("tick"), 0);

    // Deregistering an absent subscription is a no-op, not an error.
    handler.deregister("tick").expect("Repeat deregister is fine");
    assert_eq!(client.listener_count("tick"), 0);
}

#[test]
fn repeated_register_does_not_stack_subscriptions() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");

    let exec_counter = counter.clone();
    handler
        .insert(Listener::new("tick", "client", "tick", move |_payload| {
            exec_counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("Should insert");

    handler.register("tick").expect("Should register");
    handler.register("tick").expect("Should register again");
    assert_eq!(client.listener_count("tick"), 1);

    client.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn once_listener_fires_exactly_once_normal_fires_every_time() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let mut handler = handler_in(dir.path(), client.clone(), Arc::new(AtomicUsize::new(0)))
        .expect("Should construct");

    let once_count = Arc::new(AtomicUsize::new(0));
    let normal_count = Arc::new(AtomicUsize::new(0));

    let once_exec = once_count.clone();
    handler
        .insert(
            Listener::new("one-shot", "client", "tick", move |_payload| {
                once_exec.fetch_add(1, Ordering::SeqCst);
            })
            .with_kind(ListenerKind::Once),
        )
        .expect("Should insert");
    let normal_exec = normal_count.clone();
    handler
        .insert(Listener::new("steady", "client", "tick", move |_payload| {
            normal_exec.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("Should insert");

    handler.register("one-shot").expect("Should register");
    handler.register("steady").expect("Should register");

    client.emit("tick", &json!({}));
    client.emit("tick", &json!({}));
    client.emit("tick", &json!({}));

    assert_eq!(once_count.load(Ordering::SeqCst), 1);
    assert_eq!(normal_count.load(Ordering::SeqCst), 3);

    handler.deregister("steady").expect("Should deregister");
    client.emit("tick", &json!({}));
    assert_eq!(normal_count.load(Ordering::SeqCst), 3);
}

#[test]
fn unknown_id_and_unknown_emitter_fail_fast() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let mut handler = handler_in(dir.path(), client, Arc::new(AtomicUsize::new(0)))
        .expect("Should construct");

    assert!(matches!(
        handler.register("ghost"),
        Err(HandlerError::ListenerNotFound(_))
    ));
    assert!(matches!(
        handler.deregister("ghost"),
        Err(HandlerError::ListenerNotFound(_))
    ));

    handler
        .insert(Listener::new("orphan", "no-such-emitter", "tick", |_payload| {}))
        .expect("Should insert");
    match handler.register("orphan") {
        Err(HandlerError::UnknownEmitter { listener, emitter }) => {
            assert_eq!(listener, "orphan");
            assert_eq!(emitter, "no-such-emitter");
        }
        other => panic!("Expected UnknownEmitter, got {:?}", other.err()),
    }
}

#[test]
fn direct_emitter_reference_bypasses_the_registry() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handler =
        handler_in(dir.path(), client, counter.clone()).expect("Should construct");

    let side_channel: Arc<Emitter> = Arc::new(Emitter::new());
    let exec_counter = counter.clone();
    handler
        .insert(Listener::new(
            "direct",
            Arc::clone(&side_channel) as Arc<dyn warta_bot::domain::traits::EventSource>,
            "pulse",
            move |_payload| {
                exec_counter.fetch_add(1, Ordering::SeqCst);
            },
        ))
        .expect("Should insert");
    handler.register("direct").expect("Should register");

    side_channel.emit("pulse", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn end_to_end_once_listener_from_directory() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "ready.yaml",
        "emitter: client\nevent: ready\nkind: once\naction: count\n",
    );

    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");

    // Live subscription exists right after construction.
    assert!(handler.listeners().contains_key("ready"));
    assert_eq!(client.listener_count("ready"), 1);

    client.emit("ready", &json!({}));
    client.emit("ready", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn remove_unloads_and_unsubscribes() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "tick.yaml",
        "emitter: client\nevent: tick\naction: count\n",
    );

    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");
    assert_eq!(client.listener_count("tick"), 1);

    let removed = handler.remove("tick").expect("Should remove");
    assert_eq!(removed.id, "tick");
    assert!(!handler.listeners().contains_key("tick"));
    assert_eq!(client.listener_count("tick"), 0);

    client.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn reload_swaps_in_the_new_callback() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "tick.yaml",
        "emitter: client\nevent: tick\naction: count\nwith:\n  step: 1\n",
    );

    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");

    client.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // The manifest now declares a different behavior.
    write_manifest(
        dir.path(),
        "tick.yaml",
        "emitter: client\nevent: tick\naction: count\nwith:\n  step: 10\n",
    );
    let reloaded = handler.reload("tick").expect("Should reload");
    assert_eq!(reloaded.id, "tick");

    // Exactly one subscription, and it is the new instance's.
    assert_eq!(client.listener_count("tick"), 1);
    client.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 11);
}

#[test]
fn programmatic_listeners_cannot_be_reloaded() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let mut handler = handler_in(dir.path(), client, Arc::new(AtomicUsize::new(0)))
        .expect("Should construct");

    handler
        .insert(Listener::new("inline", "client", "tick", |_payload| {}))
        .expect("Should insert");
    handler.register("inline").expect("Should register");

    assert!(matches!(
        handler.reload("inline"),
        Err(HandlerError::NotReloadable(_))
    ));
}

#[test]
fn load_stores_without_registering() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");

    // Manifest written after construction, so load_all never saw it.
    write_manifest(
        dir.path(),
        "late.yaml",
        "emitter: client\nevent: late\naction: count\n",
    );
    let listener = handler
        .load(dir.path().join("late.yaml"))
        .expect("Should load");
    assert_eq!(listener.id, "late");
    assert!(handler.listeners().contains_key("late"));
    assert_eq!(client.listener_count("late"), 0);

    handler.register("late").expect("Should register");
    assert_eq!(client.listener_count("late"), 1);
}

#[test]
fn loading_a_duplicate_id_is_rejected() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "tick.yaml",
        "emitter: client\nevent: tick\naction: count\n",
    );

    let client = Arc::new(Emitter::new());
    let mut handler = handler_in(dir.path(), client, Arc::new(AtomicUsize::new(0)))
        .expect("Should construct");

    assert!(matches!(
        handler.load(dir.path().join("tick.yaml")),
        Err(HandlerError::AlreadyLoaded(_))
    ));
}

#[test]
fn lifecycle_notifications_are_observable() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "tick.yaml",
        "emitter: client\nevent: tick\naction: count\n",
    );

    let client = Arc::new(Emitter::new());
    let mut handler = handler_in(dir.path(), client, Arc::new(AtomicUsize::new(0)))
        .expect("Should construct");

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let lifecycle = handler
        .emitters()
        .get("listener-handler")
        .expect("listener-handler emitter should exist")
        .clone();
    for name in ["add", "remove", "reload", "enable", "disable"] {
        let seen = seen.clone();
        let tag = name.to_string();
        lifecycle.on(
            name,
            Arc::new(move |payload| {
                let id = payload
                    .get("id")
                    .and_then(|i| i.as_str())
                    .unwrap_or("?")
                    .to_string();
                seen.lock().unwrap().push(format!("{}:{}", tag, id));
            }),
        );
    }

    handler.disable("tick").expect("Should disable");
    handler.enable("tick").expect("Should enable");
    handler.reload("tick").expect("Should reload");
    handler.remove("tick").expect("Should remove");

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            "disable:tick",
            "enable:tick",
            "reload:tick",
            "remove:tick"
        ]
    );
}

#[test]
fn disable_unsubscribes_and_enable_resubscribes() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "tick.yaml",
        "emitter: client\nevent: tick\naction: count\n",
    );

    let client = Arc::new(Emitter::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let handler =
        handler_in(dir.path(), client.clone(), counter.clone()).expect("Should construct");

    handler.disable("tick").expect("Should disable");
    assert_eq!(client.listener_count("tick"), 0);
    assert!(!handler.listeners().get("tick").unwrap().enabled());

    client.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    handler.enable("tick").expect("Should enable");
    assert_eq!(client.listener_count("tick"), 1);
    assert!(handler.listeners().get("tick").unwrap().enabled());

    client.emit("tick", &json!({}));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn startup_registration_follows_file_name_order() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    write_manifest(
        dir.path(),
        "b-second.yaml",
        "emitter: client\nevent: tick\naction: count\n",
    );
    write_manifest(
        dir.path(),
        "a-first.yaml",
        "emitter: client\nevent: tick\naction: count\n",
    );
    // Non-manifest files are skipped.
    write_manifest(dir.path(), "notes.txt", "not a listener");

    let client = Arc::new(Emitter::new());
    let handler = handler_in(dir.path(), client, Arc::new(AtomicUsize::new(0)))
        .expect("Should construct");

    let ids: Vec<&str> = handler.listeners().keys().map(|k| k.as_str()).collect();
    assert_eq!(ids, vec!["a-first", "b-second"]);
}
