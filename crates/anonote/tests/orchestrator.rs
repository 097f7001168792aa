//! End-to-end submission flows over scripted relay transports.

use anonote::storage::{ClientStorage, LAST_SUBMIT_TIME, TARGET_SUBMISSIONS};
use anonote::{limits, subs, Client, ClientConfig, Outcome, SubmitOptions};

use anostr::{LinkEvent, NoteId, RelayPool, ScriptedIo};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A relay transport that acks profile (kind 0) and note (kind 1)
/// events independently.
fn kind_aware_io(accept_profile: bool, accept_note: bool) -> ScriptedIo {
    ScriptedIo::opened().with_responder(move |sent| {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(sent) else {
            return vec![];
        };
        let Some(event) = value.get(1).filter(|v| v.is_object()) else {
            return vec![]; // REQ or CLOSE, no ack
        };

        let id = event.get("id").and_then(|v| v.as_str()).unwrap_or_default();
        let accepted = match event.get("kind").and_then(|v| v.as_u64()) {
            Some(0) => accept_profile,
            _ => accept_note,
        };
        vec![LinkEvent::Text(format!("[\"OK\",\"{id}\",{accepted},\"\"]"))]
    })
}

fn test_config() -> ClientConfig {
    ClientConfig {
        relays: vec![
            "wss://relay-a.example.com".to_owned(),
            "wss://relay-b.example.com".to_owned(),
            "wss://relay-c.example.com".to_owned(),
        ],
        tor_relays: vec!["ws://onion-a.example.onion".to_owned()],
        // keep the global cooldown out of the way unless a test wants it
        cooldown: Duration::ZERO,
        publish_deadline: Duration::from_millis(200),
    }
}

fn accepting_client(config: ClientConfig) -> Client<ScriptedIo, StdRng> {
    Client::new(
        RelayPool::new(|_: &str| Ok(kind_aware_io(true, true))),
        ClientStorage::in_memory(),
        config,
        StdRng::seed_from_u64(7),
    )
}

#[test]
fn successful_submit_updates_session_state() {
    init_tracing();
    let mut client = accepting_client(test_config());

    let outcome = client
        .submit("hello from nowhere #intros", &SubmitOptions::default())
        .expect("submit");

    let &Outcome::Published {
        event_id,
        accepted,
        total,
        hopped,
    } = &outcome
    else {
        panic!("expected Published, got {outcome:?}");
    };
    assert_eq!((accepted, total, hopped), (3, 3, false));

    // thread now rooted on our own first note
    assert_eq!(client.thread().last(), Some(&event_id));
    assert_eq!(client.thread().root(), Some(&event_id));

    // the id is saved for reply subscriptions, the cooldown is stamped
    assert_eq!(subs::saved_event_ids(client.storage()), vec![event_id]);
    assert!(client.storage().get::<u64>(LAST_SUBMIT_TIME).is_some());

    // each relay saw the profile, then the note, then the renewal REQ
    for relay in &client.pool_mut().relays {
        assert_eq!(relay.io.sent.len(), 3, "relay {}", relay.url);
        assert!(relay.io.sent[0].contains("\"kind\":0"));
        assert!(relay.io.sent[1].contains("\"kind\":1"));
        assert!(relay.io.sent[2].starts_with("[\"REQ\""));
    }
}

#[test]
fn one_failing_relay_degrades_to_partial_success() {
    init_tracing();
    let mut client = Client::new(
        RelayPool::new(|url: &str| {
            Ok(if url.contains("relay-b") {
                // accepts the profile so the action proceeds, then
                // rejects the note itself
                kind_aware_io(true, false)
            } else {
                kind_aware_io(true, true)
            })
        }),
        ClientStorage::in_memory(),
        test_config(),
        StdRng::seed_from_u64(7),
    );

    let outcome = client
        .submit("mostly delivered", &SubmitOptions::default())
        .expect("submit");

    assert!(outcome.is_success());
    assert!(outcome.is_partial());
    let &Outcome::Published { accepted, total, .. } = &outcome else {
        panic!("expected Published, got {outcome:?}");
    };
    assert_eq!((accepted, total), (2, 3));
}

#[test]
fn cooldown_blocks_rapid_resubmission() {
    init_tracing();
    let mut config = test_config();
    config.cooldown = Duration::from_secs(30);
    let mut client = accepting_client(config);

    client
        .storage()
        .put(LAST_SUBMIT_TIME, &anonote::unix_time_secs())
        .expect("stamp");

    let outcome = client
        .submit("too soon", &SubmitOptions::default())
        .expect("submit");
    let &Outcome::Cooldown { wait_secs } = &outcome else {
        panic!("expected Cooldown, got {outcome:?}");
    };
    assert!(wait_secs > 0 && wait_secs <= 30);

    // nothing was published or recorded
    assert!(subs::saved_event_ids(client.storage()).is_empty());
    assert!(client.pool_mut().relays.is_empty());
}

#[test]
fn blank_input_is_rejected_before_any_work() {
    init_tracing();
    let mut client = accepting_client(test_config());

    let outcome = client.submit("   ", &SubmitOptions::default()).expect("submit");
    assert_eq!(outcome, Outcome::EmptyInput);
    assert!(client.pool_mut().relays.is_empty());
}

#[test]
fn duplicate_content_is_suppressed() {
    init_tracing();
    let mut client = accepting_client(test_config());

    let first = client
        .submit("only once", &SubmitOptions::default())
        .expect("submit");
    assert!(first.is_success());

    let second = client
        .submit("only once", &SubmitOptions::default())
        .expect("submit");
    assert_eq!(second, Outcome::Duplicate);

    assert_eq!(subs::saved_event_ids(client.storage()).len(), 1);
}

#[test]
fn rate_limited_target_aborts_without_consuming_quota() {
    init_tracing();
    let mut client = accepting_client(test_config());

    // exhaust the hashtag's window up front
    let now = anonote::unix_time_secs();
    let mut windows: HashMap<String, Vec<u64>> = HashMap::new();
    windows.insert("#flood".to_owned(), vec![now; limits::MAX_PER_TARGET]);
    client
        .storage()
        .put(TARGET_SUBMISSIONS, &windows)
        .expect("prefill");

    let outcome = client
        .submit("more #flood and a #freshtag", &SubmitOptions::default())
        .expect("submit");
    assert_eq!(
        outcome,
        Outcome::RateLimited {
            target: "#flood".to_owned()
        }
    );

    // the fresh target was not charged for the aborted action
    let windows: HashMap<String, Vec<u64>> = client
        .storage()
        .get(TARGET_SUBMISSIONS)
        .expect("windows");
    assert!(!windows.contains_key("#freshtag"));
    assert!(client.pool_mut().relays.is_empty());
}

#[test]
fn profile_rejection_aborts_the_whole_action() {
    init_tracing();
    let mut client = Client::new(
        RelayPool::new(|_: &str| Ok(kind_aware_io(false, true))),
        ClientStorage::in_memory(),
        test_config(),
        StdRng::seed_from_u64(7),
    );

    let outcome = client
        .submit("nobody will see this #lost", &SubmitOptions::default())
        .expect("submit");
    assert_eq!(outcome, Outcome::ProfilePublishFailed);

    // no note was signed or remembered...
    assert!(subs::saved_event_ids(client.storage()).is_empty());
    assert_eq!(client.thread().last(), None);

    // ...but the pre-flight quota stays consumed (consume-always)
    let windows: HashMap<String, Vec<u64>> = client
        .storage()
        .get(TARGET_SUBMISSIONS)
        .expect("windows");
    assert_eq!(windows["#lost"].len(), 1);

    // only profile events went out
    for relay in &client.pool_mut().relays {
        assert_eq!(relay.io.sent.len(), 1);
        assert!(relay.io.sent[0].contains("\"kind\":0"));
    }
}

#[test]
fn content_rejection_reports_failure_but_keeps_counters() {
    init_tracing();
    let mut client = Client::new(
        RelayPool::new(|_: &str| Ok(kind_aware_io(true, false))),
        ClientStorage::in_memory(),
        test_config(),
        StdRng::seed_from_u64(7),
    );

    let outcome = client
        .submit("swallowed by the void", &SubmitOptions::default())
        .expect("submit");
    assert_eq!(outcome, Outcome::ContentPublishFailed);

    // the signed note was remembered even though delivery failed
    assert_eq!(subs::saved_event_ids(client.storage()).len(), 1);
    assert!(client.thread().last().is_some());

    // no dedup record and no cooldown stamp for undelivered content
    assert!(limits::check_duplicate(
        client.storage(),
        "swallowed by the void",
        anonote::unix_time_secs()
    ));
    assert_eq!(client.storage().get::<u64>(LAST_SUBMIT_TIME), None);
}

#[test]
fn reply_carries_the_parent_tag_on_the_wire() {
    init_tracing();
    let mut client = accepting_client(test_config());
    let parent = NoteId::new([9; 32]);

    let outcome = client
        .reply("good point", &parent, &SubmitOptions::default())
        .expect("reply");
    assert!(outcome.is_success(), "got {outcome:?}");

    let sent = &client.pool_mut().relays[0].io.sent;
    let event: serde_json::Value = serde_json::from_str(&sent[1]).expect("event json");
    let tags = event[1]["tags"].as_array().expect("tags");
    assert_eq!(
        tags[0],
        serde_json::json!(["e", parent.hex(), "", "reply"])
    );

    // the parent's window was charged
    let windows: HashMap<String, Vec<u64>> = client
        .storage()
        .get(TARGET_SUBMISSIONS)
        .expect("windows");
    assert_eq!(windows[&parent.hex()].len(), 1);
}

#[test]
fn chained_submissions_form_a_thread() {
    init_tracing();
    let options = SubmitOptions {
        reply_chain: true,
        ..SubmitOptions::default()
    };
    let mut client = accepting_client(test_config());

    let first = client.submit("thread start", &options).expect("submit");
    let &Outcome::Published { event_id: first_id, .. } = &first else {
        panic!("expected Published, got {first:?}");
    };

    let second = client.submit("thread continues", &options).expect("submit");
    assert!(second.is_success());

    // the second note replies to the first and roots the thread on it
    let sent = &client.pool_mut().relays[0].io.sent;
    let event: serde_json::Value = serde_json::from_str(&sent[4]).expect("event json");
    let tags = event[1]["tags"].as_array().expect("tags");
    assert_eq!(tags[0], serde_json::json!(["e", first_id.hex(), "", "root"]));
    assert_eq!(tags[1], serde_json::json!(["e", first_id.hex(), "", "reply"]));
}

#[test]
fn hop_publishes_through_a_single_relay() {
    init_tracing();
    let options = SubmitOptions {
        relay_hop: true,
        ..SubmitOptions::default()
    };
    let mut client = accepting_client(test_config());

    let outcome = client.submit("quietly now", &options).expect("submit");
    let &Outcome::Published { hopped, accepted, .. } = &outcome else {
        panic!("expected Published, got {outcome:?}");
    };
    assert!(hopped);
    assert_eq!(accepted, 1);

    // at most two relays were ever contacted: one for the profile hop,
    // one for the note hop
    let contacted = client
        .pool_mut()
        .relays
        .iter()
        .filter(|relay| relay.io.sent.iter().any(|msg| msg.starts_with("[\"EVENT\"")))
        .count();
    assert!(contacted <= 2, "contacted {contacted} relays");
}

#[test]
fn tor_option_selects_the_onion_relay_set() {
    init_tracing();
    let options = SubmitOptions {
        use_tor_relays: true,
        ..SubmitOptions::default()
    };
    let mut client = accepting_client(test_config());

    let outcome = client.submit("over onions", &options).expect("submit");
    let &Outcome::Published { total, .. } = &outcome else {
        panic!("expected Published, got {outcome:?}");
    };
    assert_eq!(total, 1);

    assert!(client
        .pool_mut()
        .relays
        .iter()
        .all(|relay| relay.url.contains("onion")));
}
