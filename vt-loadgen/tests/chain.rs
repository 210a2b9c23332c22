mod common;

use axum::http::{Method, StatusCode};
use common::{refused_uri, spawn_stub, Behavior};
use vt_loadgen::{run_chain, ItemClient, Lot, TaskError, Transport, TransportKind};

const ONLY_ONE_CLIENT: &str = "/item/onlyoneclient";

fn client(base_uri: &str) -> ItemClient {
    ItemClient::new(base_uri, Transport::new(TransportKind::PerCall, None))
}

#[tokio::test]
async fn created_key_is_threaded_into_update_and_read() {
    let (uri, stub) = spawn_stub(Behavior::default()).await;
    let lot = Lot::generate();

    let outcome = run_chain(&client(&uri), &lot, 5).await;
    assert_eq!(outcome.key(), Some("abc123"));
    assert!(outcome.update.unwrap().is_ok());
    assert!(outcome.read.unwrap().is_ok());

    let puts = stub.hits_for(Method::PUT, ONLY_ONE_CLIENT);
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].body, serde_json::json!({ "key": "abc123" }));

    let gets = stub.hits_for(Method::GET, ONLY_ONE_CLIENT);
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].query.as_deref(), Some("key=abc123"));
}

#[tokio::test]
async fn keys_needing_escapes_survive_the_query() {
    let behavior = Behavior {
        create_key: "a/b c".to_owned(),
        ..Behavior::default()
    };
    let (uri, stub) = spawn_stub(behavior).await;

    let outcome = run_chain(&client(&uri), &Lot::generate(), 0).await;
    assert!(outcome.read.unwrap().is_ok());
    let gets = stub.hits_for(Method::GET, ONLY_ONE_CLIENT);
    assert_eq!(gets[0].query.as_deref(), Some("key=a%2Fb+c"));
    let puts = stub.hits_for(Method::PUT, ONLY_ONE_CLIENT);
    assert_eq!(puts[0].body["key"], "a/b c");
}

#[tokio::test]
async fn refused_create_skips_update_and_read() {
    let uri = refused_uri().await;

    let outcome = run_chain(&client(&uri), &Lot::generate(), 0).await;
    assert!(matches!(outcome.create, Err(TaskError::Transport(_))));
    assert!(outcome.update.is_none());
    assert!(outcome.read.is_none());
}

#[tokio::test]
async fn rejected_create_never_reaches_update_or_read() {
    let behavior = Behavior::default().respond(
        Method::POST,
        ONLY_ONE_CLIENT,
        StatusCode::INTERNAL_SERVER_ERROR,
        "datastore unavailable",
    );
    let (uri, stub) = spawn_stub(behavior).await;

    let outcome = run_chain(&client(&uri), &Lot::generate(), 0).await;
    assert_eq!(outcome.create.unwrap_err().status(), Some(500));
    assert!(outcome.update.is_none());
    assert!(outcome.read.is_none());
    assert!(stub.hits_for(Method::PUT, ONLY_ONE_CLIENT).is_empty());
    assert!(stub.hits_for(Method::GET, ONLY_ONE_CLIENT).is_empty());
}

#[tokio::test]
async fn failed_update_still_reads() {
    let behavior = Behavior::default().respond(
        Method::PUT,
        ONLY_ONE_CLIENT,
        StatusCode::CONFLICT,
        "stale",
    );
    let (uri, stub) = spawn_stub(behavior).await;

    let outcome = run_chain(&client(&uri), &Lot::generate(), 0).await;
    let update_err = outcome.update.unwrap().unwrap_err();
    assert_eq!(update_err.status(), Some(409));
    assert!(outcome.read.unwrap().is_ok());
    assert_eq!(stub.hits_for(Method::GET, ONLY_ONE_CLIENT).len(), 1);
}

#[tokio::test]
async fn empty_key_stops_the_chain() {
    let behavior = Behavior::default().respond(
        Method::POST,
        ONLY_ONE_CLIENT,
        StatusCode::OK,
        r#"{"key":""}"#,
    );
    let (uri, stub) = spawn_stub(behavior).await;

    let outcome = run_chain(&client(&uri), &Lot::generate(), 0).await;
    assert!(matches!(outcome.create, Err(TaskError::Decode(_))), "{:?}", outcome.create);
    assert!(outcome.update.is_none());
    assert!(outcome.read.is_none());
    assert!(stub.hits_for(Method::PUT, ONLY_ONE_CLIENT).is_empty());
    assert!(stub.hits_for(Method::GET, ONLY_ONE_CLIENT).is_empty());
}
