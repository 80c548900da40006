use serde_json::{json, Value};

use tourney_relay_integration::harness::{bodies, TestHarness};
use tourney_relay_integration::{ALICE, BOB, CAROL};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_ok() {
    let h = TestHarness::setup().await;
    let resp = h.get("/health").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

/// A -> B "hi", B -> A "yo", A -> B "sup", A -> B "again": only the last three remain.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn conversation_keeps_three_most_recent() {
    let h = TestHarness::setup().await;
    h.send(ALICE, BOB, "hi").await;
    h.send(BOB, ALICE, "yo").await;
    h.send(ALICE, BOB, "sup").await;
    h.send(ALICE, BOB, "again").await;

    let conv = h.conversation(ALICE, BOB).await;
    assert_eq!(bodies(&conv), ["yo", "sup", "again"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sent_message_is_canonical_and_unread() {
    let h = TestHarness::setup().await;
    let msg = h.send(ALICE, BOB, "glhf").await;

    assert_eq!(msg["from"], ALICE.to_lowercase());
    assert_eq!(msg["to"], BOB.to_lowercase());
    assert_eq!(msg["body"], "glhf");
    assert_eq!(msg["kind"], "text");
    assert_eq!(msg["read"], false);
    assert!(msg["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(msg["sentAt"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_fields_are_rejected_without_side_effects() {
    let h = TestHarness::setup().await;

    for body in [
        json!({ "from": "", "to": BOB, "message": "x" }),
        json!({ "to": BOB, "message": "x" }),
        json!({ "from": ALICE, "message": "x" }),
        json!({ "from": ALICE, "to": BOB }),
        json!({ "from": ALICE, "to": BOB, "message": "   " }),
    ] {
        let resp = h.post_send(body.clone()).await;
        assert_eq!(resp.status(), 400, "{body}");
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["code"], "validation_error", "{body}");
        assert!(err["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    let conv = h.conversation(ALICE, BOB).await;
    assert!(bodies(&conv).is_empty());
    assert_eq!(h.unread(BOB).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blank_fields_are_named_in_the_error() {
    let h = TestHarness::setup().await;

    for (body, expected) in [
        (json!({ "from": ALICE, "to": BOB, "message": "  \n" }), "message must not be empty or blank"),
        (json!({ "from": " ", "to": BOB, "message": "x" }), "from must not be empty or blank"),
        (json!({ "from": ALICE, "message": "x" }), "to must not be empty or blank"),
    ] {
        let resp = h.post_send(body.clone()).await;
        assert_eq!(resp.status(), 400, "{body}");
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["error"], expected, "{body}");
    }

    let resp = h.get("/chat/unread/%20%20").await;
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"], "wallet must not be empty or blank");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_body_and_unknown_type_are_bad_requests() {
    let h = TestHarness::setup().await;

    let resp = h
        .client
        .post(h.url("/chat/send"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "validation_error");

    let resp = h
        .post_send(json!({ "from": ALICE, "to": BOB, "message": "x", "messageType": "hologram" }))
        .await;
    assert_eq!(resp.status(), 400);

    let resp = h
        .post_send(json!({ "from": ALICE, "to": BOB, "message": "x", "messageType": "TEXT" }))
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wallet_casing_resolves_to_one_conversation() {
    let h = TestHarness::setup().await;
    h.send("0xAB", "0xcd", "one").await;
    h.send("0xab", "0xCD", "two").await;

    let upper = h.conversation("0xAB", "0xcd").await;
    let lower = h.conversation("0xab", "0xCD").await;
    assert_eq!(upper, lower);
    assert_eq!(upper["conversationId"], "0xab_0xcd");
    assert_eq!(bodies(&upper), ["one", "two"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_conversation_lists_both_participants() {
    let h = TestHarness::setup().await;
    let conv = h.conversation(CAROL, ALICE).await;
    assert_eq!(
        conv["participants"],
        json!([CAROL.to_lowercase(), ALICE.to_lowercase()])
    );
    assert_eq!(conv["messages"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reading_clears_only_the_viewers_unread() {
    let h = TestHarness::setup().await;
    h.send(ALICE, BOB, "one").await;
    h.send(ALICE, BOB, "two").await;
    h.send(CAROL, BOB, "three").await;
    h.send(BOB, ALICE, "back").await;

    assert_eq!(h.unread(BOB).await, 3);
    assert_eq!(h.unread(ALICE).await, 1);

    let first = h.conversation(BOB, ALICE).await;
    assert!(first["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["to"] == BOB.to_lowercase())
        .all(|m| m["read"] == true));
    assert_eq!(h.unread(BOB).await, 1);
    assert_eq!(h.unread(ALICE).await, 1);

    let second = h.conversation(BOB, ALICE).await;
    assert_eq!(first, second);
    assert_eq!(h.unread(BOB).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cors_allows_any_origin() {
    let h = TestHarness::setup().await;
    let resp = h
        .client
        .get(h.url("/health"))
        .header("origin", "https://arena.example")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
