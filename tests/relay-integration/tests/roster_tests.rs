use axum::http::StatusCode;
use serde_json::{json, Value};

use tourney_relay_integration::harness::TestHarness;
use tourney_relay_integration::{ALICE, BOB, CAROL, DAVE};

fn wallets(body: &Value) -> Vec<String> {
    body["users"]
        .as_array()
        .expect("users array")
        .iter()
        .map(|u| u["walletAddress"].as_str().expect("walletAddress").to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lists_co_participants_of_live_tournaments() {
    let h = TestHarness::setup().await;

    let resp = h.available_users(ALICE).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    // Dave only shares a finished tournament with Alice.
    assert_eq!(wallets(&body), [BOB.to_lowercase(), CAROL.to_lowercase()]);
    assert_eq!(body["count"], 2);

    let bob = &body["users"][0];
    assert_eq!(bob["displayName"], "Bob");
    assert_eq!(bob["handles"], json!({}));
    assert_eq!(bob["unreadCount"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duplicates_across_tournaments_keep_first_entry() {
    let h = TestHarness::setup().await;

    let body: Value = h.available_users(BOB).await.json().await.unwrap();
    assert_eq!(
        wallets(&body),
        [ALICE.to_lowercase(), CAROL.to_lowercase(), DAVE.to_lowercase()]
    );
    assert_eq!(body["users"][0]["handles"]["x"], "@alice");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn peers_carry_unread_counts() {
    let h = TestHarness::setup().await;
    h.send(BOB, ALICE, "ready?").await;
    h.send(BOB, ALICE, "ping").await;
    h.send(CAROL, ALICE, "gg").await;
    h.send(ALICE, CAROL, "gg wp").await;

    let body: Value = h.available_users(&ALICE.to_uppercase()).await.json().await.unwrap();
    let counts: Vec<u64> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["unreadCount"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, [2, 1]);

    h.conversation(ALICE, BOB).await;
    let body: Value = h.available_users(ALICE).await.json().await.unwrap();
    assert_eq!(body["users"][0]["unreadCount"], 0);
    assert_eq!(body["users"][1]["unreadCount"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn roster_outage_is_bad_gateway_and_chat_keeps_working() {
    let h = TestHarness::setup().await;
    h.send(ALICE, BOB, "before").await;

    h.roster.fail_with(StatusCode::SERVICE_UNAVAILABLE);
    let resp = h.available_users(ALICE).await;
    assert_eq!(resp.status(), 502);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "upstream_unavailable");

    // Conversation traffic does not depend on the roster.
    h.send(ALICE, BOB, "during").await;
    assert_eq!(h.unread(BOB).await, 2);

    h.roster.recover();
    assert_eq!(h.available_users(ALICE).await.status(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unparseable_roster_is_bad_gateway() {
    let h = TestHarness::setup().await;
    h.roster.set_games(json!(["not", "a", "games", "map"]));

    let resp = h.available_users(ALICE).await;
    assert_eq!(resp.status(), 502);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wallet_outside_every_tournament_has_no_peers() {
    let h = TestHarness::setup().await;
    let body: Value = h.available_users("0xfeedface").await.json().await.unwrap();
    assert_eq!(body["count"], 0);
    assert_eq!(body["users"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_participant_entry_is_skipped() {
    let h = TestHarness::setup().await;
    h.roster.set_games(json!({
        "darts": {
            "tournaments": {
                "open": {
                    "status": "active",
                    "participants": [
                        { "walletAddress": ALICE },
                        { "walletAddress": 42, "displayName": "Nobody" },
                        { "walletAddress": BOB, "displayName": { "first": "Bob" } },
                        { "walletAddress": CAROL, "displayName": "Carol" }
                    ]
                }
            }
        }
    }));

    let resp = h.available_users(ALICE).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(wallets(&body), [BOB.to_lowercase(), CAROL.to_lowercase()]);
    assert_eq!(body["users"][0]["displayName"], Value::Null);
}
