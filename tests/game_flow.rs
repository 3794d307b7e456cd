// End-to-end game flow tests against a real Postgres container.

mod common;

use common::{
    TestApp, join_player, leave_game, restart_game, spawn_app, start_game, submit_word,
};

async fn two_player_game(app: &TestApp) -> (String, common::TestPlayer, common::TestPlayer) {
    let game = app.create_game().await;
    let game_id = game["id"].as_str().unwrap().to_string();

    let alice = join_player(app, &game_id, "Alice").await;
    let bob = join_player(app, &game_id, "Bob").await;

    // Pin the seed letter so the scripted chain is valid.
    app.set_last_word(&game_id, "a").await;

    (game_id, alice, bob)
}

#[tokio::test]
async fn test_create_game_defaults() {
    let app = spawn_app().await;
    let game = app.create_game().await;

    assert_eq!(game["status"], "WAITING");
    assert_eq!(game["currentTurn"], 0);
    assert_eq!(game["id"].as_str().unwrap().len(), 5);
    assert_eq!(game["settings"]["wordLength"], 3);
    assert_eq!(game["settings"]["turnTime"], 60);
    assert_eq!(game["settings"]["maxTurns"], 10);
    assert_eq!(game["settings"]["locale"], "en");
    // Seeded with a single letter.
    assert_eq!(game["lastWord"].as_str().unwrap().len(), 1);
    assert!(game["players"].as_array().unwrap().is_empty());

    app.stop().await;
}

#[tokio::test]
async fn test_basic_play_chains_and_scores() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;

    let res = start_game(&app, &alice, &game_id, serde_json::json!({})).await;
    assert_eq!(res.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["status"], "PLAYING");
    assert_eq!(game["currentPlayerId"], alice.id.as_str());
    // The driver may already have ticked once.
    let left = game["turnTimeLeft"].as_i64().unwrap();
    assert!((58..=60).contains(&left), "turnTimeLeft = {left}");

    // Alice opens with "apple" off the pinned seed letter.
    let res = submit_word(&app, &alice, &game_id, "apple", 5.0).await;
    assert_eq!(res.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["lastWord"], "apple");
    assert_eq!(game["currentTurn"], 1);
    assert_eq!(game["currentPlayerId"], bob.id.as_str());

    let leaderboard = game["leaderboard"].as_array().unwrap();
    let alice_row = leaderboard.iter().find(|e| e["id"] == alice.id.as_str()).unwrap();
    assert_eq!(alice_row["score"], 9.0);

    // Bob chains off the final 'e'.
    let res = submit_word(&app, &bob, &game_id, "elephant", 5.0).await;
    assert_eq!(res.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["lastWord"], "elephant");
    assert_eq!(game["currentTurn"], 2);
    assert_eq!(game["currentPlayerId"], alice.id.as_str());

    let leaderboard = game["leaderboard"].as_array().unwrap();
    let bob_row = leaderboard.iter().find(|e| e["id"] == bob.id.as_str()).unwrap();
    assert_eq!(bob_row["score"], 22.0);
    // Leaderboard total equals the sum of recorded word scores.
    let words = game["words"].as_array().unwrap();
    let total: f64 = words.iter().map(|w| w["score"].as_f64().unwrap()).sum();
    assert!((total - 31.0).abs() < 1e-9);

    app.stop().await;
}

#[tokio::test]
async fn test_chain_violation_rejected() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);
    assert_eq!(submit_word(&app, &alice, &game_id, "apple", 5.0).await.status(), 204);

    let before = app.game_json(&game_id).await;

    // "banana" does not chain from "apple".
    let res = submit_word(&app, &bob, &game_id, "banana", 5.0).await;
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("must start with 'e'"));

    // No state change.
    let after = app.game_json(&game_id).await;
    assert_eq!(after["currentTurn"], before["currentTurn"]);
    assert_eq!(after["lastWord"], before["lastWord"]);
    assert_eq!(
        after["words"].as_array().unwrap().len(),
        before["words"].as_array().unwrap().len()
    );

    app.stop().await;
}

#[tokio::test]
async fn test_duplicate_word_rejected() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);
    assert_eq!(submit_word(&app, &alice, &game_id, "apple", 5.0).await.status(), 204);

    // Constructed scenario: the chain loops back to needing an 'a' word.
    app.set_last_word(&game_id, "a").await;

    let res = submit_word(&app, &bob, &game_id, "apple", 5.0).await;
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("already been played"));

    // No GameWord inserted.
    let game = app.game_json(&game_id).await;
    assert_eq!(game["words"].as_array().unwrap().len(), 1);

    app.stop().await;
}

#[tokio::test]
async fn test_empty_word_is_invalid_not_timeout() {
    let app = spawn_app().await;
    let (game_id, alice, _bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);

    let res = submit_word(&app, &alice, &game_id, "", 5.0).await;
    assert_eq!(res.status(), 400);

    // No timeout record appeared.
    let game = app.game_json(&game_id).await;
    assert!(game["words"].as_array().unwrap().is_empty());
    assert_eq!(game["currentTurn"], 0);

    app.stop().await;
}

#[tokio::test]
async fn test_short_dictionary_word_rejected() {
    let app = spawn_app().await;
    let (game_id, alice, _bob) = two_player_game(&app).await;
    app.set_last_word(&game_id, "o").await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);

    // "ox" is in the dictionary but below word_length = 3.
    let res = submit_word(&app, &alice, &game_id, "ox", 5.0).await;
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("at least 3 letters"));

    app.stop().await;
}

#[tokio::test]
async fn test_unknown_word_rejected() {
    let app = spawn_app().await;
    let (game_id, alice, _bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);

    let res = submit_word(&app, &alice, &game_id, "azxqv", 5.0).await;
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("dictionary"));

    app.stop().await;
}

#[tokio::test]
async fn test_start_requires_two_players() {
    let app = spawn_app().await;
    let game = app.create_game().await;
    let game_id = game["id"].as_str().unwrap().to_string();
    let alice = join_player(&app, &game_id, "Alice").await;

    let repo = shiritori_be::db::game::GameRepository::new(app.pg_pool.clone());
    assert!(repo.find_startable(&game_id).await.unwrap().is_none());

    let res = start_game(&app, &alice, &game_id, serde_json::json!({})).await;
    assert_eq!(res.status(), 400);

    let _bob = join_player(&app, &game_id, "Bob").await;
    assert!(repo.find_startable(&game_id).await.unwrap().is_some());

    let res = start_game(&app, &alice, &game_id, serde_json::json!({})).await;
    assert_eq!(res.status(), 204);

    app.stop().await;
}

#[tokio::test]
async fn test_only_host_can_start() {
    let app = spawn_app().await;
    let (game_id, _alice, bob) = two_player_game(&app).await;

    let res = start_game(&app, &bob, &game_id, serde_json::json!({})).await;
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("host"));

    app.stop().await;
}

#[tokio::test]
async fn test_setting_overrides_validated_and_applied() {
    let app = spawn_app().await;
    let (game_id, alice, _bob) = two_player_game(&app).await;

    let res = start_game(&app, &alice, &game_id, serde_json::json!({ "turnTime": 10 })).await;
    assert_eq!(res.status(), 400);

    let res = start_game(
        &app,
        &alice,
        &game_id,
        serde_json::json!({ "turnTime": 30, "maxTurns": 5, "wordLength": 4 }),
    )
    .await;
    assert_eq!(res.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["settings"]["turnTime"], 30);
    assert_eq!(game["settings"]["maxTurns"], 5);
    assert_eq!(game["settings"]["wordLength"], 4);
    let left = game["turnTimeLeft"].as_i64().unwrap();
    assert!((28..=30).contains(&left), "turnTimeLeft = {left}");

    app.stop().await;
}

#[tokio::test]
async fn test_name_collision_conflicts() {
    let app = spawn_app().await;
    let game = app.create_game().await;
    let game_id = game["id"].as_str().unwrap().to_string();
    let _alice = join_player(&app, &game_id, "Alice").await;

    let client = app.http();
    let res = client
        .post(format!("{}/games/{}/join", app.base_url, game_id))
        .json(&serde_json::json!({ "name": "Alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    app.stop().await;
}

#[tokio::test]
async fn test_join_rejected_once_started() {
    let app = spawn_app().await;
    let (game_id, alice, _bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);

    let client = app.http();
    let res = client
        .post(format!("{}/games/{}/join", app.base_url, game_id))
        .json(&serde_json::json!({ "name": "Carol" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    app.stop().await;
}

#[tokio::test]
async fn test_out_of_turn_submission_rejected() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);

    // It's Alice's turn, not Bob's.
    let res = submit_word(&app, &bob, &game_id, "apple", 5.0).await;
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("not your turn"));

    app.stop().await;
}

#[tokio::test]
async fn test_host_leaving_midplay_promotes_earliest() {
    let app = spawn_app().await;
    let game = app.create_game().await;
    let game_id = game["id"].as_str().unwrap().to_string();

    let p1 = join_player(&app, &game_id, "P1").await;
    let p2 = join_player(&app, &game_id, "P2").await;
    let p3 = join_player(&app, &game_id, "P3").await;
    app.set_last_word(&game_id, "a").await;

    assert_eq!(start_game(&app, &p1, &game_id, serde_json::json!({})).await.status(), 204);
    // P1 plays; the turn passes to P2.
    assert_eq!(submit_word(&app, &p1, &game_id, "apple", 5.0).await.status(), 204);

    assert_eq!(leave_game(&app, &p1, &game_id).await.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["status"], "PLAYING");
    // Earliest remaining player inherits the host seat.
    let players = game["players"].as_array().unwrap();
    let p2_row = players.iter().find(|p| p["id"] == p2.id.as_str()).unwrap();
    assert_eq!(p2_row["type"], "HOST");

    let repo = shiritori_be::db::player::PlayerRepository::new(app.pg_pool.clone());
    let participants = repo.players(&game_id, true).await.unwrap();
    assert_eq!(participants.len(), 2);
    // Still P2's turn: it never referenced the departed player.
    assert_eq!(game["currentPlayerId"], p2.id.as_str());

    // Turn order now rotates over {P2, P3}: turn 2 lands on index 0 (P2),
    // turn 3 on index 1 (P3).
    assert_eq!(submit_word(&app, &p2, &game_id, "elephant", 5.0).await.status(), 204);
    let game = app.game_json(&game_id).await;
    assert_eq!(game["currentPlayerId"], p2.id.as_str());

    assert_eq!(submit_word(&app, &p2, &game_id, "tiger", 5.0).await.status(), 204);
    let game = app.game_json(&game_id).await;
    assert_eq!(game["currentPlayerId"], p3.id.as_str());

    app.stop().await;
}

#[tokio::test]
async fn test_under_quorum_finishes_game() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);
    assert_eq!(submit_word(&app, &alice, &game_id, "apple", 5.0).await.status(), 204);

    assert_eq!(leave_game(&app, &bob, &game_id).await.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["status"], "FINISHED");
    assert_eq!(game["winnerId"], alice.id.as_str());

    let winner = app
        .state
        .engine()
        .get_winner(&game_id)
        .await
        .unwrap()
        .expect("finished game has a winner");
    assert_eq!(winner.id, alice.id);

    app.stop().await;
}

#[tokio::test]
async fn test_forced_timeout_charges_current_player() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(
        start_game(&app, &alice, &game_id, serde_json::json!({ "turnTime": 30 })).await.status(),
        204
    );

    // The driver spawned by start claims the game; borrow its token.
    let mut task_id = None;
    for _ in 0..20 {
        let row: (Option<uuid::Uuid>,) = sqlx::query_as("SELECT task_id FROM game WHERE id = $1")
            .bind(&game_id)
            .fetch_one(&app.pg_pool)
            .await
            .unwrap();
        if let (Some(id),) = row {
            task_id = Some(id);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }
    let task_id = task_id.expect("turn driver never claimed the game");

    let outcome = app
        .state
        .engine()
        .force_timeout(&game_id, task_id)
        .await
        .unwrap();
    assert!(!outcome.finished);

    let game = app.game_json(&game_id).await;
    let words = game["words"].as_array().unwrap();
    assert_eq!(words.len(), 1);
    assert!(words[0]["word"].is_null());
    assert_eq!(words[0]["score"], -7.5);
    assert_eq!(words[0]["duration"], 30.0);

    assert_eq!(game["currentTurn"], 1);
    assert_eq!(game["currentPlayerId"], bob.id.as_str());
    // Reset for the next turn (the live driver may already have ticked).
    let left = game["turnTimeLeft"].as_i64().unwrap();
    assert!((27..=30).contains(&left), "turnTimeLeft = {left}");

    // A stale token no longer has authority.
    let err = app
        .state
        .engine()
        .force_timeout(&game_id, uuid::Uuid::new_v4())
        .await;
    assert!(err.is_err());

    app.stop().await;
}

#[tokio::test]
async fn test_max_turns_exhaustion_crowns_winner() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(
        start_game(&app, &alice, &game_id, serde_json::json!({ "maxTurns": 5 })).await.status(),
        204
    );

    // apple -> elephant -> tiger -> rabbit -> tomato -> orange
    let turns = [
        (&alice, "apple"),
        (&bob, "elephant"),
        (&alice, "tiger"),
        (&bob, "rabbit"),
        (&alice, "tomato"),
        (&bob, "orange"),
    ];
    for (player, word) in turns {
        let res = submit_word(&app, player, &game_id, word, 5.0).await;
        assert_eq!(res.status(), 204, "{word} was rejected");
    }

    let game = app.game_json(&game_id).await;
    assert_eq!(game["status"], "FINISHED");
    // Bob: elephant 22 + rabbit 13 + orange 10 = 45
    // Alice: apple 9 + tiger 6 + tomato 11 = 26
    assert_eq!(game["winnerId"], bob.id.as_str());
    let leaderboard = game["leaderboard"].as_array().unwrap();
    assert_eq!(leaderboard[0]["id"], bob.id.as_str());
    assert_eq!(leaderboard[0]["score"], 45.0);
    assert_eq!(leaderboard[1]["score"], 26.0);

    // Further turns are rejected.
    let res = submit_word(&app, &alice, &game_id, "eagle", 5.0).await;
    assert_eq!(res.status(), 400);

    app.stop().await;
}

#[tokio::test]
async fn test_restart_resets_finished_game() {
    let app = spawn_app().await;
    let (game_id, alice, bob) = two_player_game(&app).await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);
    assert_eq!(submit_word(&app, &alice, &game_id, "apple", 5.0).await.status(), 204);
    assert_eq!(leave_game(&app, &bob, &game_id).await.status(), 204);
    assert_eq!(app.game_json(&game_id).await["status"], "FINISHED");

    // Restart is host-only; Bob's stale session has no standing.
    assert_eq!(restart_game(&app, &bob, &game_id).await.status(), 400);

    let res = restart_game(&app, &alice, &game_id).await;
    assert_eq!(res.status(), 204);

    let game = app.game_json(&game_id).await;
    assert_eq!(game["status"], "WAITING");
    assert_eq!(game["currentTurn"], 0);
    assert!(game["winnerId"].is_null());
    assert!(game["words"].as_array().unwrap().is_empty());
    assert_eq!(game["lastWord"].as_str().unwrap().len(), 1);

    // The reset game can fill up and start again.
    let dave = join_player(&app, &game_id, "Dave").await;
    assert_eq!(start_game(&app, &alice, &game_id, serde_json::json!({})).await.status(), 204);
    let game = app.game_json(&game_id).await;
    assert_eq!(game["status"], "PLAYING");
    let _ = dave;

    app.stop().await;
}
