use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use taskboard::http::{app, AppState};
use taskboard::{auth, db};

struct Harness {
    app: Router,
    alice: String,
    bob: String,
}

fn harness() -> Harness {
    let conn = db::open_memory().unwrap();
    let (_, alice) = auth::create_user(&conn, "alice").unwrap();
    let (_, bob) = auth::create_user(&conn, "bob").unwrap();
    Harness {
        app: app(AppState::new(conn), None),
        alice,
        bob,
    }
}

impl Harness {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create_board(&self, name: &str, columns: &[&str]) -> Value {
        let columns: Vec<Value> = columns.iter().map(|c| json!({ "name": c })).collect();
        let (status, body) = self
            .send(
                Method::POST,
                "/boards",
                Some(&self.alice),
                Some(json!({ "name": name, "columns": columns })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    async fn create_task(&self, column_id: i64, title: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/tasks",
                Some(&self.alice),
                Some(json!({ "columnId": column_id, "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    async fn board(&self, board_id: i64) -> Value {
        let (status, body) = self
            .send(Method::GET, &format!("/boards/{board_id}"), Some(&self.alice), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }
}

fn ids_and_positions(items: &Value) -> Vec<(i64, i64)> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|v| (v["id"].as_i64().unwrap(), v["position"].as_i64().unwrap()))
        .collect()
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let h = harness();
    let (status, body) = h.send(Method::GET, "/boards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_error");
    assert!(body.get("data").is_none());

    let (status, _) = h.send(Method::GET, "/boards", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_board_has_dense_columns_and_is_default() {
    let h = harness();
    let board = h.create_board("Work", &["Todo", "Doing", "Done"]).await;
    assert_eq!(board["name"], "Work");
    assert_eq!(board["isDefault"], true);
    assert_eq!(board["position"], 1);
    let positions: Vec<i64> = ids_and_positions(&board["columns"])
        .into_iter()
        .map(|(_, p)| p)
        .collect();
    assert_eq!(positions, vec![1, 2, 3]);

    let second = h.create_board("Home", &[]).await;
    assert_eq!(second["isDefault"], false);
    assert_eq!(second["position"], 2);
}

#[tokio::test]
async fn reorder_boards_rewrites_positions() {
    let h = harness();
    let a = h.create_board("A", &[]).await["id"].as_i64().unwrap();
    let b = h.create_board("B", &[]).await["id"].as_i64().unwrap();
    let c = h.create_board("C", &[]).await["id"].as_i64().unwrap();

    let (status, body) = h
        .send(
            Method::POST,
            "/boards/reorder",
            Some(&h.alice),
            Some(json!({ "items": [
                { "id": c, "position": 1 },
                { "id": a, "position": 2 },
                { "id": b, "position": 3 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "boards reordered");

    let (_, body) = h.send(Method::GET, "/boards", Some(&h.alice), None).await;
    assert_eq!(ids_and_positions(&body["data"]), vec![(c, 1), (a, 2), (b, 3)]);
}

#[tokio::test]
async fn partial_reorder_is_a_validation_error() {
    let h = harness();
    let a = h.create_board("A", &[]).await["id"].as_i64().unwrap();
    h.create_board("B", &[]).await;

    let (status, body) = h
        .send(
            Method::POST,
            "/boards/reorder",
            Some(&h.alice),
            Some(json!({ "items": [{ "id": a, "position": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn move_task_across_columns_keeps_both_dense() {
    let h = harness();
    let board = h.create_board("Work", &["Todo", "Done"]).await;
    let board_id = board["id"].as_i64().unwrap();
    let todo = board["columns"][0]["id"].as_i64().unwrap();
    let done = board["columns"][1]["id"].as_i64().unwrap();

    let t1 = h.create_task(todo, "one").await;
    let t2 = h.create_task(todo, "two").await;
    let t3 = h.create_task(todo, "three").await;
    let d1 = h.create_task(done, "shipped").await;

    let (status, body) = h
        .send(
            Method::POST,
            &format!("/tasks/{t2}/move"),
            Some(&h.alice),
            Some(json!({ "columnId": done, "position": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["columnId"], done);
    assert_eq!(body["data"]["position"], 1);
    assert_eq!(body["data"]["status"], "Done");

    let board = h.board(board_id).await;
    assert_eq!(ids_and_positions(&board["columns"][0]["tasks"]), vec![(t1, 1), (t3, 2)]);
    assert_eq!(ids_and_positions(&board["columns"][1]["tasks"]), vec![(t2, 1), (d1, 2)]);
}

#[tokio::test]
async fn move_task_rejects_position_below_one() {
    let h = harness();
    let board = h.create_board("Work", &["Todo"]).await;
    let todo = board["columns"][0]["id"].as_i64().unwrap();
    let task = h.create_task(todo, "one").await;

    let (status, body) = h
        .send(
            Method::POST,
            &format!("/tasks/{task}/move"),
            Some(&h.alice),
            Some(json!({ "columnId": todo, "position": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn other_users_board_is_not_found() {
    let h = harness();
    let board_id = h.create_board("Private", &["Todo"]).await["id"].as_i64().unwrap();

    let (status, body) = h
        .send(Method::GET, &format!("/boards/{board_id}"), Some(&h.bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = h
        .send(Method::DELETE, &format!("/boards/{board_id}"), Some(&h.bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still there for its owner.
    h.board(board_id).await;
}

#[tokio::test]
async fn malformed_body_uses_the_envelope() {
    let h = harness();
    let (status, body) = h
        .send(
            Method::POST,
            "/boards",
            Some(&h.alice),
            Some(json!({ "title": "missing name" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn subtask_toggle_and_list() {
    let h = harness();
    let board = h.create_board("Work", &["Todo"]).await;
    let todo = board["columns"][0]["id"].as_i64().unwrap();
    let task = h.create_task(todo, "one").await;

    let (status, body) = h
        .send(
            Method::POST,
            "/subtasks",
            Some(&h.alice),
            Some(json!({ "taskId": task, "title": "draft" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let subtask = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["completed"], false);

    let (status, body) = h
        .send(
            Method::POST,
            &format!("/subtasks/{subtask}/toggle"),
            Some(&h.alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["completed"], true);

    let (_, body) = h
        .send(
            Method::GET,
            &format!("/subtasks?taskId={task}"),
            Some(&h.alice),
            None,
        )
        .await;
    assert_eq!(ids_and_positions(&body["data"]), vec![(subtask, 1)]);
}

#[tokio::test]
async fn set_default_moves_the_flag() {
    let h = harness();
    let a = h.create_board("A", &[]).await["id"].as_i64().unwrap();
    let b = h.create_board("B", &[]).await["id"].as_i64().unwrap();

    let (status, _) = h
        .send(Method::POST, &format!("/boards/{b}/default"), Some(&h.alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(h.board(a).await["isDefault"], false);
    assert_eq!(h.board(b).await["isDefault"], true);
}
