use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::envelope::{created, data, message, ApiError, AuthUser, Body, Envelope, Params};
use super::AppState;
use crate::model::{Board, BoardDetail, Column, OrderItem, Subtask, Task, TaskDetail};
use crate::service::{
    self, BoardUpdate, ColumnUpdate, MoveTask, NewBoard, NewColumn, NewSubtask, NewTask,
    RelocateTask, SubtaskUpdate, TaskUpdate,
};

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardScope {
    pub board_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnScope {
    pub column_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskScope {
    pub task_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub board_id: i64,
    #[serde(flatten)]
    pub column: NewColumn,
}

// Boards

pub async fn list_boards(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Vec<Board>> {
    let boards = state
        .with_store(move |conn| service::list_boards(conn, user.id))
        .await?;
    Ok(data(boards))
}

pub async fn get_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<BoardDetail> {
    let board = state
        .with_store(move |conn| service::get_board_detail(conn, user.id, id))
        .await?;
    Ok(data(board))
}

pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Body(new): Body<NewBoard>,
) -> Created<BoardDetail> {
    let board = state
        .with_store(move |conn| service::create_board(conn, user.id, &new))
        .await?;
    Ok(created(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Body(update): Body<BoardUpdate>,
) -> ApiResult<BoardDetail> {
    let board = state
        .with_store(move |conn| service::update_board(conn, user.id, id, &update))
        .await?;
    Ok(data(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::delete_board(conn, user.id, id))
        .await?;
    Ok(message(format!("board {id} deleted")))
}

pub async fn reorder_boards(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Body(req): Body<ReorderRequest>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::reorder_boards(conn, user.id, &req.items))
        .await?;
    Ok(message("boards reordered"))
}

pub async fn set_default_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::set_default_board(conn, user.id, id))
        .await?;
    Ok(message(format!("board {id} is now the default")))
}

// Columns

pub async fn create_column(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Body(req): Body<CreateColumnRequest>,
) -> Created<Column> {
    let column = state
        .with_store(move |conn| service::create_column(conn, user.id, req.board_id, &req.column))
        .await?;
    Ok(created(column))
}

pub async fn update_column(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Body(update): Body<ColumnUpdate>,
) -> ApiResult<Column> {
    let column = state
        .with_store(move |conn| service::update_column(conn, user.id, id, &update))
        .await?;
    Ok(data(column))
}

pub async fn delete_column(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::delete_column(conn, user.id, id))
        .await?;
    Ok(message(format!("column {id} deleted")))
}

pub async fn reorder_columns(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(scope): Params<BoardScope>,
    Body(req): Body<ReorderRequest>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| {
            service::reorder_columns(conn, user.id, scope.board_id, &req.items)
        })
        .await?;
    Ok(message("columns reordered"))
}

// Tasks

pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<TaskDetail> {
    let task = state
        .with_store(move |conn| service::get_task(conn, user.id, id))
        .await?;
    Ok(data(task))
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Body(new): Body<NewTask>,
) -> Created<TaskDetail> {
    let task = state
        .with_store(move |conn| service::create_task(conn, user.id, &new))
        .await?;
    Ok(created(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Body(update): Body<TaskUpdate>,
) -> ApiResult<TaskDetail> {
    let task = state
        .with_store(move |conn| service::update_task(conn, user.id, id, &update))
        .await?;
    Ok(data(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::delete_task(conn, user.id, id))
        .await?;
    Ok(message(format!("task {id} deleted")))
}

pub async fn move_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Body(to): Body<MoveTask>,
) -> ApiResult<Task> {
    let task = state
        .with_store(move |conn| service::move_task(conn, user.id, id, &to))
        .await?;
    Ok(data(task))
}

pub async fn relocate_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Body(req): Body<RelocateTask>,
) -> ApiResult<TaskDetail> {
    let task = state
        .with_store(move |conn| service::relocate_task(conn, user.id, id, &req))
        .await?;
    Ok(data(task))
}

pub async fn reorder_tasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(scope): Params<ColumnScope>,
    Body(req): Body<ReorderRequest>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::reorder_tasks(conn, user.id, scope.column_id, &req.items))
        .await?;
    Ok(message("tasks reordered"))
}

// Subtasks

pub async fn list_subtasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(scope): Params<TaskScope>,
) -> ApiResult<Vec<Subtask>> {
    let subtasks = state
        .with_store(move |conn| service::list_subtasks(conn, user.id, scope.task_id))
        .await?;
    Ok(data(subtasks))
}

pub async fn create_subtask(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Body(new): Body<NewSubtask>,
) -> Created<Subtask> {
    let subtask = state
        .with_store(move |conn| service::create_subtask(conn, user.id, &new))
        .await?;
    Ok(created(subtask))
}

pub async fn update_subtask(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Body(update): Body<SubtaskUpdate>,
) -> ApiResult<Subtask> {
    let subtask = state
        .with_store(move |conn| service::update_subtask(conn, user.id, id, &update))
        .await?;
    Ok(data(subtask))
}

pub async fn toggle_subtask(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Subtask> {
    let subtask = state
        .with_store(move |conn| service::toggle_subtask(conn, user.id, id))
        .await?;
    Ok(data(subtask))
}

pub async fn delete_subtask(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::delete_subtask(conn, user.id, id))
        .await?;
    Ok(message(format!("subtask {id} deleted")))
}

pub async fn reorder_subtasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(scope): Params<TaskScope>,
    Body(req): Body<ReorderRequest>,
) -> ApiResult<()> {
    state
        .with_store(move |conn| service::reorder_subtasks(conn, user.id, scope.task_id, &req.items))
        .await?;
    Ok(message("subtasks reordered"))
}
