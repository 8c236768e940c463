use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use chrono::Local;
use rusqlite::Connection;
use serde::Deserialize;

use crate::flash::{self, Flash, FlashSigner};
use crate::ops::{self, StoreError};
use crate::render;
use crate::validate;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    signer: Arc<FlashSigner>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            signer: Arc::new(FlashSigner::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("database mutex poisoned")))
    }

    fn redirect_with_flash(&self, flash: &Flash) -> Response {
        let mut response = Redirect::to("/").into_response();
        if let Ok(value) = HeaderValue::from_str(&flash::set_cookie(&self.signer.encode(flash))) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

pub fn router(conn: Connection, assets: PathBuf) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add_task))
        .route("/complete/{id}", post(toggle_complete))
        .route("/delete/{id}", get(delete_task).post(delete_task))
        .nest_service("/static", tower_http::services::ServeDir::new(assets))
        .with_state(AppState::new(conn))
}

#[derive(Debug)]
enum AppError {
    NotFound(i64),
    Internal(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("task {id} not found")).into_response()
            }
            AppError::Internal(err) => {
                log::error!("request failed: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AddForm {
    #[serde(default)]
    task_content: String,
    #[serde(default)]
    task_category: String,
    #[serde(default)]
    task_date: String,
    #[serde(default)]
    task_time: String,
    #[serde(default)]
    task_location: String,
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let flash = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(flash::from_cookie_header)
        .and_then(|token| state.signer.decode(token));

    let tasks = {
        let conn = state.lock()?;
        ops::list_tasks(&conn)?
    };

    let page = render::render_page(&tasks, Local::now().naive_local(), flash.as_ref());
    let mut response = Html(page).into_response();
    if flash.is_some() {
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static(flash::CLEAR_COOKIE));
    }
    Ok(response)
}

async fn add_task(
    State(state): State<AppState>,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let now = Local::now().naive_local();
    let flash = match validate::new_task(
        &form.task_content,
        &form.task_category,
        &form.task_date,
        &form.task_time,
        &form.task_location,
        now,
    ) {
        Ok(new) => {
            let task = {
                let conn = state.lock()?;
                ops::create_task(&conn, &new)?
            };
            log::info!("created task {} due {}", task.id, new.deadline);
            Flash::success(format!("Added task \"{}\".", task.content))
        }
        Err(err) => {
            log::warn!("rejected task submission: {err}");
            Flash::error(err.to_string())
        }
    };
    Ok(state.redirect_with_flash(&flash))
}

async fn toggle_complete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let task = {
        let conn = state.lock()?;
        let task = ops::get_task(&conn, id)?;
        ops::set_completed(&conn, id, !task.completed)?;
        task
    };
    log::info!("task {} now completed={}", id, !task.completed);
    let flash = if task.completed {
        Flash::info(format!("Reopened \"{}\".", task.content))
    } else {
        Flash::success(format!("Completed \"{}\".", task.content))
    };
    Ok(state.redirect_with_flash(&flash))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let task = {
        let conn = state.lock()?;
        ops::delete_task(&conn, id)?
    };
    log::info!("deleted task {id}");
    Ok(state.redirect_with_flash(&Flash::info(format!("Deleted \"{}\".", task.content))))
}
