//! Axum HTTP routes for the labeling UI

use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use lbl_core::{Annotator, LabelError, Navigator, ResumePoint, Table};
use lbl_data::{export_table, CsvTableStore, DataError, SettingsStore};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::render::{self, CoderStat, IndexPage};

/// Shared application state
pub struct AppState {
    pub tables: Arc<CsvTableStore>,
    pub navigator: Navigator,
    pub settings: SettingsStore,
}

impl AppState {
    /// Wire the stores for a data directory
    pub fn new(data_dir: &Path) -> Self {
        let tables = Arc::new(CsvTableStore::in_dir(data_dir));
        let navigator = Navigator::new(tables.clone());
        Self {
            tables,
            navigator,
            settings: SettingsStore::in_dir(data_dir),
        }
    }
}

// ─── Route builder ───────────────────────────────────────────────

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/start", get(start))
        .route("/label", get(label_view))
        .route("/set_label", post(set_label))
        .route("/clear_label", post(clear_label))
        .route("/done", get(done_view))
        .route("/download", get(download))
        .route("/settings/coder-names", post(save_coder_names))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Build a local URL with query parameters and a notice for the user
pub fn with_notice(path: &str, params: &[(&str, String)], notice: &str) -> String {
    let mut url = path.to_string();
    let mut sep = '?';
    let notice_param = ("notice", notice.to_string());
    let all = params.iter().chain((!notice.is_empty()).then_some(&notice_param));
    for (key, value) in all {
        url.push(sep);
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
        sep = '&';
    }
    url
}

fn label_url(annotator: Annotator, row: usize, notice: &str) -> String {
    with_notice(
        "/label",
        &[("coder", annotator.to_string()), ("idx", (row + 1).to_string())],
        notice,
    )
}

fn done_url(annotator: Annotator) -> String {
    with_notice("/done", &[("coder", annotator.to_string())], "")
}

fn home(notice: &str) -> Response {
    Redirect::to(&with_notice("/", &[], notice)).into_response()
}

/// Run blocking store work off the async runtime
async fn blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, AppError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || work(&state)).await?
}

/// Annotator from a form or query value; a missing value means annotator 1
fn parse_annotator(raw: Option<&str>) -> Result<Annotator, AppError> {
    let raw = raw.unwrap_or("1").trim();
    let number = raw
        .parse::<i64>()
        .map_err(|_| AppError::Label(LabelError::InvalidAnnotator(0)))?;
    Ok(Annotator::from_number(number)?)
}

fn parse_row(raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw.unwrap_or("0").trim();
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("row index '{}'", raw)))
}

// ─── Handlers ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    coder: Option<String>,
    idx: Option<String>,
    notice: Option<String>,
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let page = blocking(&state, |state| {
        let settings = state.settings.load();
        let names = Annotator::ALL.iter().map(|a| settings.display_name(*a)).collect();
        let table = state.tables.read()?;

        let stats = match &table {
            Some(table) => Annotator::ALL
                .iter()
                .map(|a| CoderStat {
                    annotator: *a,
                    name: settings.display_name(*a),
                    completion: table.completion(*a),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(IndexPage {
            table_shape: table.as_ref().map(|t| (t.len(), t.column_count())),
            stats,
            names,
        })
    })
    .await?;

    Ok(Html(render::index_page(&page, query.notice.as_deref())))
}

async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Result<Response, AppError> {
    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload: {}", e);
                return Ok(home("No upload found."));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        if file_name.is_empty() {
            return Ok(home("Please choose a CSV file."));
        }
        match field.bytes().await {
            Ok(bytes) => upload = Some((file_name, bytes)),
            Err(e) => {
                warn!("Failed to read upload {:?}: {}", file_name, e);
                return Ok(home(&format!("CSV could not be loaded: {}", e)));
            }
        }
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Ok(home("No upload found."));
    };

    info!("Received upload {:?} ({} bytes)", file_name, bytes.len());
    let result = blocking(&state, move |state| Ok(state.tables.load(&bytes)?)).await;
    match result {
        Ok(_) => Ok(home("CSV loaded. You can now choose a coder.")),
        Err(AppError::Data(DataError::Io(e))) => {
            warn!("Failed to store upload {:?}: {}", file_name, e);
            Ok(home(&format!("CSV could not be loaded: {}", e)))
        }
        Err(e) => match e.notice() {
            Some(notice) => {
                warn!("Rejected upload {:?}: {}", file_name, e);
                Ok(home(&notice))
            }
            None => Err(e),
        },
    }
}

async fn start(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let annotator = parse_annotator(query.coder.as_deref())?;
    let resume = blocking(&state, move |state| Ok(state.navigator.resume(annotator)?)).await?;

    Ok(match resume {
        ResumePoint::Complete => Redirect::to(&done_url(annotator)).into_response(),
        ResumePoint::Row(row) => Redirect::to(&label_url(annotator, row, "")).into_response(),
    })
}

async fn label_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let annotator = parse_annotator(query.coder.as_deref())?;
    // Unparseable explicit indices still count as explicit and fall back to row 1
    let requested = query.idx.as_deref().map(|raw| raw.trim().parse::<i64>().unwrap_or(1));

    let opened = blocking(&state, move |state| {
        let view = state.navigator.open(annotator, requested)?;
        Ok((view, state.settings.display_name(annotator)))
    })
    .await?;

    Ok(match opened {
        (Some(view), name) => {
            Html(render::label_page(annotator, &name, &view, query.notice.as_deref())).into_response()
        }
        (None, _) => Redirect::to(&done_url(annotator)).into_response(),
    })
}

#[derive(Debug, Deserialize)]
struct LabelForm {
    coder: Option<String>,
    idx: Option<String>,
    label: Option<String>,
}

async fn set_label(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LabelForm>,
) -> Result<Response, AppError> {
    let annotator = parse_annotator(form.coder.as_deref())?;
    let row = parse_row(form.idx.as_deref())?;
    let key = form.label.unwrap_or_default();

    let result = blocking(&state, move |state| Ok(state.navigator.set_label(annotator, row, &key)?)).await;
    match result {
        Ok(outcome) => Ok(match outcome.next {
            ResumePoint::Complete => Redirect::to(&done_url(annotator)).into_response(),
            ResumePoint::Row(next) => Redirect::to(&label_url(annotator, next, "")).into_response(),
        }),
        Err(AppError::Label(LabelError::InvalidLabel(_))) => {
            // The label view wraps the raw index the same way a write would
            let back = with_notice(
                "/label",
                &[("coder", annotator.to_string()), ("idx", row.saturating_add(1).to_string())],
                "Invalid label.",
            );
            Ok(Redirect::to(&back).into_response())
        }
        Err(e) => Err(e),
    }
}

async fn clear_label(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LabelForm>,
) -> Result<Response, AppError> {
    let annotator = parse_annotator(form.coder.as_deref())?;
    let row = parse_row(form.idx.as_deref())?;

    let outcome = blocking(&state, move |state| Ok(state.navigator.clear_label(annotator, row)?)).await?;
    Ok(Redirect::to(&label_url(annotator, outcome.row, "")).into_response())
}

async fn done_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let annotator = parse_annotator(query.coder.as_deref())?;
    let (restart_row, name) = blocking(&state, move |state| {
        let table = state.navigator.current_table()?;
        Ok((Navigator::fallback_row(&table, annotator), state.settings.display_name(annotator)))
    })
    .await?;

    Ok(Html(render::done_page(annotator, &name, restart_row, query.notice.as_deref())))
}

async fn download(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let table: Option<Table> = blocking(&state, |state| Ok(state.tables.read()?)).await?;
    let table = match table {
        Some(table) if !table.is_empty() => table,
        _ => return Ok(home("No CSV loaded.")),
    };

    let bytes = export_table(&table)?;
    info!("Serving download of {} rows", table.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"labeled.csv\""),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
struct NamesForm {
    name1: Option<String>,
    name2: Option<String>,
    name3: Option<String>,
    name4: Option<String>,
    name5: Option<String>,
}

async fn save_coder_names(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NamesForm>,
) -> Result<Response, AppError> {
    let names = [form.name1, form.name2, form.name3, form.name4, form.name5].map(Option::unwrap_or_default);
    blocking(&state, move |state| {
        Ok(state.settings.save_display_names(&names)?)
    })
    .await?;
    Ok(home("Coder names saved."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    const BOUNDARY: &str = "labeler-test-boundary";

    fn app() -> (TempDir, Arc<AppState>, Router) {
        let dir = tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path()));
        let router = build_router(state.clone(), 1024 * 1024);
        (dir, state, router)
    }

    fn loaded_app(csv: &str) -> (TempDir, Arc<AppState>, Router) {
        let (dir, state, router) = app();
        state.tables.load(csv.as_bytes()).unwrap();
        (dir, state, router)
    }

    async fn get(router: &Router, uri: &str) -> Response {
        router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(router: &Router, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    async fn post_upload(router: &Router, file_name: &str, contents: &str) -> Response {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = file_name,
            c = contents
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    fn location(response: &Response) -> String {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_with_notice() {
        assert_eq!(with_notice("/", &[], ""), "/");
        assert_eq!(with_notice("/", &[], "Saved it."), "/?notice=Saved%20it.");
        assert_eq!(
            with_notice("/label", &[("coder", "1".to_string()), ("idx", "2".to_string())], "Invalid label."),
            "/label?coder=1&idx=2&notice=Invalid%20label."
        );
    }

    #[tokio::test]
    async fn test_index_without_table() {
        let (_dir, _state, router) = app();
        let response = get(&router, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No CSV loaded yet"));
    }

    #[tokio::test]
    async fn test_upload_then_index_shows_progress() {
        let (_dir, _state, router) = app();

        let response = post_upload(&router, "data.csv", "text,coder_1\na,\nb,help\n").await;
        assert!(location(&response).starts_with("/?notice=CSV%20loaded"));

        let html = body_text(get(&router, "/").await).await;
        assert!(html.contains("Rows: <b>2</b>"));
        assert!(html.contains("Coder 1: <b>1</b>/2"));
    }

    #[tokio::test]
    async fn test_upload_without_text_column_keeps_previous_table() {
        let (_dir, state, router) = loaded_app("text\nkeep me\n");

        let response = post_upload(&router, "bad.csv", "id,body\n1,x\n").await;
        assert!(location(&response).contains("CSV%20could%20not%20be%20loaded"));
        assert_eq!(state.tables.read().unwrap().unwrap().text(0), Some("keep me"));

        let response = post_upload(&router, "  ", "text\nx\n").await;
        assert!(location(&response).contains("choose%20a%20CSV"));
    }

    #[tokio::test]
    async fn test_start_resumes_at_first_unlabeled() {
        let (_dir, _state, router) = loaded_app("text,coder_1\na,help\nb,\nc,\n");
        assert_eq!(location(&get(&router, "/start?coder=1").await), "/label?coder=1&idx=2");
        assert_eq!(location(&get(&router, "/start?coder=2").await), "/label?coder=2&idx=1");
    }

    #[tokio::test]
    async fn test_start_without_table_or_bad_coder() {
        let (_dir, _state, router) = app();
        assert!(location(&get(&router, "/start?coder=1").await).contains("upload%20a%20CSV%20first"));

        let (_dir, _state, router) = loaded_app("text\na\n");
        assert!(location(&get(&router, "/start?coder=9").await).contains("Invalid%20coder"));
        assert!(location(&get(&router, "/start?coder=abc").await).contains("Invalid%20coder"));
    }

    #[tokio::test]
    async fn test_empty_table_cannot_be_navigated() {
        let (_dir, _state, router) = loaded_app("text,coder_1\n");
        assert!(location(&get(&router, "/start?coder=1").await).contains("no%20rows"));
        assert!(location(&get(&router, "/download").await).contains("No%20CSV"));
    }

    #[tokio::test]
    async fn test_complete_annotator() {
        let (_dir, _state, router) = loaded_app("text,coder_1\na,help\nb,warn\n");

        assert_eq!(location(&get(&router, "/start?coder=1").await), "/done?coder=1");
        assert_eq!(location(&get(&router, "/label?coder=1").await), "/done?coder=1");

        // Explicit index bypasses the completion check
        let response = get(&router, "/label?coder=1&idx=2").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Row: <b>2</b>/2"));

        let html = body_text(get(&router, "/done?coder=1").await).await;
        assert!(html.contains("/label?coder=1&amp;idx=1"));
    }

    #[tokio::test]
    async fn test_label_view_wraps_index() {
        let (_dir, _state, router) = loaded_app("text\nfirst\nsecond\nthird\n");

        let html = body_text(get(&router, "/label?coder=3&idx=0").await).await;
        assert!(html.contains("Row: <b>3</b>/3"));
        assert!(html.contains("third"));

        let html = body_text(get(&router, "/label?coder=3&idx=x").await).await;
        assert!(html.contains("Row: <b>1</b>/3"));
    }

    #[tokio::test]
    async fn test_set_label_flow() {
        let (_dir, state, router) = loaded_app("text,coder_1\na,\nb,help\n");

        let response = post_form(&router, "/set_label", "coder=1&idx=0&label=help").await;
        assert_eq!(location(&response), "/done?coder=1");

        let response = post_form(&router, "/clear_label", "coder=1&idx=1").await;
        assert_eq!(location(&response), "/label?coder=1&idx=2");

        let table = state.tables.read().unwrap().unwrap();
        let first = Annotator::from_number(1).unwrap();
        assert_eq!(table.completion(first).done, 1);
        assert_eq!(table.label(1, first), Some(""));

        let response = post_form(&router, "/set_label", "coder=1&idx=1&label=warn").await;
        assert_eq!(location(&response), "/done?coder=1");
    }

    #[tokio::test]
    async fn test_set_label_advances() {
        let (_dir, _state, router) = loaded_app("text\na\nb\nc\n");
        let response = post_form(&router, "/set_label", "coder=5&idx=2&label=listen").await;
        assert_eq!(location(&response), "/label?coder=5&idx=1");
    }

    #[tokio::test]
    async fn test_invalid_label_returns_to_row() {
        let (_dir, state, router) = loaded_app("text,coder_1\na,\nb,help\n");
        let before = state.tables.read().unwrap();

        let response = post_form(&router, "/set_label", "coder=1&idx=0&label=bogus").await;
        assert_eq!(location(&response), "/label?coder=1&idx=1&notice=Invalid%20label.");
        assert_eq!(state.tables.read().unwrap(), before);

        let response = post_form(&router, "/set_label", "coder=7&idx=0&label=help").await;
        assert!(location(&response).contains("Invalid%20coder"));

        let response = post_form(&router, "/clear_label", "coder=1&idx=abc").await;
        assert!(location(&response).contains("Invalid%20request"));
    }

    #[tokio::test]
    async fn test_invalid_label_with_negative_index_matches_written_row() {
        let (_dir, state, router) = loaded_app("text\na\nb\nc\n");

        let response = post_form(&router, "/set_label", "coder=1&idx=-1&label=bogus").await;
        let back = location(&response);
        assert_eq!(back, "/label?coder=1&idx=0&notice=Invalid%20label.");
        let html = body_text(get(&router, &back).await).await;
        assert!(html.contains("Row: <b>3</b>/3"));

        post_form(&router, "/set_label", "coder=1&idx=-1&label=help").await;
        let table = state.tables.read().unwrap().unwrap();
        assert_eq!(table.label(2, Annotator::from_number(1).unwrap()), Some("help"));
    }

    #[tokio::test]
    async fn test_upload_storage_failure_is_reported() {
        let dir = tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "not a directory").unwrap();
        let router = build_router(Arc::new(AppState::new(&blocked)), 1024 * 1024);

        let response = post_upload(&router, "data.csv", "text\na\n").await;
        assert!(location(&response).starts_with("/?notice=CSV%20could%20not%20be%20loaded"));
    }

    #[tokio::test]
    async fn test_download() {
        let (_dir, _state, router) = loaded_app("text,coder_1\na,help\n");
        let response = get(&router, "/download").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("labeled.csv"));
        let body = body_text(response).await;
        assert!(body.starts_with("text,coder_1,coder_2,coder_3,coder_4,_coder_5"));
        assert!(body.contains("a,help"));
    }

    #[tokio::test]
    async fn test_save_coder_names() {
        let (_dir, state, router) = loaded_app("text\na\n");

        let response = post_form(&router, "/settings/coder-names", "name1=Alex&name2=&name5=Kim").await;
        assert!(location(&response).contains("names%20saved"));

        let settings = state.settings.load();
        assert_eq!(settings.display_name(Annotator::from_number(1).unwrap()), "Alex");
        assert_eq!(settings.display_name(Annotator::from_number(2).unwrap()), "Coder 2");

        let html = body_text(get(&router, "/label?coder=5&idx=1").await).await;
        assert!(html.contains("Coder: <b>Kim</b>"));
    }
}
