use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::Result;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};
use url::form_urlencoded;

use crate::configuration::Configuration;
use crate::export::{self, ExportError};
use crate::pipeline::{Pipeline, PipelineResult};

/// State shared across routes.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
    configuration: Configuration,
}

/// Serve the web UI over the pipeline boundary.
#[instrument(skip_all, fields(address = %configuration.listen_address))]
pub async fn start(configuration: Configuration, pipeline: Pipeline) -> Result<()> {
    let address = configuration.listen_address;
    let state = AppState {
        pipeline: Arc::new(pipeline),
        configuration,
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/process", post(process))
        .route("/images/:filename", get(download_image))
        .route("/export/spreadsheet", get(export_spreadsheet))
        .route("/export/pdf", get(export_pdf))
        .with_state(state);

    info!("listening on {address}");
    let listener = TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Html<String> {
    index_page(None)
}

#[derive(Debug, Deserialize)]
struct ProcessForm {
    post_url: String,
}

async fn process(State(state): State<AppState>, Form(form): Form<ProcessForm>) -> Response {
    if form.post_url.trim().is_empty() {
        let page = index_page(Some("Please provide a post URL."));
        return (StatusCode::BAD_REQUEST, page).into_response();
    }

    match state.pipeline.invoke(&form.post_url).await {
        Ok(result) => result_page(&result).into_response(),
        Err(error) => {
            warn!("pipeline failed: {error}");
            let page = index_page(Some(&format!("Error processing the post: {error}.")));
            (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
        }
    }
}

async fn download_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(filename) = safe_filename(&filename) else {
        return (StatusCode::BAD_REQUEST, "invalid filename").into_response();
    };

    let path = state.configuration.artifacts_directory.join(filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => attachment(filename, "image/png", bytes),
        Err(_) => (StatusCode::NOT_FOUND, "no such screenshot").into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    text: Option<String>,
}

async fn export_spreadsheet(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Response {
    serve_export(
        &state,
        query.text,
        export::write_spreadsheet,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    )
    .await
}

async fn export_pdf(State(state): State<AppState>, Query(query): Query<ExportQuery>) -> Response {
    serve_export(&state, query.text, export::write_pdf, "application/pdf").await
}

async fn serve_export(
    state: &AppState,
    text: Option<String>,
    write: fn(&str, &Utf8Path) -> Result<Utf8PathBuf, ExportError>,
    content_type: &str,
) -> Response {
    let text = text.unwrap_or_default();
    let directory = state.configuration.artifacts_directory.clone();
    let written = tokio::task::spawn_blocking(move || write(&text, &directory)).await;

    let path = match written {
        Ok(Ok(path)) => path,
        Ok(Err(error @ ExportError::InputMissing)) => {
            let page = index_page(Some(&format!("{error}.")));
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
        Ok(Err(error)) => {
            warn!("export failed: {error}");
            let page = index_page(Some(&format!("Export failed: {error}.")));
            return (StatusCode::INTERNAL_SERVER_ERROR, page).into_response();
        }
        Err(error) => {
            warn!("export task failed: {error}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "export task failed").into_response();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => attachment(path.file_name().unwrap_or("export"), content_type, bytes),
        Err(error) => {
            warn!("failed to read export file {path}: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, "export file unreadable").into_response()
        }
    }
}

fn attachment(filename: &str, content_type: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Only bare filenames may reach the artifacts directory.
fn safe_filename(name: &str) -> Option<&str> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

fn index_page(error: Option<&str>) -> Html<String> {
    let notice = error
        .map(|message| format!("<p class=\"error\">{}</p>\n", escape_html(message)))
        .unwrap_or_default();
    Html(format!(
        "<!doctype html>\n<html>\n<head><title>vibecheck</title></head>\n<body>\n\
         <h1>vibecheck</h1>\n\
         <p>Paste a post URL to screenshot it, read the text, and score the vibe.</p>\n\
         {notice}\
         <form action=\"/process\" method=\"post\">\n\
         <input type=\"url\" name=\"post_url\" placeholder=\"https://www.instagram.com/p/...\" size=\"60\" required>\n\
         <button type=\"submit\">Check</button>\n\
         </form>\n</body>\n</html>\n"
    ))
}

fn result_page(result: &PipelineResult) -> Html<String> {
    let filename = result.screenshot.filename();
    let text = escape_html(&result.text);
    let encoded: String = form_urlencoded::byte_serialize(result.text.as_bytes()).collect();
    Html(format!(
        "<!doctype html>\n<html>\n<head><title>vibecheck</title></head>\n<body>\n\
         <h1>Result</h1>\n\
         <p>Sentiment polarity: {sentiment:+.2}</p>\n\
         <pre>{text}</pre>\n\
         <p><img src=\"/images/{filename}\" alt=\"post screenshot\" width=\"640\"></p>\n\
         <p><a href=\"/images/{filename}\">Download screenshot</a>\n\
         · <a href=\"/export/spreadsheet?text={encoded}\">Spreadsheet</a>\n\
         · <a href=\"/export/pdf?text={encoded}\">PDF</a></p>\n\
         <p><a href=\"/\">Check another post</a></p>\n\
         </body>\n</html>\n",
        sentiment = result.sentiment,
    ))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use crate::capture::ScreenshotArtifact;

    use super::*;

    #[test]
    fn filenames_cannot_escape_the_artifacts_directory() {
        assert_eq!(safe_filename("post_Cx4f2ab.png"), Some("post_Cx4f2ab.png"));
        assert_eq!(safe_filename("../secrets.txt"), None);
        assert_eq!(safe_filename("a/b.png"), None);
        assert_eq!(safe_filename("a\\b.png"), None);
        assert_eq!(safe_filename(".."), None);
        assert_eq!(safe_filename(""), None);
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html("<script>\"&'"),
            "&lt;script&gt;&quot;&amp;&#39;"
        );
    }

    #[test]
    fn index_page_renders_the_form_and_notice() {
        let page = index_page(Some("it <broke>")).0;
        assert!(page.contains("name=\"post_url\""));
        assert!(page.contains("it &lt;broke&gt;"));
    }

    #[test]
    fn result_page_escapes_text_and_links_the_artifact() {
        let result = PipelineResult {
            text: "nice <post> & stuff".to_owned(),
            sentiment: 0.5,
            screenshot: ScreenshotArtifact {
                post_id: "Cx4f2ab".to_owned(),
                path: Utf8PathBuf::from("static/images/post_Cx4f2ab.png"),
                png: vec![],
            },
        };
        let page = result_page(&result).0;
        assert!(page.contains("nice &lt;post&gt; &amp; stuff"));
        assert!(page.contains("/images/post_Cx4f2ab.png"));
        assert!(page.contains("+0.50"));
        assert!(page.contains("/export/spreadsheet?text=nice"));
    }
}
