//! HTTP handlers.
//!
//! Implements:
//! - GET  /health
//! - POST /api/campaign-brief - Save an intake form submission
//! - GET  /api/campaign-brief/{id} - Retrieve one submission
//! - GET  /api/campaign-briefs - List recent submissions
//! - POST /api/generate-ppt/{id} - Generate a deck from a stored brief
//! - POST /api/generate-ppt-direct - Generate a deck from form fields

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use deck_core::{BriefSummary, CampaignBrief, ClientData, NewCampaignBrief};
use deck_pptx::DeckGenerator;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::store::SharedStore;
use crate::upload::{read_form, StagedLogo, MAX_LOGO_BYTES};

/// Most briefs returned by the listing endpoint.
const LIST_LIMIT: usize = 100;

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub generator: DeckGenerator,
    pub upload_dir: Arc<PathBuf>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/campaign-brief", post(create_brief))
        .route("/api/campaign-brief/{id}", get(get_brief))
        .route("/api/campaign-briefs", get(list_briefs))
        .route("/api/generate-ppt/{id}", post(generate_from_brief))
        .route("/api/generate-ppt-direct", post(generate_direct))
        .layer(DefaultBodyLimit::max(MAX_LOGO_BYTES + 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
}

/// GET /health - Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBrief {
    id: Uuid,
    brand_name: String,
    created_at: DateTime<Utc>,
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)
}

/// POST /api/campaign-brief
async fn create_brief(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewCampaignBrief>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<CreatedBrief>>)> {
    let Json(brief) = payload.map_err(|e| ApiError::Validation(vec![e.body_text()]))?;

    let errors = brief.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let saved = state.store.create(brief).await?;
    log::info!("Saved campaign brief {} for '{}'", saved.id, saved.brand_name);

    let mut body = Envelope::ok(CreatedBrief {
        id: saved.id,
        brand_name: saved.brand_name,
        created_at: saved.created_at,
    });
    body.message = Some("Campaign brief submitted successfully!");
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/campaign-brief/{id}
async fn get_brief(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<CampaignBrief>>> {
    let id = parse_id(&id)?;
    let brief = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(Envelope::ok(brief)))
}

/// GET /api/campaign-briefs
async fn list_briefs(State(state): State<AppState>) -> Result<Json<Envelope<Vec<BriefSummary>>>> {
    let briefs: Vec<BriefSummary> = state
        .store
        .list(LIST_LIMIT)
        .await?
        .iter()
        .map(CampaignBrief::summary)
        .collect();

    let mut body = Envelope::ok(briefs);
    body.count = Some(body.data.len());
    Ok(Json(body))
}

/// POST /api/generate-ppt/{id}
///
/// The body may be empty or a multipart form carrying a `logo` file.
async fn generate_from_brief(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let brief = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

    let logo = match multipart {
        Ok(multipart) => read_form(multipart, &state.upload_dir).await?.logo,
        Err(_) => None,
    };

    generate_download(&state, brief.to_client_data(), logo).await
}

/// POST /api/generate-ppt-direct
async fn generate_direct(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart, &state.upload_dir).await?;
    let (data, logo) = form.into_parts();
    generate_download(&state, data, logo).await
}

async fn generate_download(
    state: &AppState,
    data: ClientData,
    logo: Option<StagedLogo>,
) -> Result<Response> {
    let result = state
        .generator
        .generate(&data, logo.as_ref().map(StagedLogo::path))
        .await;
    if let Some(logo) = logo {
        logo.discard().await;
    }
    let deck = result?;

    let bytes = tokio::fs::read(&deck.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read {}: {}", deck.path.display(), e)))?;
    let file_name = deck
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("deck.pptx");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|e| ApiError::Internal(format!("Invalid file name header: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PPTX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use deck_pptx::GeneratorConfig;
    use std::io::{Read, Write};
    use tower::ServiceExt;

    const BOUNDARY: &str = "deckboundary";

    const STYLE_3799: &str = r#"<a:rPr lang="en-US" sz="3799"><a:solidFill><a:srgbClr val="510C3C"/></a:solidFill><a:latin typeface="Geometria"/><a:ea typeface="Geometria"/><a:cs typeface="Geometria"/><a:sym typeface="Geometria"/></a:rPr>"#;
    const STYLE_3000: &str = r#"<a:rPr lang="en-US" sz="3000"><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:latin typeface="Geometria"/><a:ea typeface="Geometria"/><a:cs typeface="Geometria"/><a:sym typeface="Geometria"/></a:rPr>"#;

    fn write_template(dir: &std::path::Path) -> PathBuf {
        let slide = format!(
            concat!(
                r#"<p:sld xmlns:a="a" xmlns:p="p"><p:txBody><a:p>"#,
                "<a:r>{h}<a:t>Go Colors</a:t></a:r><a:r>{h}<a:t> Clothing</a:t></a:r>",
                "<a:r>{b}<a:t> Female </a:t></a:r><a:r>{b}<a:t>Cinema</a:t></a:r>",
                "<a:r>{b}<a:t> Chennai, Delhi NCR, Bengaluru, Hyderabad, Pune</a:t></a:r>",
                "</a:p></p:txBody></p:sld>"
            ),
            h = STYLE_3799,
            b = STYLE_3000
        );
        let rels = r#"<Relationships><Relationship Id="rId5" Target="../media/image8.png"/></Relationships>"#;
        let types = r#"<Types><Default Extension="png" ContentType="image/png"/></Types>"#;

        let path = dir.join("template.pptx");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        let options = zip::write::FileOptions::default();
        for (name, data) in [
            ("[Content_Types].xml", types.as_bytes()),
            ("ppt/slides/slide4.xml", slide.as_bytes()),
            ("ppt/slides/_rels/slide4.xml.rels", rels.as_bytes()),
            ("ppt/media/image8.png", b"png".as_slice()),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    fn app(tmp: &tempfile::TempDir) -> Router {
        let template = write_template(tmp.path());
        let config = GeneratorConfig::new(template, tmp.path().join("work"), tmp.path().join("out"));
        router(AppState {
            store: Arc::new(MemoryStore::new()),
            generator: DeckGenerator::new(config),
            upload_dir: Arc::new(tmp.path().join("uploads")),
        })
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(uri: &str, fields: &[(&str, &str)], logo: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            write!(
                body,
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .unwrap();
        }
        if let Some((file_name, data)) = logo {
            write!(
                body,
                "--{}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .unwrap();
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        write!(body, "--{}--\r\n", BOUNDARY).unwrap();

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn slide_from_deck(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut slide = String::new();
        archive
            .by_name("ppt/slides/slide4.xml")
            .unwrap()
            .read_to_string(&mut slide)
            .unwrap();
        slide
    }

    fn brief_json() -> serde_json::Value {
        serde_json::json!({
            "brandName": "Go Colors",
            "industry": "Clothing",
            "campaignObjective": "Awareness",
            "targetGender": "Female",
            "targetAgeMin": 25,
            "targetAgeMax": 40,
            "primaryChannels": ["TV", "Digital"],
            "keyRegions": ["Chennai"]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = tempfile::tempdir().unwrap();
        let response = app(&tmp)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["healthy"], true);
    }

    #[tokio::test]
    async fn test_create_and_fetch_brief() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(&tmp);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/campaign-brief", brief_json()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["success"], true);
        assert_eq!(created["data"]["brandName"], "Go Colors");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/campaign-brief/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["data"]["targetAgeMax"], 40);
        assert_eq!(fetched["data"]["status"], "submitted");

        let response = app
            .oneshot(Request::get("/api/campaign-briefs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["data"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_invalid_brief_lists_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let mut brief = brief_json();
        brief["brandName"] = serde_json::json!("");
        brief["primaryChannels"] = serde_json::json!(["Print"]);

        let response = app(&tmp)
            .oneshot(json_request("POST", "/api/campaign-brief", brief))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(&tmp);

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/campaign-brief/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::get("/api/campaign-brief/not-an-id").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid campaign brief ID");
    }

    #[tokio::test]
    async fn test_generate_from_stored_brief() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(&tmp);

        let created = body_json(
            app.clone()
                .oneshot(json_request("POST", "/api/campaign-brief", brief_json()))
                .await
                .unwrap(),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::post(format!("/api/generate-ppt/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PPTX_CONTENT_TYPE);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"GoColors_"));

        let slide = slide_from_deck(body_bytes(response).await);
        assert!(slide.contains("<a:t> Female, Age 25-40 </a:t>"));
        assert!(slide.contains("<a:t>TV, DIGITAL</a:t>"));
        assert!(slide.contains("<a:t> Chennai</a:t>"));
        assert_eq!(std::fs::read_dir(tmp.path().join("work")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_generate_direct_with_logo() {
        let tmp = tempfile::tempdir().unwrap();
        let request = multipart_request(
            "/api/generate-ppt-direct",
            &[
                ("brandName", "Acme & Sons"),
                ("industry", "Hardware"),
                ("targetAudience", "Male, Age 30-55"),
                ("primaryChannels", "radio"),
                ("primaryChannels", "print"),
            ],
            Some(("logo.svg", b"<svg/>")),
        );

        let response = app(&tmp).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body_bytes(response).await;
        let slide = slide_from_deck(bytes.clone());
        assert!(slide.contains("<a:t>Acme &amp; Sons</a:t>"));
        assert!(slide.contains("<a:t>RADIO</a:t>"));
        assert!(slide.contains("<a:t> Pan India</a:t>"));

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("ppt/media/image8.svg").is_ok());

        // Staged upload is removed after generation.
        assert_eq!(std::fs::read_dir(tmp.path().join("uploads")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_generate_direct_rejects_no_valid_channel() {
        let tmp = tempfile::tempdir().unwrap();
        let request = multipart_request(
            "/api/generate-ppt-direct",
            &[
                ("brandName", "Acme"),
                ("industry", "Hardware"),
                ("targetAudience", "All"),
                ("primaryChannels", "Print"),
            ],
            None,
        );

        let response = app(&tmp).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!tmp.path().join("out").exists() || std::fs::read_dir(tmp.path().join("out")).unwrap().count() == 0);
    }

    #[tokio::test]
    async fn test_rejects_disallowed_logo_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let request = multipart_request(
            "/api/generate-ppt-direct",
            &[("brandName", "Acme"), ("primaryChannels", "TV")],
            Some(("logo.exe", b"MZ")),
        );

        let response = app(&tmp).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
