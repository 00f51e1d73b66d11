use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use nn_core::{Article, Error, Settings, SummaryRecord, TtsProvider, Voice};

use crate::AppState;

/// Error wrapper that maps domain errors onto HTTP statuses. Bad input is
/// the caller's fault; everything else is ours.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Configuration(_) => StatusCode::BAD_REQUEST,
            Error::MissingArticle(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, ApiError> {
    let settings = state.store.ensure_default_settings().await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    state.store.save_settings(&settings).await?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    pub filter_date: Option<String>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let filter_date = query
        .filter_date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| Error::Configuration(format!("invalid filter_date: {}", raw)))
        })
        .transpose()?;
    let articles = state.store.get_articles(filter_date).await?;
    Ok(Json(articles))
}

pub async fn list_summaries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SummaryRecord>>, ApiError> {
    let summaries = state.store.get_summaries().await?;
    Ok(Json(summaries))
}

pub async fn process(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let processed = state.pipeline.run_pass().await?;
    Ok(Json(json!({ "processed": processed })))
}

pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Json<Vec<Voice>>, ApiError> {
    let provider: TtsProvider = provider.parse()?;
    let voices = state.speech.provider(provider)?.voices().await?;
    Ok(Json(voices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use nn_core::RecordStore;
    use nn_ingest::{HtmlExtractor, Pipeline, RssFetcher};
    use nn_speech::{Credentials, DummySummarizer, SpeechRouter};
    use nn_storage::MemoryStore;

    use crate::create_app;

    async fn test_app() -> (axum::Router, Arc<MemoryStore>, tempfile::TempDir) {
        let store = Arc::new(MemoryStore::new());
        let settings = Settings {
            tts_provider: TtsProvider::Dummy,
            rss_feeds: Vec::new(),
            ..Settings::default()
        };
        store.save_settings(&settings).await.unwrap();

        let audio_dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(SpeechRouter::from_credentials(&Credentials::default()));
        let pipeline = Arc::new(Pipeline::new(
            store.clone(),
            Arc::new(RssFetcher::new()),
            Arc::new(HtmlExtractor::new()),
            Arc::new(DummySummarizer),
            speech.clone(),
            audio_dir.path(),
        ));
        let state = AppState {
            store: store.clone(),
            pipeline,
            speech,
            audio_dir: audio_dir.path().to_path_buf(),
        };
        (create_app(state).await, store, audio_dir)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn article(url: &str, day: u32) -> Article {
        Article {
            url: url.to_string(),
            title: format!("Story {}", day),
            content: "body".to_string(),
            publish_date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn settings_round_trip_over_http() {
        let (app, _store, _dir) = test_app().await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ttsProvider"], "dummy");
        assert_eq!(body["voice"], "cardi-b");

        let updated = Settings {
            tts_provider: TtsProvider::Dummy,
            voice: "narrator".to_string(),
            rss_feeds: Vec::new(),
            ..Settings::default()
        };
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/settings")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&updated).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["voice"], "narrator");
    }

    #[tokio::test]
    async fn articles_filter_by_calendar_day() {
        let (app, store, _dir) = test_app().await;
        store.upsert_article(&article("https://n/1", 1)).await.unwrap();
        store.upsert_article(&article("https://n/2", 2)).await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/articles?filter_date=2024-03-01")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["url"], "https://n/1");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/articles?filter_date=march-first")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn voices_route_validates_the_provider() {
        let (app, _store, _dir) = test_app().await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/voices/dummy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], "narrator");

        // Unknown vendor name and a known vendor without credentials both
        // come back as client errors.
        for path in ["/voices/espeak", "/voices/elevenlabs"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", path);
        }
    }

    #[tokio::test]
    async fn process_reports_enriched_count() {
        let (app, _store, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["processed"], 0);
    }

    #[tokio::test]
    async fn audio_files_are_served_statically() {
        let (app, _store, dir) = test_app().await;
        std::fs::write(dir.path().join("clip.mp3"), b"bytes").unwrap();

        let response = app
            .oneshot(Request::builder().uri("/audio/clip.mp3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
