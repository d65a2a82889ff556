use anyhow::Result;
use std::time::Duration;

use tower_http::services::ServeDir;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{log_requests, state::*, ServerConfig};
use crate::directory_store::{
    parse_start_time, ArtistUpdate, DirectoryCounts, NewArtist, NewShow, NewVenue,
    ValidationError, VenueUpdate,
};
use crate::services::{DirectoryError, MutationService, QueryService, SearchResults};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    #[serde(flatten)]
    pub counts: DirectoryCounts,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct SearchBody {
    pub search_term: String,
}

#[derive(Serialize)]
struct SearchResponse {
    pub search_term: String,
    #[serde(flatten)]
    pub results: SearchResults,
}

#[derive(Deserialize, Debug)]
struct CreateShowBody {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: String,
}

async fn home(State(state): State<ServerState>) -> Response {
    match state.query.summary_counts() {
        Ok(counts) => Json(ServerStats {
            uptime: format_uptime(state.start_time.elapsed()),
            counts,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

fn respond<T: Serialize>(result: Result<T, DirectoryError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Unwraps a JSON body, turning a rejected one into the same 422 contract as
/// any other validation failure.
fn read_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, DirectoryError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(DirectoryError::Validation(ValidationError::InvalidField {
                field: "body",
                reason: rejection.body_text(),
            }))
        }
    }
}

fn respond_created<T: Serialize>(result: Result<T, DirectoryError>) -> Response {
    match result {
        Ok(value) => (StatusCode::CREATED, Json(value)).into_response(),
        Err(err) => err.into_response(),
    }
}

// =============================================================================
// Venues
// =============================================================================

async fn list_venues(State(query): State<GuardedQueryService>) -> Response {
    respond(query.list_venues_grouped_by_location())
}

async fn search_venues(
    State(query): State<GuardedQueryService>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    respond(query.search_venues(&body.search_term).map(|results| SearchResponse {
        search_term: body.search_term,
        results,
    }))
}

async fn get_venue_detail(
    State(query): State<GuardedQueryService>,
    Path(id): Path<i64>,
) -> Response {
    respond(query.get_venue_detail(id))
}

async fn get_venue_for_edit(
    State(query): State<GuardedQueryService>,
    Path(id): Path<i64>,
) -> Response {
    respond(query.get_venue(id))
}

async fn create_venue(
    State(mutation): State<GuardedMutationService>,
    body: Result<Json<NewVenue>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    respond_created(mutation.create_venue(body))
}

async fn edit_venue(
    State(mutation): State<GuardedMutationService>,
    Path(id): Path<i64>,
    body: Result<Json<VenueUpdate>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    respond(mutation.update_venue(id, body))
}

async fn delete_venue(
    State(mutation): State<GuardedMutationService>,
    Path(id): Path<i64>,
) -> Response {
    respond(mutation.delete_venue(id))
}

// =============================================================================
// Artists
// =============================================================================

async fn list_artists(State(query): State<GuardedQueryService>) -> Response {
    respond(query.list_artists())
}

async fn search_artists(
    State(query): State<GuardedQueryService>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    respond(query.search_artists(&body.search_term).map(|results| SearchResponse {
        search_term: body.search_term,
        results,
    }))
}

async fn get_artist_detail(
    State(query): State<GuardedQueryService>,
    Path(id): Path<i64>,
) -> Response {
    respond(query.get_artist_detail(id))
}

async fn get_artist_for_edit(
    State(query): State<GuardedQueryService>,
    Path(id): Path<i64>,
) -> Response {
    respond(query.get_artist(id))
}

async fn create_artist(
    State(mutation): State<GuardedMutationService>,
    body: Result<Json<NewArtist>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    respond_created(mutation.create_artist(body))
}

async fn edit_artist(
    State(mutation): State<GuardedMutationService>,
    Path(id): Path<i64>,
    body: Result<Json<ArtistUpdate>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    respond(mutation.update_artist(id, body))
}

async fn delete_artist(
    State(mutation): State<GuardedMutationService>,
    Path(id): Path<i64>,
) -> Response {
    respond(mutation.delete_artist(id))
}

// =============================================================================
// Shows
// =============================================================================

async fn list_shows(State(query): State<GuardedQueryService>) -> Response {
    respond(query.list_shows())
}

async fn create_show(
    State(mutation): State<GuardedMutationService>,
    body: Result<Json<CreateShowBody>, JsonRejection>,
) -> Response {
    let body = match read_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    let start_time = match parse_start_time(&body.start_time) {
        Ok(start_time) => start_time,
        Err(err) => return DirectoryError::Validation(err).into_response(),
    };
    respond_created(mutation.create_show(NewShow {
        venue_id: body.venue_id,
        artist_id: body.artist_id,
        start_time,
    }))
}

pub fn make_app(
    config: ServerConfig,
    query: QueryService,
    mutation: MutationService,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), query, mutation);

    let venue_routes: Router = Router::new()
        .route("/", get(list_venues).post(create_venue))
        .route("/search", post(search_venues))
        .route("/{id}", get(get_venue_detail).delete(delete_venue))
        .route("/{id}/edit", get(get_venue_for_edit).post(edit_venue))
        .with_state(state.clone());

    let artist_routes: Router = Router::new()
        .route("/", get(list_artists).post(create_artist))
        .route("/search", post(search_artists))
        .route("/{id}", get(get_artist_detail).delete(delete_artist))
        .route("/{id}/edit", get(get_artist_for_edit).post(edit_artist))
        .with_state(state.clone());

    let show_routes: Router = Router::new()
        .route("/", get(list_shows).post(create_show))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new()
                .route("/stats", get(home))
                .with_state(state.clone())
                .fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .route("/stats", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/venues", venue_routes)
        .nest("/artists", artist_routes)
        .nest("/shows", show_routes);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    query: QueryService,
    mutation: MutationService,
    config: ServerConfig,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, query, mutation)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
