//! Single binary web server: JSON API over the tournament engine.
//! Run with: cargo run --bin web
//! Configuration comes from the environment (or `.env`): HOST, PORT, ADMIN_TOKEN,
//! LEAGUE_DRAW_POLICY, MAX_PARTICIPANTS. Mutating requests need the admin token in the
//! `X-Admin-Token` header.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use clan_tournament_web::{
    AdminGate, AuthorizedContext, BufferedEventSink, Config, DataStore, ErrorKind, EventSink,
    LogEventSink, MemoryStore, NewParticipant, NewTournament, ParticipantId, ParticipantUpdate,
    TournamentDetails, TournamentEngine, TournamentError, TournamentEvent, TournamentId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const ADMIN_HEADER: &str = "X-Admin-Token";

/// Logs every event and keeps the most recent ones for `/api/events` polling.
struct AppEvents {
    log: LogEventSink,
    recent: BufferedEventSink,
}

impl EventSink for AppEvents {
    fn publish(&self, event: TournamentEvent) {
        self.log.publish(event.clone());
        self.recent.publish(event);
    }
}

struct AppState {
    engine: TournamentEngine,
    gate: AdminGate,
    events: Arc<AppEvents>,
}

type State = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct ScoreBody {
    score1: u32,
    score2: u32,
}

#[derive(Deserialize)]
struct EventsQuery {
    #[serde(default)]
    since: usize,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id
#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

/// Path segments: tournament id and match id
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Unauthorized => HttpResponse::Unauthorized().json(body),
        ErrorKind::Store => {
            log::error!("Store failure: {}", e);
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

fn authorize(state: &AppState, req: &HttpRequest) -> Result<AuthorizedContext, HttpResponse> {
    let token = req
        .headers()
        .get(ADMIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    state.gate.authorize(token).map_err(error_response)
}

/// The participant, if it belongs to the tournament in the path.
fn check_participant(
    state: &AppState,
    tournament_id: TournamentId,
    participant_id: ParticipantId,
) -> Result<(), TournamentError> {
    match state.engine.store().participant(participant_id)? {
        Some(p) if p.tournament_id == tournament_id => Ok(()),
        _ => Err(TournamentError::ParticipantNotFound(participant_id)),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "clan-tournament-web",
    })
}

/// Events with sequence number `since` or later (for polling clients).
#[get("/api/events")]
async fn api_events(state: State, query: Query<EventsQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.events.recent.since(query.since))
}

/// Active and completed tournaments.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: State) -> HttpResponse {
    respond(state.engine.list_tournaments())
}

/// Create a tournament with its initial participants.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: State,
    req: HttpRequest,
    body: Json<NewTournament>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(state.engine.create_tournament(&ctx, body.into_inner()))
}

/// Full tournament view: participants, fixtures, standings, bracket.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.engine.tournament_snapshot(path.id))
}

/// Edit name, description and rules.
#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<TournamentDetails>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(
        state
            .engine
            .update_tournament_details(&ctx, path.id, body.into_inner()),
    )
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    match state.engine.delete_tournament(&ctx, path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Add a participant (tournament must be in Setup).
#[post("/api/tournaments/{id}/participants")]
async fn api_add_participant(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<NewParticipant>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(state.engine.add_participant(&ctx, path.id, body.into_inner()))
}

/// Bulk-add participants from a CSV body of `name[,tag]` rows.
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_participants(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(
        state
            .engine
            .import_participants_csv(&ctx, path.id, body.as_bytes()),
    )
}

/// Rename or re-tag a participant.
#[put("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_update_participant(
    state: State,
    req: HttpRequest,
    path: Path<TournamentParticipantPath>,
    body: Json<ParticipantUpdate>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    if let Err(e) = check_participant(&state, path.id, path.participant_id) {
        return error_response(e);
    }
    respond(
        state
            .engine
            .update_participant(&ctx, path.participant_id, body.into_inner()),
    )
}

/// Remove a participant (only before fixtures are generated).
#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_remove_participant(
    state: State,
    req: HttpRequest,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let result = check_participant(&state, path.id, path.participant_id)
        .and_then(|()| state.engine.remove_participant(&ctx, path.participant_id));
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Played and remaining league fixtures for one participant.
#[get("/api/tournaments/{id}/participants/{participant_id}/history")]
async fn api_participant_history(
    state: State,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    respond(state.engine.participant_history(path.id, path.participant_id))
}

/// Generate the round-robin league (Setup -> League).
#[post("/api/tournaments/{id}/fixtures")]
async fn api_generate_fixtures(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(state.engine.generate_fixtures(&ctx, path.id))
}

/// Submit a league result.
#[put("/api/tournaments/{id}/league-matches/{match_id}/result")]
async fn api_submit_league_result(
    state: State,
    req: HttpRequest,
    path: Path<TournamentMatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(
        state
            .engine
            .submit_league_result(&ctx, path.id, path.match_id, body.score1, body.score2),
    )
}

/// League table in ranking order.
#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.engine.standings_table(path.id))
}

/// Rebuild standings from completed league matches.
#[post("/api/tournaments/{id}/standings/recalculate")]
async fn api_recalculate_standings(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(state.engine.recalculate_standings(&ctx, path.id))
}

/// Build the playoff bracket from the final league table (League -> Playoffs).
#[post("/api/tournaments/{id}/playoffs")]
async fn api_generate_playoffs(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(state.engine.generate_playoff_bracket(&ctx, path.id))
}

/// Submit a playoff result; may advance the round or finish the tournament.
#[put("/api/tournaments/{id}/playoff-matches/{match_id}/result")]
async fn api_submit_playoff_result(
    state: State,
    req: HttpRequest,
    path: Path<TournamentMatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let ctx = match authorize(&state, &req) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    respond(
        state
            .engine
            .submit_playoff_result(&ctx, path.id, path.match_id, body.score1, body.score2),
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let gate = match &config.admin_token {
        Some(token) => AdminGate::new(token.clone()),
        None => {
            log::warn!("ADMIN_TOKEN is not set; all mutating requests will be refused");
            AdminGate::locked()
        }
    };
    log::info!(
        "League draw policy {:?}, at most {} participants",
        config.engine.league_draw_policy,
        config.engine.max_participants
    );

    let events = Arc::new(AppEvents {
        log: LogEventSink,
        recent: BufferedEventSink::default(),
    });
    let engine = TournamentEngine::new(
        Arc::new(MemoryStore::new()),
        events.clone(),
        config.engine.clone(),
    );
    let state = Data::new(AppState {
        engine,
        gate,
        events,
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_events)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_delete_tournament)
            .service(api_add_participant)
            .service(api_import_participants)
            .service(api_update_participant)
            .service(api_remove_participant)
            .service(api_participant_history)
            .service(api_generate_fixtures)
            .service(api_submit_league_result)
            .service(api_standings)
            .service(api_recalculate_standings)
            .service(api_generate_playoffs)
            .service(api_submit_playoff_result)
    })
    .bind(bind)?
    .run()
    .await
}
