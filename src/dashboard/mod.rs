use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::db::models::MatchRecord;
use crate::db::MatchStore;
use crate::error::LeagueError;
use crate::gate::PinGate;
use crate::league::standings::{self, Side};
use crate::league::LeagueService;

#[derive(Clone)]
pub struct AppState {
    pub league: LeagueService,
    pub gate: Arc<PinGate>,
    pub store: Arc<dyn MatchStore>,
    pub home_team: String,
    pub away_team: String,
}

impl AppState {
    fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/standings", get(standings_handler))
        .route("/api/matches", get(matches_handler).post(add_match_handler))
        .route("/api/matches/:id", delete(delete_match_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/pin/reload", post(reload_pin_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ── Payloads ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AddMatchRequest {
    pin: String,
    home_goals: i64,
    away_goals: i64,
}

#[derive(Deserialize)]
struct GatedRequest {
    pin: String,
}

/// One ranked row of the league table, as rendered by the UI.
#[derive(Serialize)]
struct StandingsRow {
    position: usize,
    team: String,
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u32,
    goals_against: u32,
    goal_difference: i64,
    points: u32,
}

#[derive(Serialize)]
struct DeleteResponse {
    removed: bool,
}

#[derive(Serialize)]
struct ResetResponse {
    purged: usize,
}

// ── Handlers ───────────────────────────────────────────────────────────────────

/// Serve the dashboard HTML page, injecting the team names.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = DASHBOARD_HTML.replace(
        r#"<body>"#,
        &format!(
            r#"<body data-home="{}" data-away="{}">"#,
            state.home_team, state.away_team
        ),
    );
    Html(html)
}

/// GET /api/standings
async fn standings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StandingsRow>>, (StatusCode, String)> {
    let table = state.league.standings().map_err(error_response)?;
    let rows = standings::rank(&table)
        .into_iter()
        .enumerate()
        .map(|(i, side)| {
            let stats = table.stats(side);
            StandingsRow {
                position: i + 1,
                team: state.team_name(side).to_string(),
                played: stats.played,
                won: stats.won,
                drawn: stats.drawn,
                lost: stats.lost,
                goals_for: stats.goals_for,
                goals_against: stats.goals_against,
                goal_difference: stats.goal_difference(),
                points: stats.points,
            }
        })
        .collect();
    Ok(Json(rows))
}

/// GET /api/matches — recent history, newest first
async fn matches_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MatchRecord>>, (StatusCode, String)> {
    state
        .league
        .recent_matches()
        .map(Json)
        .map_err(error_response)
}

/// POST /api/matches — PIN-gated add
async fn add_match_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMatchRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_pin(&state, &req.pin)?;
    state
        .league
        .add_match(req.home_goals, req.away_goals)
        .map(|record| (StatusCode::CREATED, Json(record)))
        .map_err(error_response)
}

/// DELETE /api/matches/:id — PIN-gated; an absent id still succeeds
async fn delete_match_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<GatedRequest>,
) -> Result<Json<DeleteResponse>, (StatusCode, String)> {
    check_pin(&state, &req.pin)?;
    state
        .league
        .delete_match(id)
        .map(|removed| Json(DeleteResponse { removed }))
        .map_err(error_response)
}

/// POST /api/reset — PIN-gated season reset
async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GatedRequest>,
) -> Result<Json<ResetResponse>, (StatusCode, String)> {
    check_pin(&state, &req.pin)?;
    state
        .league
        .reset_season()
        .map(|purged| Json(ResetResponse { purged }))
        .map_err(error_response)
}

/// POST /api/pin/reload — reread the shared secret from the store
async fn reload_pin_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GatedRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    check_pin(&state, &req.pin)?;
    state
        .gate
        .reload(state.store.as_ref())
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

fn check_pin(state: &AppState, candidate: &str) -> Result<(), (StatusCode, String)> {
    if state.gate.verify(candidate) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "incorrect PIN".to_string()))
    }
}

fn error_response(e: LeagueError) -> (StatusCode, String) {
    let status = match &e {
        LeagueError::InvalidMatchRecord { .. } => StatusCode::BAD_REQUEST,
        LeagueError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Derby Tracker</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; max-width: 760px; margin: 0 auto; }
  .card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  .card h2 { font-size: 1rem; margin-bottom: .8rem; }
  .score-row { display: flex; align-items: center; gap: .6rem; margin-bottom: .8rem; }
  .score-row input { width: 4rem; padding: .4rem; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; text-align: center; }
  .badge { padding: .2rem .6rem; border-radius: 4px; font-size: .8rem; font-weight: 700; }
  .badge.home { background: rgba(108,99,255,.25); color: var(--accent); }
  .badge.away { background: rgba(0,200,150,.2); color: var(--green); }
  button { background: var(--accent); border: none; color: #fff; padding: .45rem 1rem; border-radius: 6px; cursor: pointer; font-size: .85rem; }
  button.danger { background: var(--red); }
  button.small { padding: .2rem .6rem; font-size: .75rem; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .5rem .6rem; text-align: left; font-size: .72rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .5rem .6rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  tr:last-child td { border-bottom: none; }
  ul { list-style: none; }
  li { display: flex; align-items: center; gap: .6rem; padding: .5rem 0; border-bottom: 1px solid #1e2130; }
  li:last-child { border-bottom: none; }
  .timestamp { color: var(--muted); font-size: .75rem; margin-left: auto; }
  .empty { color: var(--muted); text-align: center; padding: 1.5rem; font-size: .9rem; }
  .modal-backdrop { position: fixed; inset: 0; background: rgba(0,0,0,.6); display: flex; align-items: center; justify-content: center; }
  .modal { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.5rem; width: 260px; }
  .modal h3 { margin-bottom: .8rem; font-size: 1rem; }
  .modal input { width: 100%; padding: .5rem; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; margin-bottom: .9rem; text-align: center; letter-spacing: .3em; }
  .modal-actions { display: flex; gap: .6rem; justify-content: flex-end; }
  .hidden { display: none; }
</style>
</head>
<body>
<header><h1>⚽ Derby Tracker</h1></header>

<main>
  <div class="card">
    <h2>Add Match</h2>
    <div class="score-row">
      <input type="number" id="home-goals" min="0" value="0">
      <span class="badge home" id="home-badge">Home</span>
      <strong>vs</strong>
      <span class="badge away" id="away-badge">Away</span>
      <input type="number" id="away-goals" min="0" value="0">
    </div>
    <button onclick="openModal('add')">Submit Match</button>
  </div>

  <div class="card">
    <h2>League Table</h2>
    <table>
      <thead>
        <tr><th>Pos</th><th>Team</th><th>P</th><th>W</th><th>D</th><th>L</th><th>GF</th><th>GA</th><th>GD</th><th>Pts</th></tr>
      </thead>
      <tbody id="standings-tbody"><tr><td colspan="10" class="empty">Loading…</td></tr></tbody>
    </table>
    <br>
    <button class="danger" onclick="openModal('reset')">Reset Season</button>
  </div>

  <div class="card">
    <h2>Recent Matches</h2>
    <ul id="matches-list"><li class="empty">Loading…</li></ul>
  </div>
</main>

<div class="modal-backdrop hidden" id="modal-backdrop">
  <div class="modal">
    <h3>Enter PIN</h3>
    <input type="password" inputmode="numeric" pattern="[0-9]*" maxlength="8" id="pin-input">
    <div class="modal-actions">
      <button onclick="confirmAction()">Confirm</button>
      <button class="danger" onclick="closeModal()">Cancel</button>
    </div>
  </div>
</div>

<script>
const homeTeam = document.body.dataset.home || 'Home';
const awayTeam = document.body.dataset.away || 'Away';
document.getElementById('home-badge').textContent = homeTeam;
document.getElementById('away-badge').textContent = awayTeam;

let modalAction = null;
let targetMatchId = null;

function openModal(action, matchId = null) {
  modalAction = action;
  targetMatchId = matchId;
  document.getElementById('pin-input').value = '';
  document.getElementById('modal-backdrop').classList.remove('hidden');
  document.getElementById('pin-input').focus();
}

function closeModal() {
  modalAction = null;
  targetMatchId = null;
  document.getElementById('modal-backdrop').classList.add('hidden');
}

async function confirmAction() {
  const pin = document.getElementById('pin-input').value;
  let resp;
  if (modalAction === 'add') {
    resp = await fetch('/api/matches', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        pin,
        home_goals: Number(document.getElementById('home-goals').value),
        away_goals: Number(document.getElementById('away-goals').value)
      })
    });
  } else if (modalAction === 'delete' && targetMatchId != null) {
    resp = await fetch(`/api/matches/${targetMatchId}`, {
      method: 'DELETE',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ pin })
    });
  } else if (modalAction === 'reset') {
    resp = await fetch('/api/reset', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ pin })
    });
  }
  if (resp && resp.status === 401) { alert('Incorrect PIN'); return; }
  if (resp && !resp.ok) { alert('Request failed: ' + await resp.text()); }
  if (modalAction === 'add') {
    document.getElementById('home-goals').value = 0;
    document.getElementById('away-goals').value = 0;
  }
  closeModal();
  await loadAll();
}

async function loadStandings() {
  const r = await fetch('/api/standings');
  if (!r.ok) return;
  const rows = await r.json();
  document.getElementById('standings-tbody').innerHTML = rows.map(t => `<tr>
    <td>${t.position}</td>
    <td><span class="badge ${t.team === homeTeam ? 'home' : 'away'}">${t.team}</span></td>
    <td>${t.played}</td><td>${t.won}</td><td>${t.drawn}</td><td>${t.lost}</td>
    <td>${t.goals_for}</td><td>${t.goals_against}</td>
    <td>${t.goal_difference}</td><td><strong>${t.points}</strong></td>
  </tr>`).join('');
}

async function loadMatches() {
  const r = await fetch('/api/matches');
  if (!r.ok) return;
  const matches = await r.json();
  const list = document.getElementById('matches-list');
  if (!matches.length) { list.innerHTML = '<li class="empty">No matches recorded yet</li>'; return; }
  list.innerHTML = matches.map(m => `<li>
    <span class="badge home">${homeTeam}</span> ${m.home_goals}
    &ndash;
    ${m.away_goals} <span class="badge away">${awayTeam}</span>
    <span class="timestamp">${new Date(m.recorded_at).toLocaleString()}</span>
    <button class="danger small" onclick="openModal('delete', ${m.id})">Delete</button>
  </li>`).join('');
}

async function loadAll() {
  await Promise.all([loadStandings(), loadMatches()]);
}

loadAll();
</script>
</body>
</html>"#;
