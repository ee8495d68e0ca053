//! Structured event records. Re-expresses `spec.md` §9's design note —
//! `playResult`/`gameState`/`commentary`/`narrativeContext` as
//! source-language objects with many nullable fields — as a tagged
//! `EventType` enum over the play-call union, with the game state snapshot
//! and narrative context carried alongside each play.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::play::PlayOutcome;

use super::narrative::NarrativeSnapshot;
use super::state::GameState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Commentary {
    pub text: String,
    pub excitement: u8,
}

/// One play in a game's append-only log. `event_number` is dense from 1,
/// `display_timestamp` is the millisecond offset from broadcast start and
/// is non-decreasing across the log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameEvent {
    pub game_id: Uuid,
    pub event_number: u32,
    pub play_result: PlayOutcome,
    pub commentary: Commentary,
    pub game_state: GameState,
    pub narrative_context: Option<NarrativeSnapshot>,
    pub display_timestamp: u64,
}

/// Pacing floors, in milliseconds, per `spec.md` §4.4. The final delay for
/// an event is `max(floor, jitter)`, assigned during emission.
pub mod pacing {
    pub const ROUTINE_MS: u64 = 1200;
    pub const TOUCHDOWN_MS: u64 = 3500;
    pub const TURNOVER_MS: u64 = 3000;
    pub const SCORING_MS: u64 = 2500;
    pub const BIG_PLAY_MS: u64 = 2000;
    pub const SACK_OR_PENALTY_MS: u64 = 1800;
}

/// Determines the pacing floor for `outcome`, per the priority order
/// implied by `spec.md` §4.4 (touchdown takes precedence over "scoring"
/// in general, turnovers over big plays, etc).
pub fn pacing_floor_ms(outcome: &PlayOutcome) -> u64 {
    use crate::play::PlayType;

    if outcome.is_touchdown {
        return pacing::TOUCHDOWN_MS;
    }
    if outcome.turnover.is_some() {
        return pacing::TURNOVER_MS;
    }
    if outcome.scoring.is_some() {
        return pacing::SCORING_MS;
    }
    if outcome.yards_gained.abs() >= 20 {
        return pacing::BIG_PLAY_MS;
    }
    if matches!(outcome.play_type, PlayType::Sack) || outcome.penalty.is_some() {
        return pacing::SACK_OR_PENALTY_MS;
    }
    pacing::ROUTINE_MS
}

/// Generates commentary text and an excitement score for `outcome`.
/// Excitement scales with the pacing floor (a rough proxy for how
/// dramatic the play reads) plus a jitter term for variety.
pub fn commentary_for(outcome: &PlayOutcome, jitter: f64) -> Commentary {
    let base = match pacing_floor_ms(outcome) {
        ms if ms == pacing::TOUCHDOWN_MS => 90,
        ms if ms == pacing::TURNOVER_MS => 80,
        ms if ms == pacing::SCORING_MS => 65,
        ms if ms == pacing::BIG_PLAY_MS => 55,
        ms if ms == pacing::SACK_OR_PENALTY_MS => 40,
        _ => 25,
    };
    let excitement = (base as f64 + jitter * 15.0).clamp(0.0, 100.0) as u8;

    Commentary {
        text: outcome.description.clone(),
        excitement,
    }
}
