pub mod injury;
pub mod penalties;
pub mod resolver;
pub mod special_teams;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::team::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Down {
    First,
    Second,
    Third,
    Fourth,
}

impl Down {
    pub fn next(self) -> Down {
        match self {
            Down::First => Down::Second,
            Down::Second => Down::Third,
            Down::Third => Down::Fourth,
            Down::Fourth => Down::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Possession {
    Home,
    Away,
}

impl Possession {
    pub fn opponent(self) -> Possession {
        match self {
            Possession::Home => Possession::Away,
            Possession::Away => Possession::Home,
        }
    }
}

/// The tagged play-result union named in `engine`'s design notes: one
/// variant per distinct play call, participant fields optional, and
/// scoring/turnover/penalty/injury carried as nullable sub-records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    Run,
    PassComplete,
    PassIncomplete,
    Sack,
    Scramble,
    Kickoff,
    Punt,
    FieldGoal,
    ExtraPoint,
    TwoPoint,
    Touchback,
    Kneel,
    Spike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoringKind {
    Touchdown,
    FieldGoal,
    ExtraPoint,
    TwoPoint,
    Safety,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Scoring {
    pub kind: ScoringKind,
    pub points: u8,
    pub scoring_team: Possession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    Interception,
    FumbleLost,
    TurnoverOnDowns,
    MissedFieldGoal,
    Punt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Turnover {
    pub kind: TurnoverKind,
    pub return_yards: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    FalseStart,
    Holding,
    PassInterference,
    Offside,
    RoughingThePasser,
    UnnecessaryRoughness,
    DelayOfGame,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Penalty {
    pub kind: PenaltyKind,
    pub yards: i16,
    pub against: Possession,
    pub automatic_first_down: bool,
    pub declined: bool,
    pub offsetting: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Injury {
    pub player_id: uuid::Uuid,
    pub player_name: String,
    pub severity: InjurySeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InjurySeverity {
    Questionable,
    Out,
}

/// Every resolved play, as §4.3 requires: type/call, yards gained,
/// optional participants, optional scoring/turnover/penalty/injury
/// sub-records, clock effects, and a human-readable description.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayOutcome {
    pub play_type: PlayType,
    pub yards_gained: i16,
    pub passer: Option<String>,
    pub rusher: Option<String>,
    pub receiver: Option<String>,
    pub defender: Option<String>,
    pub scoring: Option<Scoring>,
    pub turnover: Option<Turnover>,
    pub penalty: Option<Penalty>,
    pub injury: Option<Injury>,
    pub clock_elapsed: u16,
    pub is_clock_stopped: bool,
    pub is_first_down: bool,
    pub is_touchdown: bool,
    pub is_safety: bool,
    pub description: String,
}

/// A team's relevant personnel for a single play, resolved once per drive
/// rather than re-rostered every snap.
pub struct Personnel<'a> {
    pub qb: &'a Player,
    pub rb: &'a Player,
    pub wr: &'a Player,
    pub ol: &'a Player,
    pub dl: &'a Player,
    pub lb: &'a Player,
    pub cb: &'a Player,
    pub kicker: &'a Player,
    pub punter: &'a Player,
}

impl<'a> Personnel<'a> {
    pub fn resolve(roster: &'a [Player]) -> Personnel<'a> {
        use crate::team::{Position, starter_at};

        Personnel {
            qb: starter_at(roster, Position::Qb).expect("roster carries a QB"),
            rb: starter_at(roster, Position::Rb).expect("roster carries a RB"),
            wr: starter_at(roster, Position::Wr).expect("roster carries a WR"),
            ol: starter_at(roster, Position::Ol).expect("roster carries an OL"),
            dl: starter_at(roster, Position::Dl).expect("roster carries a DL"),
            lb: starter_at(roster, Position::Lb).expect("roster carries a LB"),
            cb: starter_at(roster, Position::Cb).expect("roster carries a CB"),
            kicker: starter_at(roster, Position::K).expect("roster carries a K"),
            punter: starter_at(roster, Position::P).expect("roster carries a P"),
        }
    }
}
