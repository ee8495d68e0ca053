use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::rng::GameRng;

/// RGB color, as in the teacher's ESPN-logo `Color` type, reused for team
/// primary/secondary colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 {
            return None;
        }
        Some(Self {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Conference {
    Afc,
    Nfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum Division {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlayStyle {
    Balanced,
    PassHeavy,
    RunHeavy,
    Aggressive,
    Conservative,
}

/// Static, seed-time-only team data. Loaded into the `teams` table once by
/// `store::teams::seed_if_empty` and never mutated afterward.
pub struct TeamSeed {
    pub abbreviation: &'static str,
    pub city: &'static str,
    pub mascot: &'static str,
    pub conference: Conference,
    pub division: Division,
    pub offense: u8,
    pub defense: u8,
    pub special_teams: u8,
    pub play_style: PlayStyle,
    pub primary_color: Color,
    pub secondary_color: Color,
}

macro_rules! team {
    ($abbr:literal, $city:literal, $mascot:literal, $conf:ident, $div:ident, $off:literal, $def:literal, $st:literal, $style:ident, $pr:expr, $sc:expr) => {
        TeamSeed {
            abbreviation: $abbr,
            city: $city,
            mascot: $mascot,
            conference: Conference::$conf,
            division: Division::$div,
            offense: $off,
            defense: $def,
            special_teams: $st,
            play_style: PlayStyle::$style,
            primary_color: $pr,
            secondary_color: $sc,
        }
    };
}

const fn c(r: u8, g: u8, b: u8) -> Color {
    Color { r, g, b }
}

/// All 32 NFL teams, grouped by conference and division. Ratings are
/// fictional baselines (60-90) intended to produce a realistic competitive
/// spread, not a reproduction of any real roster's strength.
pub const NFL_TEAMS: &[TeamSeed] = &[
    // AFC East
    team!("BUF", "Buffalo", "Bills", Afc, East, 84, 78, 75, Balanced, c(0, 51, 141), c(198, 12, 48)),
    team!("MIA", "Miami", "Dolphins", Afc, East, 80, 70, 72, PassHeavy, c(0, 142, 151), c(252, 76, 2)),
    team!("NE", "New England", "Patriots", Afc, East, 70, 76, 74, Conservative, c(0, 34, 68), c(198, 12, 48)),
    team!("NYJ", "New York", "Jets", Afc, East, 68, 80, 70, RunHeavy, c(18, 87, 64), c(255, 255, 255)),
    // AFC North
    team!("BAL", "Baltimore", "Ravens", Afc, North, 86, 82, 78, Aggressive, c(36, 23, 115), c(0, 0, 0)),
    team!("CIN", "Cincinnati", "Bengals", Afc, North, 83, 72, 71, PassHeavy, c(251, 79, 20), c(0, 0, 0)),
    team!("CLE", "Cleveland", "Browns", Afc, North, 72, 81, 73, Balanced, c(49, 29, 0), c(255, 60, 0)),
    team!("PIT", "Pittsburgh", "Steelers", Afc, North, 75, 84, 77, RunHeavy, c(255, 182, 18), c(0, 0, 0)),
    // AFC South
    team!("HOU", "Houston", "Texans", Afc, South, 79, 74, 70, Balanced, c(3, 32, 47), c(167, 25, 48)),
    team!("IND", "Indianapolis", "Colts", Afc, South, 73, 69, 68, PassHeavy, c(0, 44, 95), c(255, 255, 255)),
    team!("JAX", "Jacksonville", "Jaguars", Afc, South, 70, 68, 66, Aggressive, c(16, 24, 32), c(159, 160, 163)),
    team!("TEN", "Tennessee", "Titans", Afc, South, 67, 71, 69, RunHeavy, c(12, 35, 64), c(75, 146, 219)),
    // AFC West
    team!("DEN", "Denver", "Broncos", Afc, West, 74, 79, 73, Conservative, c(251, 79, 20), c(0, 34, 68)),
    team!("KC", "Kansas City", "Chiefs", Afc, West, 90, 76, 80, Aggressive, c(227, 24, 55), c(255, 184, 28)),
    team!("LV", "Las Vegas", "Raiders", Afc, West, 71, 70, 70, Balanced, c(0, 0, 0), c(165, 172, 175)),
    team!("LAC", "Los Angeles", "Chargers", Afc, West, 78, 73, 72, PassHeavy, c(0, 128, 198), c(255, 194, 14)),
    // NFC East
    team!("DAL", "Dallas", "Cowboys", Nfc, East, 82, 75, 76, Balanced, c(0, 53, 148), c(134, 147, 151)),
    team!("NYG", "New York", "Giants", Nfc, East, 69, 73, 68, Conservative, c(1, 35, 82), c(163, 13, 45)),
    team!("PHI", "Philadelphia", "Eagles", Nfc, East, 88, 77, 75, Aggressive, c(0, 76, 84), c(165, 172, 175)),
    team!("WSH", "Washington", "Commanders", Nfc, East, 77, 72, 69, PassHeavy, c(90, 20, 20), c(255, 182, 18)),
    // NFC North
    team!("CHI", "Chicago", "Bears", Nfc, North, 72, 78, 71, RunHeavy, c(11, 22, 42), c(200, 56, 3)),
    team!("DET", "Detroit", "Lions", Nfc, North, 85, 74, 74, Aggressive, c(0, 118, 182), c(176, 183, 188)),
    team!("GB", "Green Bay", "Packers", Nfc, North, 81, 76, 73, Balanced, c(24, 48, 40), c(255, 184, 28)),
    team!("MIN", "Minnesota", "Vikings", Nfc, North, 79, 72, 72, PassHeavy, c(79, 38, 131), c(255, 198, 47)),
    // NFC South
    team!("ATL", "Atlanta", "Falcons", Nfc, South, 76, 69, 70, Balanced, c(167, 25, 48), c(0, 0, 0)),
    team!("CAR", "Carolina", "Panthers", Nfc, South, 66, 71, 67, Conservative, c(0, 133, 202), c(16, 24, 32)),
    team!("NO", "New Orleans", "Saints", Nfc, South, 73, 75, 71, Balanced, c(211, 188, 141), c(0, 0, 0)),
    team!("TB", "Tampa Bay", "Buccaneers", Nfc, South, 78, 70, 69, PassHeavy, c(213, 10, 10), c(52, 48, 43)),
    // NFC West
    team!("ARI", "Arizona", "Cardinals", Nfc, West, 71, 69, 68, RunHeavy, c(151, 35, 63), c(0, 0, 0)),
    team!("LAR", "Los Angeles", "Rams", Nfc, West, 83, 77, 75, Aggressive, c(0, 53, 148), c(255, 209, 0)),
    team!("SF", "San Francisco", "49ers", Nfc, West, 87, 85, 78, Balanced, c(170, 0, 0), c(173, 153, 93)),
    team!("SEA", "Seattle", "Seahawks", Nfc, West, 80, 80, 76, Aggressive, c(0, 34, 68), c(105, 190, 40)),
];

/// A persisted team row, seeded once from [`NFL_TEAMS`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub id: Uuid,
    pub abbreviation: String,
    pub city: String,
    pub mascot: String,
    pub conference: Conference,
    pub division: Division,
    pub offense: u8,
    pub defense: u8,
    pub special_teams: u8,
    pub play_style: PlayStyle,
    pub primary_color: Color,
    pub secondary_color: Color,
}

impl Team {
    pub fn from_seed(id: Uuid, seed: &TeamSeed) -> Self {
        Self {
            id,
            abbreviation: seed.abbreviation.to_string(),
            city: seed.city.to_string(),
            mascot: seed.mascot.to_string(),
            conference: seed.conference,
            division: seed.division,
            offense: seed.offense,
            defense: seed.defense,
            special_teams: seed.special_teams,
            play_style: seed.play_style,
            primary_color: seed.primary_color,
            secondary_color: seed.secondary_color,
        }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.city, self.mascot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    Ol,
    Dl,
    Lb,
    Cb,
    S,
    K,
    P,
}

/// Minimum roster composition by position, summing to 26 — the floor
/// `spec.md` §3 names for a team's roster size.
const ROSTER_TEMPLATE: &[(Position, u8)] = &[
    (Position::Qb, 2),
    (Position::Rb, 3),
    (Position::Wr, 4),
    (Position::Te, 2),
    (Position::Ol, 5),
    (Position::Dl, 4),
    (Position::Lb, 3),
    (Position::Cb, 2),
    (Position::S, 2),
    (Position::K, 1),
    (Position::P, 1),
];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Player {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub position: Position,
    pub jersey_number: u8,
    pub rating: u8,
    pub speed: u8,
    pub strength: u8,
    pub awareness: u8,
    pub clutch_rating: u8,
    pub injury_prone: bool,
}

const FIRST_NAMES: &[&str] = &[
    "James", "Michael", "Chris", "Marcus", "DeShawn", "Tyler", "Jordan", "Antoine", "Derek",
    "Malik", "Trevor", "Isaiah", "Xavier", "Cole", "Brandon",
];

const LAST_NAMES: &[&str] = &[
    "Johnson", "Williams", "Davis", "Carter", "Harrison", "Mitchell", "Turner", "Brooks",
    "Freeman", "Reed", "Sanders", "Griffin", "Coleman", "Bishop", "Hayes",
];

/// Deterministically generates a roster for `team_id`. Roster size is the
/// `ROSTER_TEMPLATE` total (26); jersey numbers are assigned uniquely where
/// possible by drawing from a shuffled pool per position group.
pub fn generate_roster(rng: &mut GameRng, team_id: Uuid) -> Vec<Player> {
    let mut numbers: Vec<u8> = (1..=99).collect();
    numbers = rng.shuffle(&numbers);
    let mut next_number = 0usize;

    let mut roster = Vec::new();

    for &(position, count) in ROSTER_TEMPLATE {
        for _ in 0..count {
            let first = FIRST_NAMES[rng.random_int(0, FIRST_NAMES.len() as i64 - 1) as usize];
            let last = LAST_NAMES[rng.random_int(0, LAST_NAMES.len() as i64 - 1) as usize];

            let jersey_number = numbers[next_number % numbers.len()];
            next_number += 1;

            let rating = rng.random_int(60, 99) as u8;
            let speed = rng.random_int(60, 99) as u8;
            let strength = rng.random_int(60, 99) as u8;
            let awareness = rng.random_int(60, 99) as u8;
            let clutch_rating = rng.random_int(60, 99) as u8;
            let injury_prone = rng.probability(0.12);

            roster.push(Player {
                id: Uuid::new_v4(),
                team_id,
                name: format!("{first} {last}"),
                position,
                jersey_number,
                rating,
                speed,
                strength,
                awareness,
                clutch_rating,
                injury_prone,
            });
        }
    }

    roster
}

/// Picks the first player at `position` on the roster, falling back to the
/// highest-rated player overall if the roster happens to carry none (never
/// true for a roster built from [`ROSTER_TEMPLATE`], but resolvers should
/// not panic on a hand-assembled test roster missing a position).
pub fn starter_at(roster: &[Player], position: Position) -> Option<&Player> {
    roster
        .iter()
        .filter(|p| p.position == position)
        .max_by_key(|p| p.rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_round_trips() {
        let color = Color { r: 12, g: 200, b: 7 };
        assert_eq!(Color::from_hex(&color.to_hex()), Some(color));
    }

    #[test]
    fn has_exactly_thirty_two_teams() {
        assert_eq!(NFL_TEAMS.len(), 32);
    }

    #[test]
    fn four_teams_per_conference_division() {
        for conf in [Conference::Afc, Conference::Nfc] {
            for div in [Division::North, Division::South, Division::East, Division::West] {
                let count = NFL_TEAMS
                    .iter()
                    .filter(|t| t.conference == conf && t.division == div)
                    .count();
                assert_eq!(count, 4);
            }
        }
    }

    #[test]
    fn abbreviations_are_unique_and_short() {
        let mut seen = std::collections::HashSet::new();
        for team in NFL_TEAMS {
            assert!(team.abbreviation.len() <= 5);
            assert!(seen.insert(team.abbreviation));
        }
    }

    #[test]
    fn generated_roster_meets_minimum_size() {
        let mut rng = GameRng::new("s", "c", 0);
        let roster = generate_roster(&mut rng, Uuid::new_v4());
        assert!(roster.len() >= 26);
    }

    #[test]
    fn roster_generation_is_deterministic() {
        let team_id = Uuid::nil();
        let mut a = GameRng::new("seed", "client", 0);
        let mut b = GameRng::new("seed", "client", 0);
        let roster_a = generate_roster(&mut a, team_id);
        let roster_b = generate_roster(&mut b, team_id);

        let names_a: Vec<_> = roster_a.iter().map(|p| p.name.clone()).collect();
        let names_b: Vec<_> = roster_b.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names_a, names_b);
    }
}
