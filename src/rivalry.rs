//! Static rivalry table. Rivalries are configuration data, not logic: the
//! pairs below are built into a symmetric lookup once, on first use.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::domain::Sport;

/// Rivalry pairs per sport. Each pair is implicitly symmetric.
const RIVALRY_PAIRS: &[(Sport, &str, &str)] = &[
    (Sport::Nba, "Boston Celtics", "Los Angeles Lakers"),
    (Sport::Nba, "Boston Celtics", "Philadelphia 76ers"),
    (Sport::Nba, "Los Angeles Lakers", "Los Angeles Clippers"),
    (Sport::Nba, "New York Knicks", "Brooklyn Nets"),
    (Sport::Nba, "New York Knicks", "Miami Heat"),
    (Sport::Nba, "Chicago Bulls", "Detroit Pistons"),
    (Sport::Nba, "Golden State Warriors", "Cleveland Cavaliers"),
    (Sport::Nfl, "Green Bay Packers", "Chicago Bears"),
    (Sport::Nfl, "Dallas Cowboys", "Washington Commanders"),
    (Sport::Nfl, "Dallas Cowboys", "Philadelphia Eagles"),
    (Sport::Nfl, "Pittsburgh Steelers", "Baltimore Ravens"),
    (Sport::Nfl, "Kansas City Chiefs", "Las Vegas Raiders"),
    (Sport::Mlb, "New York Yankees", "Boston Red Sox"),
    (Sport::Mlb, "Los Angeles Dodgers", "San Francisco Giants"),
    (Sport::Mlb, "Chicago Cubs", "St. Louis Cardinals"),
    (Sport::Nhl, "Boston Bruins", "Montreal Canadiens"),
    (Sport::Nhl, "Pittsburgh Penguins", "Philadelphia Flyers"),
    (Sport::Nhl, "Edmonton Oilers", "Calgary Flames"),
];

type RivalryTable = FxHashMap<Sport, FxHashMap<&'static str, Vec<&'static str>>>;

static RIVALS: Lazy<RivalryTable> = Lazy::new(|| {
    let mut rivals: RivalryTable = FxHashMap::default();
    for &(sport, a, b) in RIVALRY_PAIRS {
        let by_team = rivals.entry(sport).or_default();
        by_team.entry(a).or_default().push(b);
        by_team.entry(b).or_default().push(a);
    }
    rivals
});

/// Teams `team` has a rivalry with, or an empty slice.
pub fn rivals_of(sport: Sport, team: &str) -> &'static [&'static str] {
    RIVALS
        .get(&sport)
        .and_then(|by_team| by_team.get(team))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn are_rivals(sport: Sport, team_a: &str, team_b: &str) -> bool {
    rivals_of(sport, team_a).contains(&team_b)
}
