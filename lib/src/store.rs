use crate::{
    error::Error,
    filter::{self, TestsDf},
    player::{Player, PlayerId, Score, Test, TestName},
    Result,
};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// One line of the player file.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    #[serde(rename = "Pfr_ID")]
    pfr_id: String,
    #[serde(rename = "Player")]
    name: String,
    #[serde(rename = "Pos")]
    pos: String,
    #[serde(rename = "Ht")]
    ht: Option<String>,
    #[serde(rename = "Wt")]
    wt: Option<String>,
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "Team")]
    team: Option<String>,
    #[serde(rename = "Round")]
    round: Option<u16>,
    #[serde(rename = "Pick")]
    pick: Option<u16>,
}

/// One line of the test file.
#[derive(Debug, Deserialize)]
struct RawTestRow {
    #[serde(rename = "Pfr_ID")]
    pfr_id: String,
    #[serde(rename = "Pos")]
    pos: String,
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "Test")]
    test: String,
    #[serde(rename = "Value")]
    value: Option<String>,
}

fn tsv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .quoting(false)
        .from_reader(rdr)
}

/// Players and their combine tests, keyed by player id.
///
/// Built once from the two input files and read-only afterwards. Players live in
/// an arena in file order; `index` maps each key to its slot.
#[derive(Clone)]
pub struct CombineStore {
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
    tests: TestsDf,
}

impl CombineStore {
    pub fn load<P: AsRef<Path>, T: AsRef<Path>>(player_path: P, test_path: T) -> Result<Self> {
        let players = std::fs::File::open(player_path)?;
        let tests = std::fs::File::open(test_path)?;
        Self::from_readers(players, tests)
    }

    /// Parses both files. Any bad row fails the whole load, so a store is never half built.
    pub fn from_readers<P: Read, T: Read>(player_rdr: P, test_rdr: T) -> Result<Self> {
        log::trace!("store::from_readers");
        let mut players: Vec<Player> = Vec::new();
        let mut index: HashMap<PlayerId, usize> = HashMap::new();

        for row in tsv_reader(player_rdr).deserialize() {
            let row: RawPlayerRow = row?;
            let id = PlayerId::new(row.pfr_id)?;
            let player = Player::new(id.clone(), row.name, row.pos, row.year)
                .with_measurements(row.ht, row.wt)
                .with_draft(row.team, row.round, row.pick);

            match index.get(&id) {
                Some(&slot) => {
                    log::warn!("player '{}' appears more than once, keeping the last row", id);
                    players[slot] = player;
                }
                None => {
                    index.insert(id, players.len());
                    players.push(player);
                }
            }
        }
        log::debug!("{} players loaded", players.len());

        let mut test_count = 0;
        for row in tsv_reader(test_rdr).deserialize() {
            let row: RawTestRow = row?;
            let player_id = PlayerId::new(row.pfr_id)?;
            let name = TestName::parse(&row.test)?;
            let score = Score::parse(row.value.as_deref())?;
            let test = Test::new(player_id.clone(), name, score, row.year, row.pos);

            let slot = *index.get(&player_id).ok_or_else(|| Error::OrphanTest {
                test_id: test.id(),
                player_id: player_id.to_string(),
            })?;
            players[slot].add_test(test)?;
            test_count += 1;
        }
        log::debug!("{} tests loaded", test_count);

        let tests = TestsDf::from_players(&players)?;
        Ok(Self {
            players,
            index,
            tests,
        })
    }

    pub fn get(&self, player_id: &str) -> Result<&Player> {
        self.index
            .get(player_id)
            .map(|&slot| &self.players[slot])
            .ok_or_else(|| Error::PlayerNotFound(player_id.to_string()))
    }

    pub fn all(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Every test row as a relation: `test_id, player_id, pos, year, test, value`.
    pub fn tests(&self) -> &TestsDf {
        &self.tests
    }

    /// Every player row as a relation. Missing draft fields and unreadable measurements are
    /// nulls; `ht` is in inches.
    pub fn players_frame(&self) -> Result<DataFrame> {
        let ps = &self.players;
        let df = df!(
            "player_id" => ps.iter().map(|p| p.id().to_string()).collect::<Vec<_>>(),
            "name" => ps.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            "pos" => ps.iter().map(|p| p.position().to_string()).collect::<Vec<_>>(),
            "ht" => ps.iter().map(|p| p.height()).collect::<Vec<_>>(),
            "wt" => ps.iter().map(|p| p.weight()).collect::<Vec<_>>(),
            "year" => ps.iter().map(|p| p.year() as i32).collect::<Vec<_>>(),
            "team" => ps.iter().map(|p| p.team().map(str::to_string)).collect::<Vec<_>>(),
            "round" => ps.iter().map(|p| p.round().map(i32::from)).collect::<Vec<_>>(),
            "pick" => ps.iter().map(|p| p.pick().map(i32::from)).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }

    /// Runs a SQL query against the `players` and `tests` tables.
    pub fn sql(&self, query: &str) -> Result<DataFrame> {
        let players = self.players_frame()?.lazy();
        let tests = self.tests.clone().into_inner().lazy();
        let df = filter::query_sql(players, tests, query)?.collect()?;
        log::debug!("sql returned {} rows", df.height());
        Ok(df)
    }
}
