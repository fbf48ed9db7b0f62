use crate::{error::Error, Result};
use parse_display::{Display, FromStr};
use std::borrow::Borrow;
use std::fmt;

/// Text shown wherever a missing draft attribute crosses the output boundary.
pub const UNDRAFTED: &str = "Undrafted";

/// Text shown wherever a missing test value crosses the output boundary.
pub const DNP: &str = "DNP";

/// Combine drills, spelled exactly as they appear in the test file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, FromStr)]
pub enum TestName {
    Forty,
    Vertical,
    BenchReps,
    BroadJump,
    Cone,
    Shuttle,
}

impl TestName {
    pub const ALL: [TestName; 6] = [
        TestName::Forty,
        TestName::Vertical,
        TestName::BenchReps,
        TestName::BroadJump,
        TestName::Cone,
        TestName::Shuttle,
    ];

    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::Validation(format!("unknown test name '{}'", name)))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, FromStr)]
pub enum DraftStatus {
    Drafted,
    Undrafted,
}

/// Unique player key (the `Pfr_ID` column).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::Validation("player id must be a non-empty string".into()));
        }
        Ok(PlayerId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single test result. `Recorded` keeps the source text so it can be echoed back verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum Score {
    Recorded { raw: String, value: f64 },
    Dnp,
}

impl Score {
    /// Empty or absent text is a DNP; anything else must be a finite number.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(Score::Dnp),
            Some(raw) => raw,
        };
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Score::Recorded {
                raw: raw.to_string(),
                value,
            }),
            _ => Err(Error::Validation(format!("'{}' is not a numeric test value", raw))),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Recorded { value, .. } => Some(*value),
            Score::Dnp => None,
        }
    }

    pub fn is_dnp(&self) -> bool {
        matches!(self, Score::Dnp)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Recorded { raw, .. } => f.write_str(raw),
            Score::Dnp => f.write_str(DNP),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Test {
    player_id: PlayerId,
    name: TestName,
    score: Score,
    year: u16,
    position: String,
}

impl Test {
    pub fn new(player_id: PlayerId, name: TestName, score: Score, year: u16, position: String) -> Self {
        Self {
            player_id,
            name,
            score,
            year,
            position,
        }
    }

    /// Storage key, e.g. `John Abraham_2000_Forty`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.player_id, self.name)
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn name(&self) -> TestName {
        self.name
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// Position at the time of the test, which may differ from the player row.
    pub fn position(&self) -> &str {
        &self.position
    }
}

/// Reads a height as inches. Accepts plain inches (`76`) or feet-inches (`6-4`).
pub fn parse_height(text: &str) -> Option<f64> {
    let text = text.trim();
    let inches = match text.split_once('-') {
        Some((feet, inches)) => {
            let feet: f64 = feet.trim().parse().ok()?;
            let inches: f64 = inches.trim().parse().ok()?;
            feet * 12.0 + inches
        }
        None => text.parse().ok()?,
    };
    inches.is_finite().then_some(inches)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A player row. Attributes are fixed at construction; only tests are appended later.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    id: PlayerId,
    name: String,
    position: String,
    height: Option<String>,
    weight: Option<String>,
    year: u16,
    team: Option<String>,
    round: Option<u16>,
    pick: Option<u16>,
    tests: Vec<Test>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, position: impl Into<String>, year: u16) -> Self {
        Self {
            id,
            name: name.into(),
            position: position.into(),
            height: None,
            weight: None,
            year,
            team: None,
            round: None,
            pick: None,
            tests: Vec::new(),
        }
    }

    /// Height and weight exactly as written in the source file.
    pub fn with_measurements(mut self, height: Option<String>, weight: Option<String>) -> Self {
        self.height = height.filter(|h| !h.is_empty());
        self.weight = weight.filter(|w| !w.is_empty());
        self
    }

    /// A missing or `Undrafted` team means the player was not drafted.
    pub fn with_draft(mut self, team: Option<String>, round: Option<u16>, pick: Option<u16>) -> Self {
        self.team = team.filter(|t| !t.is_empty() && t != UNDRAFTED);
        self.round = round;
        self.pick = pick;
        self
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn height_text(&self) -> Option<&str> {
        self.height.as_deref()
    }

    pub fn weight_text(&self) -> Option<&str> {
        self.weight.as_deref()
    }

    /// Height in inches; `None` when absent or unreadable.
    pub fn height(&self) -> Option<f64> {
        self.height.as_deref().and_then(parse_height)
    }

    /// Weight in pounds; `None` when absent or unreadable.
    pub fn weight(&self) -> Option<f64> {
        self.weight.as_deref().and_then(parse_number)
    }

    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn round(&self) -> Option<u16> {
        self.round
    }

    pub fn pick(&self) -> Option<u16> {
        self.pick
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn add_test(&mut self, test: Test) -> Result<()> {
        if test.player_id() != &self.id {
            return Err(Error::Validation(format!(
                "test '{}' does not belong to player '{}'",
                test.id(),
                self.id
            )));
        }
        if self.tests.iter().any(|t| t.name() == test.name()) {
            return Err(Error::DuplicateTest(test.id()));
        }
        self.tests.push(test);
        Ok(())
    }

    /// Result of `test`, or DNP when the player has no such test or left it blank.
    pub fn get_score(&self, test: TestName) -> Score {
        self.tests
            .iter()
            .find(|t| t.name() == test)
            .map(|t| t.score().clone())
            .unwrap_or(Score::Dnp)
    }

    pub fn was_drafted(&self) -> bool {
        self.team.is_some()
    }

    pub fn draft_status(&self) -> DraftStatus {
        if self.was_drafted() {
            DraftStatus::Drafted
        } else {
            DraftStatus::Undrafted
        }
    }

    pub fn team_label(&self) -> &str {
        self.team.as_deref().unwrap_or(UNDRAFTED)
    }

    pub fn round_label(&self) -> String {
        self.round.map_or_else(|| UNDRAFTED.to_string(), |r| r.to_string())
    }

    pub fn pick_label(&self) -> String {
        self.pick.map_or_else(|| UNDRAFTED.to_string(), |p| p.to_string())
    }
}
