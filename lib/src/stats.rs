use crate::{
    error::Error,
    filter::TestFilter,
    player::{Player, Score, TestName},
    store::CombineStore,
    Result,
};
use parse_display::{Display, FromStr};
use std::fmt;

/// Who a player is ranked against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, FromStr)]
#[display(style = "snake_case")]
pub enum Group {
    /// Everyone tested that year.
    DraftClass,
    /// Everyone tested that year at the player's position.
    PosGroup,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Percentile {
    Rank(f64),
    /// The player has no recorded value, so there is nothing to rank.
    DidNotParticipate { player: String, test: TestName },
}

impl Percentile {
    pub fn rank(&self) -> Option<f64> {
        match self {
            Percentile::Rank(rank) => Some(*rank),
            Percentile::DidNotParticipate { .. } => None,
        }
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percentile::Rank(rank) => write!(f, "{:.2}", rank),
            Percentile::DidNotParticipate { player, test } => {
                write!(f, "{} did not take the {} test", player, test)
            }
        }
    }
}

/// Share of the comparison group whose value is at or above the player's, scaled to 0-100
/// and rounded to two places.
///
/// The count is `>=` for every drill, so on timed drills a slower time ranks higher.
pub fn get_percentile(
    store: &CombineStore,
    player: &Player,
    test: TestName,
    year: u16,
    group: Group,
) -> Result<Percentile> {
    log::trace!("stats::get_percentile {} {} {} {}", player.id(), test, year, group);
    let score = match player.get_score(test) {
        Score::Recorded { value, .. } => value,
        Score::Dnp => {
            return Ok(Percentile::DidNotParticipate {
                player: player.name().to_string(),
                test,
            })
        }
    };

    let mut filter = TestFilter::new().test(test).year(year);
    if group == Group::PosGroup {
        filter = filter.position(player.position());
    }
    let population = store.tests().clone().filter(filter.build())?.values()?;
    log::debug!("{} recorded {} results in comparison group", population.len(), test);

    if population.is_empty() {
        return Err(Error::EmptyPopulation { test, year });
    }
    let at_or_above = population.iter().filter(|&&v| v >= score).count();
    Ok(Percentile::Rank(rank(at_or_above, population.len())))
}

fn rank(count: usize, total: usize) -> f64 {
    let pct = 100.0 * count as f64 / total as f64;
    (pct * 100.0).round() / 100.0
}
