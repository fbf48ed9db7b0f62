// End-to-end checks over the public API using the 2000 draft class fixture.

use scout::{
    build_aggregate_table, get_percentile, AggregateQuery, CombineStore, DraftStatus, Error,
    Group, Percentile, TestName, Variable,
};
use std::fs;

const PLAYER_FILE: &str = "Pfr_ID\tPlayer\tPos\tHt\tWt\tYear\tTeam\tRound\tPick\n\
John Abraham_2000\tJohn Abraham\tOLB\t76\t252\t2000\tNew York Jets\t1\t13\n\
Shaun Alexander_2000\tShaun Alexander\tRB\t72\t218\t2000\tSeattle Seahawks\t1\t19\n\
Corey Atkins_2000\tCorey Atkins\tOLB\t72\t237\t2000\t\t\t\n";

const TEST_FILE: &str = "Pfr_ID\tPos\tYear\tTest\tValue\n\
John Abraham_2000\tOLB\t2000\tForty\t4.55\nJohn Abraham_2000\tOLB\t2000\tVertical\t\n\
John Abraham_2000\tOLB\t2000\tBenchReps\t\nJohn Abraham_2000\tOLB\t2000\tBroadJump\t\n\
John Abraham_2000\tOLB\t2000\tCone\t\nJohn Abraham_2000\tOLB\t2000\tShuttle\t\n\
Shaun Alexander_2000\tRB\t2000\tForty\t4.58\nShaun Alexander_2000\tRB\t2000\tVertical\t\n\
Shaun Alexander_2000\tRB\t2000\tBenchReps\t\nShaun Alexander_2000\tRB\t2000\tBroadJump\t\n\
Shaun Alexander_2000\tRB\t2000\tCone\t\nShaun Alexander_2000\tRB\t2000\tShuttle\t\n\
Corey Atkins_2000\tOLB\t2000\tForty\t4.72\nCorey Atkins_2000\tOLB\t2000\tVertical\t31\n\
Corey Atkins_2000\tOLB\t2000\tBenchReps\t21\nCorey Atkins_2000\tOLB\t2000\tBroadJump\t112\n\
Corey Atkins_2000\tOLB\t2000\tCone\t7.96\nCorey Atkins_2000\tOLB\t2000\tShuttle\t4.39\n";

fn store() -> CombineStore {
    CombineStore::from_readers(PLAYER_FILE.as_bytes(), TEST_FILE.as_bytes()).unwrap()
}

#[test]
fn load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let players = dir.path().join("CombinePlayer_data.txt");
    let tests = dir.path().join("CombineTest_data.txt");
    fs::write(&players, PLAYER_FILE).unwrap();
    fs::write(&tests, TEST_FILE).unwrap();

    let store = CombineStore::load(&players, &tests).unwrap();
    let john = store.get("John Abraham_2000").unwrap();
    assert_eq!(john.position(), "OLB");
    assert_eq!(john.height_text(), Some("76"));
    assert_eq!(john.height(), Some(76.0));
    assert_eq!(john.weight(), Some(252.0));
    assert_eq!(john.year(), 2000);
    assert_eq!(john.tests().len(), 6);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = CombineStore::load(dir.path().join("nope.txt"), dir.path().join("nope2.txt"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn raw_fields_round_trip() {
    let store = store();
    for line in PLAYER_FILE.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        let player = store.get(fields[0]).unwrap();
        assert_eq!(player.name(), fields[1]);
        assert_eq!(player.position(), fields[2]);
        assert_eq!(player.height_text(), Some(fields[3]));
        assert_eq!(player.weight_text(), Some(fields[4]));
        assert_eq!(player.year().to_string(), fields[5]);
        assert_eq!(player.team_label(), if fields[6].is_empty() { "Undrafted" } else { fields[6] });
    }
    assert_eq!(store.all().len(), 3);
}

#[test]
fn get_score() {
    let store = store();
    let john = store.get("John Abraham_2000").unwrap();
    assert_eq!(john.get_score(TestName::Forty).to_string(), "4.55");
    assert_eq!(john.get_score(TestName::Vertical).to_string(), "DNP");

    let corey = store.get("Corey Atkins_2000").unwrap();
    assert_eq!(corey.get_score(TestName::Cone).to_string(), "7.96");
}

#[test]
fn was_drafted_matches_team() {
    let store = store();
    for player in store.all() {
        assert_eq!(player.was_drafted(), player.team_label() != "Undrafted");
    }
    assert!(!store.get("Corey Atkins_2000").unwrap().was_drafted());
    assert_eq!(store.get("Corey Atkins_2000").unwrap().pick_label(), "Undrafted");
}

#[test]
fn get_percentile_draft_class() {
    let store = store();
    let john = store.get("John Abraham_2000").unwrap();
    let pct = get_percentile(&store, john, TestName::Forty, 2000, Group::DraftClass).unwrap();
    assert_eq!(pct, Percentile::Rank(100.0));
}

#[test]
fn get_percentile_pos_group() {
    let store = store();
    let corey = store.get("Corey Atkins_2000").unwrap();
    let pct = get_percentile(&store, corey, TestName::Forty, 2000, Group::PosGroup).unwrap();
    assert_eq!(pct, Percentile::Rank(50.0));

    // Only Corey recorded a Vertical.
    let pct = get_percentile(&store, corey, TestName::Vertical, 2000, Group::DraftClass).unwrap();
    assert_eq!(pct, Percentile::Rank(100.0));
}

#[test]
fn get_percentile_without_a_score() {
    let store = store();
    let shaun = store.get("Shaun Alexander_2000").unwrap();
    let pct = get_percentile(&store, shaun, TestName::BenchReps, 2000, Group::DraftClass).unwrap();
    assert_eq!(pct.to_string(), "Shaun Alexander did not take the BenchReps test");
}

#[test]
fn aggregate_table_drops_partial_players() {
    let store = store();
    let query = AggregateQuery::new(2000)
        .variable(Variable::Test(TestName::Forty))
        .variable(Variable::Test(TestName::Shuttle));
    let table = build_aggregate_table(&store, &query).unwrap();
    assert_eq!(table.height(), 1);
    let status = table.column("Draft Status").unwrap().str().unwrap();
    assert_eq!(status.get(0), Some("Undrafted"));
}

#[test]
fn grouped_mean_of_drafted_forty() {
    let store = store();
    let query = AggregateQuery::new(2000)
        .variable(Variable::Test(TestName::Forty))
        .position("OLB");
    let olb = build_aggregate_table(&store, &query).unwrap();
    assert_eq!(olb.height(), 2);

    let query = AggregateQuery::new(2000).variable(Variable::Test(TestName::Forty));
    let all = build_aggregate_table(&store, &query).unwrap();
    let means = all.grouped_mean(Variable::Test(TestName::Forty)).unwrap();
    assert!((means[&DraftStatus::Drafted] - 4.565).abs() < 1e-9);
    assert!((means[&DraftStatus::Undrafted] - 4.72).abs() < 1e-9);
}

#[test]
fn grouped_mean_without_undrafted_rows() {
    let store = store();
    // Corey is the only undrafted player and he is excluded by position.
    let query = AggregateQuery::new(2000)
        .variable(Variable::Test(TestName::Forty))
        .position("RB");
    let table = build_aggregate_table(&store, &query).unwrap();
    let means = table.grouped_mean(Variable::Test(TestName::Forty)).unwrap();
    assert_eq!(means.keys().collect::<Vec<_>>(), vec![&DraftStatus::Drafted]);
}

#[test]
fn grouped_mean_with_only_drafted_rows() {
    // Only John and Shaun ran the forty.
    let tests = "Pfr_ID\tPos\tYear\tTest\tValue\n\
John Abraham_2000\tOLB\t2000\tForty\t4.55\n\
Shaun Alexander_2000\tRB\t2000\tForty\t4.58\n\
Corey Atkins_2000\tOLB\t2000\tForty\t\n";
    let store = CombineStore::from_readers(PLAYER_FILE.as_bytes(), tests.as_bytes()).unwrap();
    let query = AggregateQuery::new(2000).variable(Variable::Test(TestName::Forty));
    let table = build_aggregate_table(&store, &query).unwrap();
    assert_eq!(table.height(), 2);

    let means = table.grouped_mean(Variable::Test(TestName::Forty)).unwrap();
    assert_eq!(means.len(), 1);
    assert!((means[&DraftStatus::Drafted] - 4.565).abs() < 1e-9);
    assert!(!means.contains_key(&DraftStatus::Undrafted));
}

#[test]
fn orphan_test_aborts_ingestion() {
    let tests = format!("{}Deion Sanders_1989\tCB\t1989\tForty\t4.27\n", TEST_FILE);
    let result = CombineStore::from_readers(PLAYER_FILE.as_bytes(), tests.as_bytes());
    match result {
        Err(Error::OrphanTest { test_id, player_id }) => {
            assert_eq!(test_id, "Deion Sanders_1989_Forty");
            assert_eq!(player_id, "Deion Sanders_1989");
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("store built despite orphan test"),
    }
}

#[test]
fn sql_over_store_tables() {
    let store = store();
    let df = store
        .sql("SELECT player_id, value FROM tests WHERE test = 'Forty' AND value > 4.56")
        .unwrap();
    assert_eq!(df.height(), 2);

    let df = store.sql("SELECT name FROM players WHERE team IS NULL").unwrap();
    assert_eq!(df.height(), 1);
}

#[test]
fn write_table_csv_and_parquet() {
    let store = store();
    let query = AggregateQuery::new(2000)
        .variables([Variable::Height, Variable::Weight])
        .with_position();
    let table = build_aggregate_table(&store, &query).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("table.csv");
    table.write(&csv).unwrap();
    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("Draft Status,Ht,Wt,Pos"));
    assert_eq!(text.lines().count(), 4);

    let parquet = dir.path().join("table.parquet");
    table.write(&parquet).unwrap();
    assert!(fs::metadata(&parquet).unwrap().len() > 0);

    let bad = dir.path().join("table.xlsx");
    assert!(matches!(table.write(&bad), Err(Error::Validation(_))));
    assert!(!bad.exists());
}
