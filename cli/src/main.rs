use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use scout::{
    build_aggregate_table, features::FeatureSet, get_percentile, AggregateQuery, CombineStore,
    Group, TestName, Variable,
};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Tab-delimited player file
    #[arg(short = 'p', long = "players", value_name = "FILE")]
    players: PathBuf,

    /// Tab-delimited test file
    #[arg(short = 't', long = "tests", value_name = "FILE")]
    tests: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a player's result for one test
    Score {
        player_id: String,
        test: TestName,
    },
    /// Rank a player's result within a draft class or position group
    Percentile {
        player_id: String,
        test: TestName,
        #[arg(short, long)]
        year: u16,
        #[arg(short, long, default_value = "draft_class")]
        group: Group,
    },
    /// Build the per-player table behind bar, histogram, box and scatter plots
    Table {
        #[arg(short, long)]
        year: u16,
        /// Ht, Wt or a test name; repeat for more columns
        #[arg(long = "var", required = true)]
        variables: Vec<Variable>,
        #[arg(long)]
        position: Option<String>,
        /// Add the Pos column used for clustering
        #[arg(long)]
        with_position: bool,
        /// Write the table to a .csv or .parquet file
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Mean of one variable for drafted and undrafted players
    Mean {
        #[arg(short, long)]
        year: u16,
        #[arg(long = "var")]
        variable: Variable,
        #[arg(long)]
        position: Option<String>,
    },
    /// Feature matrix and position labels for a classifier
    Features {
        #[arg(long = "var", required = true)]
        variables: Vec<Variable>,
        #[arg(short, long)]
        year: Option<u16>,
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Run SQL against the `players` and `tests` tables
    Sql { query: String },
}

fn aggregate_query(year: u16, variables: Vec<Variable>, position: Option<String>) -> AggregateQuery {
    let query = AggregateQuery::new(year).variables(variables);
    match position {
        Some(position) => query.position(&position),
        None => query,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set the default level based on verbosity
    let default_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new().add_filter_allow_str("scout").build();

    TermLogger::init(
        default_level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    log::trace!("Args {:#?}", args);

    let store = CombineStore::load(&args.players, &args.tests)?;
    log::info!("Loaded {} players", store.len());

    match args.command {
        Command::Score { player_id, test } => {
            let player = store.get(&player_id)?;
            println!("{}", player.get_score(test));
        }
        Command::Percentile {
            player_id,
            test,
            year,
            group,
        } => {
            let player = store.get(&player_id)?;
            println!("{}", get_percentile(&store, player, test, year, group)?);
        }
        Command::Table {
            year,
            variables,
            position,
            with_position,
            out,
        } => {
            if variables.len() > 2 && !with_position {
                bail!("Tables take one or two variables. Pass --with-position for cluster inputs.");
            }
            let mut query = aggregate_query(year, variables, position);
            if with_position {
                query = query.with_position();
            }
            let table = build_aggregate_table(&store, &query)?;
            match out {
                Some(path) => table.write(path)?,
                None => println!("{}", *table),
            }
        }
        Command::Mean {
            year,
            variable,
            position,
        } => {
            let query = aggregate_query(year, vec![variable], position);
            let table = build_aggregate_table(&store, &query)?;
            println!("{}", table.grouped_mean_frame(variable)?);
        }
        Command::Features {
            variables,
            year,
            out,
        } => {
            let set = FeatureSet::from_store(&store, &variables, year)?;
            if set.is_empty() {
                bail!("No players have all of the requested variables");
            }
            println!("feature shape: {:?}", set.shape());
            println!("label shape: ({},)", set.y().len());
            println!("classes: {}", set.classes().join(", "));
            let mut df = set.to_frame()?;
            match out {
                Some(path) => scout::write_table(&mut df, path)?,
                None => println!("{}", df),
            }
        }
        Command::Sql { query } => {
            println!("{}", store.sql(&query)?);
        }
    }

    Ok(())
}
