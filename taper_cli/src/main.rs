mod providers;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use taper_core::aggregate::{Countdown, ShoeStatus};
use taper_core::calendar::{parse_iso_date, week_anchor};
use taper_core::export::export_weekly_csv;
use taper_core::import::apply_activities;
use taper_core::pace::{parse_race_time, training_paces, RaceDistance};
use taper_core::rebalance::revert_window;
use taper_core::weather::best_start_time;
use taper_core::*;

const OPEN_METEO_URL_VAR: &str = "TAPER_OPEN_METEO_URL";
const STRAVA_URL_VAR: &str = "TAPER_STRAVA_API_URL";

#[derive(Parser)]
#[command(name = "taper")]
#[command(about = "Adaptive marathon training calendar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the next workouts (default)
    Upcoming {
        /// Number of days to show
        #[arg(long, default_value_t = 7)]
        days: usize,
    },

    /// Show a month of the plan
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        month: Option<String>,
    },

    /// Show one workout in detail
    Show { id: u32 },

    /// Log a completed run against a workout
    Log {
        id: u32,

        #[arg(long, default_value = "")]
        miles: String,

        /// Average pace as M:SS
        #[arg(long, default_value = "")]
        pace: String,

        /// Elevation gain in feet
        #[arg(long, default_value = "")]
        elev: String,

        /// Grade-adjusted pace; computed when omitted
        #[arg(long, default_value = "")]
        gap: String,

        #[arg(long, default_value = "")]
        notes: String,

        /// Remove the logged result instead
        #[arg(long, conflicts_with_all = ["miles", "pace", "elev", "gap", "notes"])]
        clear: bool,
    },

    /// Daily check-in; rebalances the coming week
    Checkin {
        /// Joint pain, 1-10
        #[arg(long, default_value = "")]
        joint: String,

        /// Effort of the last session, 1-10
        #[arg(long, default_value = "")]
        rpe: String,
    },

    /// Restore the coming week to the original plan
    Revert,

    /// Weekly mileage, logged plus planned
    Mileage,

    /// Export weekly mileage to CSV
    Export {
        /// Output file (defaults to weekly_mileage.csv in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Shoe mileage, intensity split and race countdowns
    Status,

    /// Training paces from a recent race
    Paces {
        /// mile, 5k, 10k, 10mi, half or marathon
        distance: String,

        /// Finishing time as H:MM:SS or M:SS
        time: String,
    },

    /// Forecast and best start time for a workout
    Weather {
        /// Workout id (defaults to today's workout)
        id: Option<u32>,
    },

    /// Import recent runs from Strava
    Sync,

    /// Discard the stored plan and generate a fresh one
    Regenerate {
        /// Required when any run has been logged
        #[arg(long)]
        force: bool,
    },
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("{}: {}", s, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    taper_core::logging::init(cli.verbose);

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let repo = JsonFileRepository::new(config.plan_path(&data_dir));

    match cli.command {
        Some(Commands::Upcoming { days }) => cmd_upcoming(&repo, today, days),
        Some(Commands::Calendar { month }) => cmd_calendar(&repo, today, month),
        Some(Commands::Show { id }) => cmd_show(&repo, id),
        Some(Commands::Log {
            id,
            miles,
            pace,
            elev,
            gap,
            notes,
            clear,
        }) => {
            if clear {
                cmd_clear(&repo, id)
            } else {
                let result = LoggedResult::from_form(&miles, &pace, &elev, &gap, &notes);
                cmd_log(&repo, id, result)
            }
        }
        Some(Commands::Checkin { joint, rpe }) => cmd_checkin(&repo, today, &joint, &rpe),
        Some(Commands::Revert) => cmd_revert(&repo, today),
        Some(Commands::Mileage) => cmd_mileage(&repo, today),
        Some(Commands::Export { output }) => {
            let output = output.unwrap_or_else(|| data_dir.join("weekly_mileage.csv"));
            cmd_export(&repo, today, &output)
        }
        Some(Commands::Status) => cmd_status(&repo, today, config.shoe.limit_miles),
        Some(Commands::Paces { distance, time }) => cmd_paces(&distance, &time),
        Some(Commands::Weather { id }) => cmd_weather(&repo, today, id, &config).await,
        Some(Commands::Sync) => cmd_sync(&repo, &config).await,
        Some(Commands::Regenerate { force }) => cmd_regenerate(&repo, force),
        None => cmd_upcoming(&repo, today, 7),
    }
}

fn cmd_upcoming(repo: &JsonFileRepository, today: NaiveDate, days: usize) -> Result<()> {
    let store = load_or_generate(repo)?;

    let upcoming: Vec<&WorkoutRecord> = store.upcoming(today, days).collect();
    if upcoming.is_empty() {
        println!("No workouts on or after {}. The plan has ended.", today);
        return Ok(());
    }

    for record in upcoming {
        println!("{}", workout_line(record, today));
    }
    Ok(())
}

fn cmd_calendar(repo: &JsonFileRepository, today: NaiveDate, month: Option<String>) -> Result<()> {
    let (year, month) = match month {
        Some(m) => parse_month(&m)?,
        None => (today.year(), today.month()),
    };
    let store = load_or_generate(repo)?;

    let records: Vec<&WorkoutRecord> = store.in_month(year, month).collect();
    if records.is_empty() {
        println!("No workouts in {}-{:02}.", year, month);
        return Ok(());
    }

    println!("{}-{:02}", year, month);
    let mut current_week = None;
    for record in records {
        let anchor = week_anchor(record.date);
        if current_week != Some(anchor) {
            println!("\n  Week of {}", anchor.format("%b %-d"));
            current_week = Some(anchor);
        }
        println!("  {}", workout_line(record, today));
    }
    Ok(())
}

fn cmd_show(repo: &JsonFileRepository, id: u32) -> Result<()> {
    let store = load_or_generate(repo)?;
    let record = store
        .get(id)
        .ok_or_else(|| Error::Other(format!("No workout with id {}", id)))?;

    println!("#{} {} ({})", record.id, record.title, record.date.format("%a %b %-d, %Y"));
    println!("  Type:    {}", record.kind);
    println!("  Planned: {} mi @ {}", record.planned_miles, record.planned_pace);
    println!("  {}", record.description);

    if record.is_altered {
        if let Some(ref original) = record.original {
            println!(
                "  Altered from: {} ({} mi @ {})",
                original.title, original.miles, original.pace
            );
        }
    }

    if record.is_logged() {
        println!();
        println!("  Logged:");
        if let Some(miles) = record.actual_miles {
            println!("    Miles: {}", miles);
        }
        if let Some(pace) = record.actual_pace {
            println!("    Pace:  {}/mi", pace);
        }
        if let Some(elev) = record.actual_elev {
            println!("    Elev:  {} ft", elev);
        }
        if let Some(gap) = record.actual_gap {
            println!("    GAP:   {}/mi", gap);
        }
        if let Some(ref notes) = record.notes {
            println!("    Notes: {}", notes);
        }
    }
    Ok(())
}

fn cmd_log(repo: &JsonFileRepository, id: u32, result: LoggedResult) -> Result<()> {
    let mut store = load_or_generate(repo)?;
    let gap = result.gap;

    if !store.save_result(id, result) {
        return Err(Error::Other(format!("No workout with id {}", id)));
    }
    repo.save(store.records())?;

    println!("✓ Logged workout #{}", id);
    if let Some(gap) = gap {
        println!("  GAP: {}/mi", gap);
    }
    Ok(())
}

fn cmd_clear(repo: &JsonFileRepository, id: u32) -> Result<()> {
    let mut store = load_or_generate(repo)?;
    if !store.clear_result(id) {
        return Err(Error::Other(format!("No workout with id {}", id)));
    }
    repo.save(store.records())?;

    println!("✓ Cleared result for workout #{}", id);
    Ok(())
}

fn cmd_checkin(repo: &JsonFileRepository, today: NaiveDate, joint: &str, rpe: &str) -> Result<()> {
    let mut store = load_or_generate(repo)?;
    let report = rebalance(&mut store, parse_score(joint), parse_score(rpe), today);
    repo.save(store.records())?;

    println!("{}", report.decision);
    for id in &report.altered {
        if let Some(record) = store.get(*id) {
            println!("  {}", workout_line(record, today));
        }
    }
    Ok(())
}

fn cmd_revert(repo: &JsonFileRepository, today: NaiveDate) -> Result<()> {
    let mut store = load_or_generate(repo)?;
    let reverted = revert_window(&mut store, today);

    if reverted.is_empty() {
        println!("Nothing to revert; the coming week matches the plan.");
        return Ok(());
    }

    repo.save(store.records())?;
    println!("✓ Restored {} workouts", reverted.len());
    Ok(())
}

fn cmd_mileage(repo: &JsonFileRepository, today: NaiveDate) -> Result<()> {
    const MILES_PER_BLOCK: f64 = 2.0;

    let store = load_or_generate(repo)?;
    let current = week_anchor(today);

    for week in weekly_mileage(store.records(), today) {
        let done = (week.achieved / MILES_PER_BLOCK).round() as usize;
        let ahead = (week.future / MILES_PER_BLOCK).round() as usize;
        let marker = if week.anchor == current { ">" } else { " " };
        println!(
            "{} {:>5} {:>6.1} mi  {}{}",
            marker,
            week.label,
            week.total(),
            "█".repeat(done),
            "░".repeat(ahead)
        );
    }
    Ok(())
}

fn cmd_export(repo: &JsonFileRepository, today: NaiveDate, output: &Path) -> Result<()> {
    let store = load_or_generate(repo)?;
    let weeks = weekly_mileage(store.records(), today);
    let count = export_weekly_csv(&weeks, output)?;

    println!("✓ Exported {} weeks", count);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn cmd_status(repo: &JsonFileRepository, today: NaiveDate, shoe_limit: f64) -> Result<()> {
    let store = load_or_generate(repo)?;
    let w = widgets(store.records(), today, shoe_limit);

    let shoe_note = match w.shoe.status {
        ShoeStatus::Fresh => "",
        ShoeStatus::Worn => " (getting worn)",
        ShoeStatus::Replace => " (replace soon)",
    };
    println!(
        "Shoes:     {:.1} / {:.0} mi ({:.0}%){}",
        w.shoe.miles,
        w.shoe.limit,
        w.shoe.percent(),
        shoe_note
    );

    match w.split {
        Some(split) => println!(
            "Intensity: {}% easy / {}% hard",
            split.easy_percent, split.hard_percent
        ),
        None => println!("Intensity: no runs logged yet"),
    }

    for race in &w.races {
        match race.countdown {
            Countdown::Days(days) => println!("{}: {} days", race.name, days),
            Countdown::Passed => println!("{}: done", race.name),
        }
    }
    Ok(())
}

fn cmd_paces(distance: &str, time: &str) -> Result<()> {
    let distance: RaceDistance = distance.parse()?;
    let seconds = parse_race_time(time)
        .ok_or_else(|| Error::Other(format!("Invalid race time: {:?} (expected H:MM:SS)", time)))?;

    let paces = training_paces(distance, seconds);
    println!("Long:  {}", paces.long);
    println!("Tempo: {}", paces.tempo);
    println!("Speed: {}", paces.speed);
    Ok(())
}

async fn cmd_weather(
    repo: &JsonFileRepository,
    today: NaiveDate,
    id: Option<u32>,
    config: &Config,
) -> Result<()> {
    let store = load_or_generate(repo)?;
    let record = match id {
        Some(id) => store.get(id),
        None => store.get_by_date(today),
    }
    .ok_or_else(|| Error::Other("No matching workout".into()))?;

    let base = provider_base(OPEN_METEO_URL_VAR, providers::openmeteo::OPEN_METEO_BASE);
    let forecast = providers::openmeteo::fetch_forecast(&base, &config.location).await?;

    for (date, day) in forecast.daily.range(today..).take(7) {
        println!(
            "{} {} {}°F",
            date.format("%a %-m/%-d"),
            day.condition.icon(),
            day.temp_f
        );
    }

    println!();
    println!("{}", workout_line(record, today));
    match best_start_time(&forecast, record) {
        Some(best) => println!("  {}", best),
        None => println!("  No hourly forecast for {} yet", record.date),
    }
    Ok(())
}

async fn cmd_sync(repo: &JsonFileRepository, config: &Config) -> Result<()> {
    // Fail on a corrupt plan before touching the network
    let mut store = load_or_generate(repo)?;

    let strava = config.strava.clone().with_env_overrides();
    let base = provider_base(STRAVA_URL_VAR, providers::strava::STRAVA_API_BASE);
    let token = providers::strava::access_token(&base, &strava).await?;
    let activities = providers::strava::fetch_activities(
        &base,
        &token,
        providers::strava::ACTIVITIES_PER_PAGE,
    )
    .await?;

    let summary = apply_activities(&mut store, &activities);
    if !summary.synced.is_empty() {
        repo.save(store.records())?;
    }

    println!(
        "✓ Synced {} runs ({} skipped, {} ignored)",
        summary.synced.len(),
        summary.skipped,
        summary.ignored
    );
    for date in &summary.synced {
        println!("  {}", date);
    }
    Ok(())
}

fn cmd_regenerate(repo: &JsonFileRepository, force: bool) -> Result<()> {
    if !force {
        if let Some(records) = repo.load()? {
            let logged = records.iter().filter(|r| r.is_logged()).count();
            if logged > 0 {
                return Err(Error::Other(format!(
                    "{} logged runs would be lost; pass --force to regenerate anyway",
                    logged
                )));
            }
        }
    }

    let store = WorkoutStore::generate();
    repo.save(store.records())?;
    println!("✓ Generated a fresh plan with {} workouts", store.len());
    Ok(())
}

fn provider_base(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_month(input: &str) -> Result<(i32, u32)> {
    parse_iso_date(&format!("{}-01", input.trim()))
        .map(|d| (d.year(), d.month()))
        .ok_or_else(|| Error::Other(format!("Invalid month: {:?} (expected YYYY-MM)", input)))
}

fn workout_line(record: &WorkoutRecord, today: NaiveDate) -> String {
    let marker = if record.date == today {
        ">"
    } else if record.is_logged() {
        "✓"
    } else {
        " "
    };

    let mut line = format!(
        "{} #{:<3} {} {:<12} {}",
        marker,
        record.id,
        record.date.format("%a %-m/%-d"),
        record.kind.to_string(),
        record.title
    );
    if record.planned_miles > 0.0 {
        line.push_str(&format!(" | {} mi @ {}", record.planned_miles, record.planned_pace));
    }
    if record.is_altered {
        line.push_str(" *");
    }
    if let Some(miles) = record.actual_miles {
        line.push_str(&format!(" [done {} mi]", miles));
    }
    line
}
