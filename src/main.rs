use anyhow::{bail, Context};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, sync::Arc};
use travel_directions::{
    sdk::config::{DirectionsConfig, Settings},
    sdk::form::{
        Avoid, FormError, FormState, Meridiem, TransitRoutingPreference, TransitVehicle,
        TravelMode,
    },
    sdk::notify::{multiple_choice_sound, LogSpeech, TerminalBell},
    sdk::routing::RemoteDirectionsProvider,
    sdk::search::{SearchController, SessionUpdate, TripSession},
    sdk::util::{log::init_logging, rate_limit::directions_limiter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum When {
    /// Leave now
    Now,
    /// Depart after the given date and time
    Depart,
    /// Arrive by the given date and time
    Arrive,
}

impl When {
    fn selection(self) -> usize {
        match self {
            When::Now => 0,
            When::Depart => 1,
            When::Arrive => 2,
        }
    }
}

/// Plan a trip with the Google Directions API and read back the routes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Where the trip starts
    #[arg(short, long)]
    origin: String,

    /// Where the trip ends
    #[arg(short, long)]
    destination: String,

    #[arg(short, long, value_enum, default_value_t = TravelMode::Driving)]
    mode: TravelMode,

    /// Stops along the way, separated by '|' (not used for transit)
    #[arg(short, long)]
    waypoints: Option<String>,

    /// Let the provider reorder the waypoints
    #[arg(long)]
    optimize_waypoints: bool,

    /// Features to avoid; repeat for several
    #[arg(long, value_enum)]
    avoid: Vec<Avoid>,

    /// [Transit] When the trip is anchored
    #[arg(long, value_enum, default_value_t = When::Now)]
    when: When,

    /// [Transit] Month (1-12); defaults to the current month
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// [Transit] Day of the month; defaults to today
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    day: Option<u32>,

    /// [Transit] Hour on a 12-hour clock; defaults to the current hour
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    hour: Option<u32>,

    /// [Transit] Minute; defaults to the current minute
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=59))]
    minute: Option<u32>,

    /// [Transit] The hour is A.M.
    #[arg(long, conflicts_with = "pm")]
    am: bool,

    /// [Transit] The hour is P.M.
    #[arg(long)]
    pm: bool,

    /// [Transit] Preferred vehicle
    #[arg(long, value_enum, default_value_t = TransitVehicle::Any)]
    vehicle: TransitVehicle,

    /// [Transit] Routing preference
    #[arg(long, value_enum, default_value_t = TransitRoutingPreference::Best)]
    routing: TransitRoutingPreference,

    /// Which route to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    route: usize,

    /// Print every route instead of a single one
    #[arg(long)]
    all: bool,

    /// Settings file holding the log level
    #[arg(long, default_value = "travel_directions.json")]
    settings: PathBuf,
}

/// Replays the command line as form events, the way the widgets would fire them.
fn fill_form(form: &mut FormState, cli: &Cli, now: NaiveDateTime) -> Result<(), FormError> {
    form.origin = cli.origin.clone();
    form.destination = cli.destination.clone();
    form.on_mode_changed(cli.mode);

    if cli.mode == TravelMode::Transit {
        form.on_departure_policy_changed(cli.when.selection(), now)?;
        form.set_transit_vehicle(cli.vehicle)?;
        form.set_routing_preference(cli.routing)?;
        if cli.when != When::Now {
            if let Some(month) = cli.month {
                form.set_month((month - 1) as usize, now)?;
            }
            if let Some(day) = cli.day {
                form.set_day((day - 1) as usize, now)?;
            }
            if let Some(hour) = cli.hour {
                form.set_hour(hour, now)?;
            }
            if let Some(minute) = cli.minute {
                form.set_minute(minute, now)?;
            }
            if cli.am {
                form.set_meridiem(Meridiem::Am, now)?;
            } else if cli.pm {
                form.set_meridiem(Meridiem::Pm, now)?;
            }
        }
    } else {
        if let Some(waypoints) = &cli.waypoints {
            form.set_waypoints(waypoints)?;
        }
        form.set_optimize_waypoints(cli.optimize_waypoints)?;
    }

    for flag in &cli.avoid {
        if let Err(e) = form.set_avoid(*flag, true) {
            log::warn!("Ignoring --avoid {}: {}", flag.as_str(), e);
        }
    }
    Ok(())
}

fn print_results(session: &mut TripSession, cli: &Cli) -> anyhow::Result<()> {
    if cli.all {
        let results = session.results();
        for (label, block) in results.labels.iter().zip(&results.blocks) {
            println!("== {} ==\n{}\n", label, block);
        }
        return Ok(());
    }

    let count = session.results().len();
    let selected = match cli.route.checked_sub(1) {
        Some(index) => session.select_route(index),
        None => None,
    };
    let block =
        selected.with_context(|| format!("Route {} does not exist; {} found", cli.route, count))?;
    println!("{}", block);
    if session.has_alternatives() {
        eprintln!(
            "\nAlso available: {} (use --route N or --all)",
            session.results().labels.join(", ")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::load_or_repair(&cli.settings)?;
    init_logging(&settings.log_level);

    let now = Local::now().naive_local();
    let mut form = FormState::new(now);
    fill_form(&mut form, &cli, now)?;
    let request = form.build_request(&Local)?;
    form.reset_after_submit();
    log::debug!("Trip request: {:?}", request);

    let config = DirectionsConfig::from_env()?;
    let provider = RemoteDirectionsProvider::new(&config, directions_limiter())?;
    let (controller, mut events) = SearchController::new(Arc::new(provider));
    let mut session = TripSession::new(
        Arc::new(LogSpeech),
        Arc::new(TerminalBell),
        multiple_choice_sound(),
    );

    session.begin_search();
    controller.submit(request)?;

    let received = tokio::select! {
        event = events.recv() => event,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, cancelling search");
            controller.cancel();
            events.recv().await
        }
    };
    let event = received.context("Search worker stopped without reporting a result")?;

    match session.apply(event) {
        SessionUpdate::Routes(0) => {}
        SessionUpdate::Routes(_) => print_results(&mut session, &cli)?,
        SessionUpdate::Failed(message) => bail!(message),
        SessionUpdate::Cancelled => {}
    }
    Ok(())
}
