use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skypane_core::{Config, LocationSource};
use skypane_dashboard::{
    paint, render, spawn_fetch, Dashboard, DashboardMessage, FetchRequest, Services, Tab,
};
use skypane_store::{FileStore, Persistence};
use skypane_weather::{
    build_client, Coordinates, DisabledGeolocator, FixedGeolocator, GeocodeClient, Geolocator,
    IpGeolocator, WeatherProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

const HELP: &str = "\
Commands:
  search <place>     look up a place and show its weather
  open <label>       show a saved location
  save               save the current location
  remove <label>     remove a saved location
  units              switch between °C and °F
  theme              switch between dark and light
  tab hourly|daily   choose the forecast strip
  show               redraw the dashboard
  help               show this list
  quit               exit";

#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    Open(String),
    Save,
    Remove(String),
    Units,
    Theme,
    Tab(Tab),
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_ascii_lowercase().as_str(), rest) {
            ("search", q) if !q.is_empty() => Some(Self::Search(q.to_string())),
            ("open", l) if !l.is_empty() => Some(Self::Open(l.to_string())),
            ("save", "") => Some(Self::Save),
            ("remove", l) if !l.is_empty() => Some(Self::Remove(l.to_string())),
            ("units", "") => Some(Self::Units),
            ("theme", "") => Some(Self::Theme),
            ("tab", t) => Tab::parse(t).map(Self::Tab),
            ("show", "") | ("", "") => Some(Self::Show),
            ("help", "") => Some(Self::Help),
            ("quit", "") | ("exit", "") => Some(Self::Quit),
            _ => None,
        }
    }
}

fn build_services(config: &Config) -> Result<Services> {
    let client = build_client(
        Duration::from_secs(config.http.timeout_secs),
        &config.http.user_agent,
    )
    .context("Failed to build HTTP client")?;

    let geolocator: Option<Arc<dyn Geolocator>> = match config.location.source {
        LocationSource::Ip => Some(Arc::new(IpGeolocator::new(
            client.clone(),
            &config.endpoints.ip_location_url,
        ))),
        LocationSource::Fixed => match (config.location.latitude, config.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Arc::new(FixedGeolocator::new(Coordinates {
                latitude,
                longitude,
            }))),
            _ => anyhow::bail!("Fixed location source requires latitude and longitude"),
        },
        LocationSource::Disabled => Some(Arc::new(DisabledGeolocator)),
        LocationSource::Unavailable => None,
    };

    Ok(Services {
        geolocator,
        resolver: Arc::new(GeocodeClient::new(
            client.clone(),
            &config.endpoints.geocoding_url,
            &config.endpoints.reverse_geocoding_url,
        )),
        weather: Arc::new(WeatherProvider::new(client, &config.endpoints.forecast_url)),
    })
}

fn draw(dashboard: &Dashboard) {
    println!("{}\n", paint(&render(dashboard), dashboard.preferences().theme));
}

fn dispatch(
    tx: &UnboundedSender<DashboardMessage>,
    services: &Arc<Services>,
    request: Option<FetchRequest>,
) {
    if let Some(request) = request {
        spawn_fetch(tx, Arc::clone(services), request);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    skypane_core::init()?;

    let (config, _) = Config::load_validated()?;
    let store = FileStore::open(&config.data_dir).context("Failed to open data store")?;
    tracing::info!("Using store at {}", store.path().display());

    let services = Arc::new(build_services(&config)?);
    let mut dashboard = Dashboard::new(
        Persistence::new(Box::new(store)),
        services.geolocation_available(),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatch(&tx, &services, dashboard.mount());
    draw(&dashboard);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                let Some(command) = Command::parse(&line) else {
                    println!("Unknown command. Type 'help' for commands.");
                    continue;
                };

                match command {
                    Command::Search(query) => dispatch(&tx, &services, dashboard.search(&query)),
                    Command::Open(label) => {
                        dispatch(&tx, &services, dashboard.select_saved(&label))
                    }
                    Command::Save => {
                        if !dashboard.save_current() {
                            println!("Nothing new to save.");
                        }
                    }
                    Command::Remove(label) => {
                        if !dashboard.remove_saved(&label) {
                            println!("'{}' is not saved.", label);
                        }
                    }
                    Command::Units => dispatch(&tx, &services, dashboard.toggle_units()),
                    Command::Theme => dashboard.toggle_theme(),
                    Command::Tab(tab) => dashboard.set_tab(tab),
                    Command::Show => {}
                    Command::Help => {
                        println!("{}", HELP);
                        continue;
                    }
                    Command::Quit => break,
                }
                draw(&dashboard);
            }
            Some(message) = rx.recv() => {
                let DashboardMessage::FetchDone(outcome) = message;
                if dashboard.apply(outcome) {
                    draw(&dashboard);
                }
            }
        }
    }

    tracing::info!("Skypane shutting down");
    Ok(())
}
