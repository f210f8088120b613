use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomUserError, Text, validator::Validation};
use std::str::FromStr;

use nws_core::{
    AlertCollection, AlertRecord, Config, FilterCriteria, HttpFetcher, NwsClient, Param, Value,
    alerts_url,
    criteria::ParamKind,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nws", version, about = "National Weather Service alerts CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the application name and contact sent as the user agent.
    Configure,

    /// Fetch alerts and print one line per alert.
    Alerts {
        /// Include expired alerts from the last seven days, not only active ones.
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        filters: FilterArgs,

        /// Narrow the fetched alerts locally, e.g. `--local lat_north=35`.
        /// Several local criteria select alerts matching any of them.
        #[arg(long = "local", value_name = "KEY=VALUE")]
        local: Vec<String>,
    },

    /// Print the request URL for the given filters without fetching.
    Url {
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show active alert counts.
    Count {
        /// State or territory, by code or full name.
        #[arg(long)]
        area: Vec<String>,

        /// Marine region code (AL, AT, GL, GM, PA, PI).
        #[arg(long)]
        region: Vec<String>,

        #[arg(long)]
        zone: Vec<String>,
    },

    /// List the event types the API knows about.
    Types,

    /// Show the glossary, or the definition of one term.
    Glossary { term: Option<String> },

    /// Show forecast office, grid and zones for a location.
    Point {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },

    /// List observation stations near a location, nearest first.
    Stations {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },

    /// Check that the API is reachable.
    Ping,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Filter as `key=value`; a comma in the value gives a list,
    /// e.g. `--filter event="Flood Warning,Flood Watch"`.
    #[arg(long = "filter", short = 'f', value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Only alerts covering this location.
    #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
    pub point: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = parse_pairs(&self.filters)?;
        if let Some(point) = &self.point {
            criteria.insert(Param::Point, parse_point(point)?);
        }
        Ok(criteria)
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Alerts { all, filters, local } => {
                let client = client()?;
                let criteria = filters.criteria()?;

                let mut alerts = if all {
                    client.alerts(&criteria).await?
                } else {
                    client.active_alerts(&criteria).await?
                };

                let local = parse_pairs(&local)?;
                if !local.is_empty() {
                    alerts = alerts.filter(&local)?;
                }

                print_alerts(&alerts);
            }
            Command::Url { all, filters } => {
                let cfg = Config::load()?;
                println!("{}", alerts_url(cfg.resolved_base_url(), &filters.criteria()?, all)?);
            }
            Command::Count { area, region, zone } => {
                let count = client()?.alert_count().await?;

                println!("Total: {}  Land: {}  Marine: {}", count.total, count.land, count.marine);

                let areas: Vec<&str> = area.iter().map(String::as_str).collect();
                for (key, n) in count.filter_land_areas(&areas)? {
                    println!("{key:>8}  {n}");
                }
                let regions: Vec<&str> = region.iter().map(String::as_str).collect();
                for (key, n) in count.filter_marine_regions(&regions)? {
                    println!("{key:>8}  {n}");
                }
                let zones: Vec<&str> = zone.iter().map(String::as_str).collect();
                for (key, n) in count.filter_zones(&zones) {
                    println!("{key:>8}  {n}");
                }
            }
            Command::Types => {
                for event in client()?.alert_types().await?.event_types {
                    println!("{event}");
                }
            }
            Command::Glossary { term } => {
                let glossary = client()?.glossary().await?;
                match term {
                    Some(term) => {
                        let definition = glossary
                            .define(&term)
                            .ok_or_else(|| anyhow!("No glossary entry for '{term}'."))?;
                        println!("{definition}");
                    }
                    None => {
                        for (term, definition) in &glossary.terms {
                            println!("{term}: {definition}\n");
                        }
                    }
                }
            }
            Command::Point { lat, lon } => {
                let info = client()?.point(lat, lon).await?;

                if let (Some(city), Some(state)) = (&info.city, &info.state) {
                    println!("Near:          {city}, {state}");
                }
                println!("Office / grid: {} {},{}", info.grid_id, info.grid_x, info.grid_y);
                print_optional("Forecast zone:", &info.forecast_zone);
                print_optional("County:       ", &info.county);
                print_optional("Fire zone:    ", &info.fire_weather_zone);
                print_optional("Time zone:    ", &info.time_zone);
                print_optional("Radar:        ", &info.radar_station);
                print_optional("Forecast:     ", &info.forecast);
            }
            Command::Stations { lat, lon } => {
                let stations = client()?.point_stations(lat, lon).await?;
                if stations.is_empty() {
                    println!("No stations.");
                }
                for station in stations {
                    println!(
                        "{:<6} {:<45} {:>8.4},{:<9.4} {}",
                        station.identifier,
                        station.name,
                        station.lat,
                        station.lon,
                        station.time_zone.as_deref().unwrap_or("-"),
                    );
                }
            }
            Command::Ping => {
                let status = client()?.ping().await?;
                if status.is_ok() {
                    println!("OK");
                } else {
                    bail!("API reported status '{}'", status.status);
                }
            }
        }

        Ok(())
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;
    let current = cfg.user_agent.clone();

    let mut app_prompt = Text::new("Application name:").with_validator(required);
    if let Some(ua) = &current {
        app_prompt = app_prompt.with_default(&ua.app_name);
    }
    let app_name = app_prompt.prompt().context("Failed to read application name")?;

    let mut contact_prompt = Text::new("Contact (email or website):").with_validator(required);
    if let Some(ua) = &current {
        contact_prompt = contact_prompt.with_default(&ua.contact);
    }
    let contact = contact_prompt.prompt().context("Failed to read contact")?;

    cfg.set_user_agent(app_name.trim().to_string(), contact.trim().to_string());
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn required(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("A value is required.".into()))
    } else {
        Ok(Validation::Valid)
    }
}

fn client() -> Result<NwsClient<HttpFetcher>> {
    let context = Config::load()?.context()?;
    log::debug!("Using {} as {}", context.base_url, context.user_agent);
    Ok(NwsClient::from_context(&context)?)
}

/// Parses repeated `key=value` arguments into criteria, keeping their order.
fn parse_pairs(pairs: &[String]) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::new();

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{pair}'."))?;
        let param = Param::from_str(key.trim()).map_err(anyhow::Error::msg)?;

        if param == Param::Point {
            criteria.insert(param, parse_point(raw)?);
        } else {
            let values = raw.split(',').map(|v| parse_value(param, v.trim()));
            criteria.insert_many(param, values);
        }
    }

    Ok(criteria)
}

/// Strings stay strings for textual parameters; bounds and times are inferred
/// so a malformed one is reported by validation with its parameter name.
fn parse_value(param: Param, raw: &str) -> Value {
    match param.kind() {
        ParamKind::Text | ParamKind::Categorical(_) => Value::from(raw),
        _ => Value::infer(raw),
    }
}

fn parse_point(raw: &str) -> Result<Value> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected LAT,LON, got '{raw}'."))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude '{lat}'"))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("Invalid longitude '{lon}'"))?;
    Ok(Value::Coordinate { lat, lon })
}

fn print_alerts(alerts: &AlertCollection) {
    if alerts.is_empty() {
        println!("No alerts.");
        return;
    }

    for alert in alerts {
        println!("{}", alert_line(alert));
    }
}

fn alert_line(alert: &AlertRecord) -> String {
    let expires = alert
        .expires
        .as_ref()
        .map(|t| t.local.format("%Y-%m-%d %H:%M %:z").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<28} {:<9} {:<10} until {}  {}",
        alert.event,
        alert.severity,
        alert.urgency,
        expires,
        alert.area_descriptions.join("; "),
    )
}

fn print_optional(label: &str, value: &Option<String>) {
    if let Some(value) = value {
        println!("{label} {value}");
    }
}
