use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Select, Text, validator::Validation};
use soilview_core::{
    Config, QueryPipeline, QueryResult, Session, Tab, Variable, ViewState,
    config::MAX_FORECAST_DAYS,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "soilview", version, about = "Soil and air forecast charts for any place")]
pub struct Cli {
    #[command(flatten)]
    pub endpoints: Endpoints,

    #[command(subcommand)]
    pub command: Command,
}

/// Per-invocation overrides of the configured service URLs.
#[derive(Debug, Args)]
pub struct Endpoints {
    /// Geocoding search endpoint.
    #[arg(long, global = true)]
    pub geocoding_url: Option<String>,

    /// Weather forecast endpoint.
    #[arg(long, global = true)]
    pub weather_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set service URLs, forecast length and output directory.
    Configure,

    /// Look up a place and write its charts as SVG.
    Show {
        /// Place name, e.g. "Boston".
        place: String,

        /// Chart to write: moisture, soil-temperature, air or all.
        #[arg(long, default_value = "all")]
        tab: String,

        /// Output directory; overrides the configured one.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the full query result as JSON instead of the table.
        #[arg(long)]
        json: bool,

        /// Print min/max/mean of every hourly variable.
        #[arg(long)]
        summary: bool,
    },

    /// Prompt for places and tabs until you quit.
    Interactive {
        /// Output directory; overrides the configured one.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = if self.command.requires_valid_config() {
            Config::load()?
        } else {
            Config::load_unchecked().unwrap_or_else(|e| {
                tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable config file");
                Config::default()
            })
        };
        if let Some(url) = self.endpoints.geocoding_url {
            config.geocoding_url = url;
        }
        if let Some(url) = self.endpoints.weather_url {
            config.weather_url = url;
        }
        if self.command.requires_valid_config() {
            config.validate()?;
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Show {
                place,
                tab,
                out,
                json,
                summary,
            } => {
                let tabs = parse_tabs(&tab)?;
                let out = out.unwrap_or_else(|| config.output_dir());
                show(&config, &place, &tabs, &out, json, summary).await
            }
            Command::Interactive { out } => {
                let out = out.unwrap_or_else(|| config.output_dir());
                interactive(&config, &out).await
            }
        }
    }
}

impl Command {
    /// `configure` must start from a broken file to be able to repair it.
    fn requires_valid_config(&self) -> bool {
        !matches!(self, Command::Configure)
    }
}

fn parse_tabs(value: &str) -> Result<Vec<Tab>> {
    if value.eq_ignore_ascii_case("all") {
        Ok(Tab::all().to_vec())
    } else {
        Ok(vec![Tab::try_from(value)?])
    }
}

fn configure(mut config: Config) -> Result<()> {
    config.geocoding_url = Text::new("Geocoding search URL:")
        .with_default(&config.geocoding_url)
        .prompt()?;
    config.weather_url = Text::new("Weather forecast URL:")
        .with_default(&config.weather_url)
        .prompt()?;
    config.user_agent = Text::new("User-Agent sent to both services:")
        .with_default(&config.user_agent)
        .prompt()?;
    config.forecast_days = CustomType::<u8>::new("Forecast days:")
        .with_default(config.forecast_days.clamp(1, MAX_FORECAST_DAYS))
        .with_error_message("Please enter a whole number of days")
        .with_validator(|days: &u8| {
            Ok(if (1..=MAX_FORECAST_DAYS).contains(days) {
                Validation::Valid
            } else {
                let message = format!("Choose between 1 and {MAX_FORECAST_DAYS} days");
                Validation::Invalid(message.into())
            })
        })
        .prompt()?;

    let current_dir = config.output_dir().display().to_string();
    let dir = Text::new("Chart output directory:")
        .with_default(&current_dir)
        .prompt()?;
    config.output_dir = Some(PathBuf::from(dir));

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    config: &Config,
    place: &str,
    tabs: &[Tab],
    out: &Path,
    json: bool,
    summary: bool,
) -> Result<()> {
    let mut session = Session::new(QueryPipeline::from_config(config)?);
    session.input(place);
    session
        .submit()
        .ok_or_else(|| anyhow!("Place name must not be empty"))?;
    session.settle().await;

    let result = outcome(session.state())?;
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_city_table(session.state());
    }
    if summary {
        print_summary(result);
    }

    for tab in tabs {
        let path = write_svg(out, &result.place, *tab, &tab.render(result).to_svg())?;
        println!("{}: {}", tab.label(), path.display());
    }

    Ok(())
}

/// What to do after a place has been shown.
#[derive(Debug, Clone, Copy)]
enum Choice {
    Chart(Tab),
    NewPlace,
    Quit,
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::Chart(tab) => write!(f, "{tab}"),
            Choice::NewPlace => f.write_str("Search another place"),
            Choice::Quit => f.write_str("Quit"),
        }
    }
}

async fn interactive(config: &Config, out: &Path) -> Result<()> {
    let mut session = Session::new(QueryPipeline::from_config(config)?);

    loop {
        let place = Text::new("Place (empty to quit):").prompt()?;
        if place.trim().is_empty() {
            return Ok(());
        }

        session.input(place);
        session.submit();
        let state = session.settle().await;

        if let Some(message) = state.error_message() {
            println!("{message}");
            continue;
        }
        print_city_table(state);

        let mut choices: Vec<Choice> = Tab::all().iter().copied().map(Choice::Chart).collect();
        choices.extend([Choice::NewPlace, Choice::Quit]);

        loop {
            match Select::new("Show:", choices.clone()).prompt()? {
                Choice::Chart(tab) => {
                    let state = session.select_tab(tab);
                    if let (Some(chart), Some(result)) = (state.active_chart(), state.result()) {
                        let path = write_svg(out, &result.place, tab, &chart.to_svg())?;
                        println!("Wrote {}", path.display());
                    }
                }
                Choice::NewPlace => break,
                Choice::Quit => return Ok(()),
            }
        }
    }
}

fn outcome(state: &ViewState) -> Result<&QueryResult> {
    if let Some(message) = state.error_message() {
        return Err(anyhow!("{message}"));
    }
    state
        .result()
        .ok_or_else(|| anyhow!("Query did not complete"))
}

fn print_city_table(state: &ViewState) {
    if let Some(row) = state.city_table() {
        println!("{:<24} {:>10} {:>11}", "City Name", "Latitude", "Longitude");
        println!("{:<24} {:>10} {:>11}", row.place, row.latitude, row.longitude);
    }
}

fn print_summary(result: &QueryResult) {
    let (first, last) = match (result.series.time().first(), result.series.time().last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            println!("No hourly samples.");
            return;
        }
    };
    println!(
        "\n{} hourly samples, {} .. {}",
        result.series.len(),
        first.format("%Y-%m-%d %H:%M"),
        last.format("%Y-%m-%d %H:%M")
    );
    println!("{:<26} {:>8} {:>8} {:>8}  unit", "variable", "min", "max", "mean");
    for variable in Variable::all() {
        if let Some(s) = result.series.summary(*variable) {
            println!(
                "{:<26} {:>8.2} {:>8.2} {:>8.2}  {}",
                variable.as_str(),
                s.min,
                s.max,
                s.mean,
                variable.unit()
            );
        }
    }
}

/// File-name-safe form of a place name.
fn slug(place: &str) -> String {
    let slug = place
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { "place".to_string() } else { slug }
}

fn write_svg(dir: &Path, place: &str, tab: Tab, svg: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(format!("{}-{}.svg", slug(place), tab.as_str()));
    fs::write(&path, svg).with_context(|| format!("Failed to write chart: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "chart written");
    Ok(path)
}
