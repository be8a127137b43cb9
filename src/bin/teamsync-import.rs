use anyhow::{Context, bail};
use log::info;
use reqwest::Url;
use std::fs;
use std::path::{Path, PathBuf};
use teamsync_api::client::PageFetcher;
use teamsync_api::store::{ImportMode, ImportSummary, TeamStore};
use teamsync_api::{Gender, Level, ParsedPage, Program, ProgramContext, Sport, parse_page};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
enum Input {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    input: Input,
    sport: Sport,
    context: ProgramContext,
    proxy: Option<String>,
    store: Option<PathBuf>,
    mode: ImportMode,
    json: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Version,
    Import(Options),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("teamsync-import {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(Command::Import(opts)) => opts,
        Err(e) => {
            eprintln!("{e}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();
    init_logging();

    let html = load_html(&opts.input, opts.proxy.as_deref()).await?;
    if html.trim().is_empty() {
        bail!("Nothing to import: the page is empty");
    }

    let program = opts.context.program(opts.sport);
    let parsed = parse_page(&html, opts.sport, Some(opts.context));
    if parsed.is_empty() {
        bail!("No data found at this URL");
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        println!("{}", preview(&program, &parsed));
    }

    if let Some(path) = &opts.store {
        let summary = import_into(path, parsed, &program, opts.mode)?;
        println!("{}", describe_summary(path, &program, &summary));
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Command> {
    let mut args = args.into_iter();
    let mut url = None;
    let mut file = None;
    let mut sport = None;
    let mut context = ProgramContext::default();
    let mut proxy = None;
    let mut store = None;
    let mut mode = ImportMode::default();
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--file" => file = Some(PathBuf::from(flag_value(&mut args, "--file")?)),
            "--sport" => sport = Some(flag_value(&mut args, "--sport")?.parse::<Sport>()?),
            "--gender" => context.gender = flag_value(&mut args, "--gender")?.parse::<Gender>()?,
            "--level" => context.level = flag_value(&mut args, "--level")?.parse::<Level>()?,
            "--proxy" => proxy = Some(flag_value(&mut args, "--proxy")?),
            "--store" => store = Some(PathBuf::from(flag_value(&mut args, "--store")?)),
            "--mode" => mode = flag_value(&mut args, "--mode")?.parse::<ImportMode>()?,
            "--json" => json = true,
            other if other.starts_with("--") => bail!("Unknown argument: {other}"),
            other => {
                if url.is_some() {
                    bail!("Only one URL can be imported at a time");
                }
                url = Some(other.to_owned());
            }
        }
    }

    let input = match (url, file) {
        (Some(_), Some(_)) => bail!("Give either a URL or --file, not both"),
        (Some(url), None) if url.trim().is_empty() => bail!("URL is empty"),
        (Some(url), None) => Input::Url(url.trim().to_owned()),
        (None, Some(path)) => Input::File(path),
        (None, None) => bail!("A URL or --file is required"),
    };
    let sport = sport.context("--sport is required")?;

    Ok(Command::Import(Options { input, sport, context, proxy, store, mode, json }))
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next().with_context(|| format!("{flag} needs a value"))
}

/// Route a page request through a running proxy: `<base>/proxy?url=<page>`.
fn proxied_url(base: &str, page: &str) -> anyhow::Result<String> {
    let endpoint = format!("{}/proxy", base.trim_end_matches('/'));
    let url = Url::parse_with_params(&endpoint, &[("url", page)])
        .with_context(|| format!("invalid proxy base {base:?}"))?;
    Ok(url.to_string())
}

async fn load_html(input: &Input, proxy: Option<&str>) -> anyhow::Result<String> {
    match input {
        Input::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        Input::Url(url) => {
            let target = match proxy {
                Some(base) => proxied_url(base, url)?,
                None => url.clone(),
            };
            info!("fetching {target}");
            let page = PageFetcher::default()
                .fetch(&target)
                .await
                .with_context(|| format!("failed to fetch {url}"))?;
            Ok(page.text())
        }
    }
}

fn import_into(
    path: &Path,
    parsed: ParsedPage,
    program: &Program,
    mode: ImportMode,
) -> anyhow::Result<ImportSummary> {
    let mut store = TeamStore::load(path)
        .with_context(|| format!("failed to load store {}", path.display()))?;
    let summary = store.apply(parsed, program, mode);
    store
        .save(path)
        .with_context(|| format!("failed to save store {}", path.display()))?;
    Ok(summary)
}

fn preview(program: &Program, parsed: &ParsedPage) -> String {
    let mut lines = vec![format!(
        "{} {}: found {} games, {} players, {} coaches",
        program.level.label(),
        program.sport.display_name(),
        parsed.games.len(),
        parsed.players.len(),
        parsed.coaches.len()
    )];
    if let Some(info) = &parsed.team_info {
        let season = if info.season.is_empty() { String::new() } else { format!(" ({})", info.season) };
        lines.push(format!("  team: {}{season}", info.name));
    }
    for coach in &parsed.coaches {
        lines.push(format!("  coach: {} ({})", coach.name, coach.role.label()));
    }
    if let Some(overall) = parsed.imported_stats.and_then(|s| s.overall) {
        lines.push(format!(
            "  record: {}-{}-{} ({:.3})",
            overall.wins, overall.losses, overall.ties, overall.pct
        ));
    }
    lines.join("\n")
}

fn describe_summary(path: &Path, program: &Program, s: &ImportSummary) -> String {
    format!(
        "Saved {} to {}: games +{} -{} ({} skipped), players +{} -{} ({} skipped), coaches +{} -{} ({} skipped)",
        program.label(),
        path.display(),
        s.games_added,
        s.games_removed,
        s.games_skipped,
        s.players_added,
        s.players_removed,
        s.players_skipped,
        s.coaches_added,
        s.coaches_removed,
        s.coaches_skipped
    )
}

fn usage_text() -> &'static str {
    "teamsync-import - import a team page into a local store

Usage:
  teamsync-import <URL> --sport <SPORT> [options]
  teamsync-import --file <PATH> --sport <SPORT> [options]

Options:
  --gender boys|girls          Program gender (default boys)
  --level varsity|jv|frosh     Program level (default varsity)
  --proxy <BASE_URL>           Fetch through a teamsync proxy
  --store <PATH>               Apply the import to a JSON store file
  --mode merge|resync          Add new records, or replace the program (default merge)
  --json                       Print the parsed page as JSON
  -h, --help                   Show this help
  -V, --version                Show the version"
}
