//! dnswitch - switch the system DNS provider
//!
//! Binary entry point for the dnswitch CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::Context;
use clap::CommandFactory;
use dnswitch::cli::{Cli, Commands, OutputFormat};
use dnswitch::config::{ConfigLoader, Settings};
use dnswitch::dns::{format_latency, Monitor, MonitorStats, Prober, Provider, ProviderCatalog};
use dnswitch::error::Error;
use dnswitch::platform::{self, DnsConfigurator};
use dnswitch::switcher::{SwitchReport, Switcher};
use dnswitch::tui::{self, Dashboard, DashboardExit, SelectorExit};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const BOX_WIDTH: usize = 60;

/// Set up logging based on verbosity level.
///
/// Logs go to stderr so they stay out of the printed reports.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

/// Rows of a titled frame around `lines`, all `BOX_WIDTH - 2` columns wide
/// unless a line is longer than the frame.
fn box_rows(title: &str, lines: &[String]) -> Vec<String> {
    let inner = BOX_WIDTH - 4;
    let row = |s: &str| {
        let pad = inner.saturating_sub(s.chars().count() + 1);
        format!("│ {s}{}│", " ".repeat(pad))
    };

    let mut rows = vec![format!("┌{}┐", "─".repeat(inner)), row(title)];
    rows.push(format!("├{}┤", "─".repeat(inner)));
    rows.extend(lines.iter().map(|line| row(line)));
    rows.push(format!("└{}┘", "─".repeat(inner)));
    rows
}

/// Print `lines` in a titled frame.
fn print_box(title: &str, lines: &[String]) {
    for row in box_rows(title, lines) {
        println!("  {row}");
    }
    println!();
}

fn print_current_servers(switcher: &Switcher<'_>) {
    let lines = match switcher.current_servers() {
        Err(e) => {
            tracing::debug!("Reading current DNS failed: {e}");
            vec!["Could not read current DNS".to_string()]
        }
        Ok(servers) if servers.is_empty() => vec!["No DNS servers configured".to_string()],
        Ok(servers) => servers,
    };
    print_box("Current DNS Servers", &lines);
}

fn print_switch_report(report: &SwitchReport) {
    let mut status = vec![
        "Updating DNS configuration...".to_string(),
        "Configuration updated".to_string(),
    ];
    if let Some(backup) = &report.backup {
        status.push(format!("Backup: {}", backup.display()));
    }
    match &report.restart_warning {
        Some(e) => status.push(format!("Warning: {e}")),
        None => status.push("Service restarted".to_string()),
    }
    print_box("Update Status", &status);

    let new_servers = match &report.new_servers {
        Ok(servers) => servers.clone(),
        Err(e) => vec![format!("Could not read new DNS: {e}")],
    };
    print_box("New DNS Servers", &new_servers);

    if let Some(validation) = &report.validation {
        let mut lines = vec!["Testing DNS resolution...".to_string()];
        match validation {
            Ok(()) => lines.push("All DNS servers responding".to_string()),
            Err(e) => lines.push(format!("Validation failed: {e}")),
        }
        print_box("DNS Validation", &lines);
    }
}

/// Text shown above the provider list after `provider` could not be applied.
fn apply_failure_banner(
    provider: &Provider,
    e: &Error,
    configurator: &dyn DnsConfigurator,
) -> String {
    let mut banner = format!("Could not apply {}: {e}", provider.name);
    if e.is_permission_denied() {
        banner.push_str(". ");
        banner.push_str(configurator.privilege_hint());
    }
    banner
}

/// Run the interactive switcher until the user quits.
async fn run_interactive(settings: &Settings) -> anyhow::Result<()> {
    let configurator = platform::detect();
    let prober = Prober::from_settings(settings);
    let switcher = Switcher::new(configurator.as_ref(), &prober);

    if let Err(e) = switcher.ensure_privileged() {
        eprintln!("Error: {e}");
        eprintln!("\n{}", configurator.privilege_hint());
        std::process::exit(1);
    }

    print_current_servers(&switcher);

    let mut catalog = ProviderCatalog::with_extra(settings.extra_providers());
    println!("  Testing DNS latency...\n");
    prober.probe_all(&mut catalog).await;
    catalog.sort_by_latency();

    let mut last_error: Option<String> = None;
    loop {
        let index = match tui::run_selector(&mut catalog, last_error.take())
            .context("provider selector failed")?
        {
            SelectorExit::Quit => break,
            SelectorExit::Selected(index) => index,
        };
        let Some(provider) = catalog.get(index).cloned() else {
            continue;
        };

        println!("  Selected: {}\n", provider.name);

        let report = match switcher.switch(&provider).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Applying {} failed: {e}", provider.name);
                last_error = Some(apply_failure_banner(&provider, &e, configurator.as_ref()));
                continue;
            }
        };
        print_switch_report(&report);

        println!("  Entering monitoring mode...\n");
        let monitor = Monitor::new(
            prober.clone(),
            MonitorStats::for_provider(&report.provider),
            settings.monitor_interval(),
        );
        let mut dashboard = Dashboard::new(monitor).with_warnings(report.warnings());

        match tui::run_dashboard(&mut dashboard)
            .await
            .context("monitoring dashboard failed")?
        {
            DashboardExit::Quit => break,
            DashboardExit::SwitchProvider => println!("  Returning to DNS selection...\n"),
        }
    }

    Ok(())
}

/// Probe every provider and print the results.
async fn run_list(settings: &Settings, sort: bool, format: OutputFormat) -> anyhow::Result<()> {
    let prober = Prober::from_settings(settings);
    let mut catalog = ProviderCatalog::with_extra(settings.extra_providers());

    eprintln!("Probing {} providers...", catalog.len());
    prober.probe_all(&mut catalog).await;
    if sort {
        catalog.sort_by_latency();
    }

    let providers: Vec<&Provider> = catalog
        .providers()
        .iter()
        .filter(|p| p.kind.is_probeable())
        .collect();

    match format {
        OutputFormat::Table => print_providers_table(&providers),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&providers)?;
            println!("{json}");
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let sep = format.separator().unwrap_or(',');
            print_providers_delimited(&providers, sep);
        }
    }

    Ok(())
}

fn print_providers_table(providers: &[&Provider]) {
    println!("{:<4} {:<22} {:<34} {:>8}", "#", "Provider", "DNS Servers", "Latency");
    println!("{}", "-".repeat(71));

    for (idx, p) in providers.iter().enumerate() {
        println!(
            "{:<4} {:<22} {:<34} {:>8}",
            idx + 1,
            p.name,
            p.servers.join(" "),
            format_latency(p.latency_ms)
        );
    }
}

fn print_providers_delimited(providers: &[&Provider], sep: char) {
    println!("#{sep}Name{sep}Servers{sep}Latency(ms){sep}Success");
    for (idx, p) in providers.iter().enumerate() {
        let latency = p.latency_ms.map_or_else(|| "-1".to_string(), |ms| ms.to_string());
        println!(
            "{}{sep}{}{sep}{}{sep}{}{sep}{}",
            idx + 1,
            p.name,
            p.servers.join(" "),
            latency,
            p.latency_ms.is_some()
        );
    }
}

/// Print the servers the system resolves through.
fn run_current(format: OutputFormat) -> anyhow::Result<()> {
    let configurator = platform::detect();
    let servers = configurator
        .read_current_servers()
        .with_context(|| format!("reading DNS servers via {}", configurator.name()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&servers)?),
        OutputFormat::Table if servers.is_empty() => println!("No DNS servers configured"),
        _ => {
            for server in servers {
                println!("{server}");
            }
        }
    }

    Ok(())
}

/// Main entry point for the dnswitch CLI application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    color_eyre::install().map_err(Error::from)?;

    let (cli, verbose) = dnswitch::cli::parse_verbose();
    setup_logging(verbose, cli.quiet);

    tracing::debug!("dnswitch starting...");

    let settings = ConfigLoader::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        None | Some(Commands::Interactive) => run_interactive(&settings).await?,
        Some(Commands::List { sort }) => run_list(&settings, sort, cli.format).await?,
        Some(Commands::Current) => run_current(cli.format)?,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}
