//! Hotel BI CLI
//!
//! Command-line dashboard for the Hotel BI backend:
//! - Browse hotels and KPI metrics
//! - Upload data files and follow the import
//! - Generate, download and manage reports
//! - Inspect, cancel and watch background tasks

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use hotel_bi::*;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hotel-bi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line dashboard for the Hotel BI backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/hotel-bi/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List hotels, or show one hotel
    Hotels {
        /// Hotel ID
        id: Option<i64>,
    },

    /// List KPI metrics
    Metrics {
        #[arg(long)]
        hotel_id: Option<i64>,
        /// daily, weekly, monthly, yearly
        #[arg(long)]
        period_type: Option<PeriodType>,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },

    /// Upload a data file (xlsx, xls, csv, json)
    Upload {
        path: PathBuf,
        #[arg(long)]
        hotel_id: String,
        /// Follow the import task until it finishes
        #[arg(short, long)]
        watch: bool,
    },

    /// List upload templates
    Templates,

    /// Report generation and retrieval
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Background task inspection
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Sign in and store the session token
    Login {
        username: String,
        /// Password (default: $HOTEL_BI_PASSWORD, then stdin)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and discard the session token
    Logout,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Request a new report
    Generate {
        title: String,
        /// analysis, comparison, forecast
        #[arg(long, default_value = "analysis")]
        report_type: ReportType,
        /// Hotel IDs to include
        #[arg(long = "hotel", required = true)]
        hotel_ids: Vec<i64>,
        /// YYYY-MM-DD
        #[arg(long, requires = "period_end")]
        period_start: Option<NaiveDate>,
        /// YYYY-MM-DD
        #[arg(long, requires = "period_start")]
        period_end: Option<NaiveDate>,
        /// Output formats (pdf, ppt); default both
        #[arg(long = "output-format")]
        output_formats: Vec<ReportFormat>,
        /// Skip the AI analysis section
        #[arg(long)]
        no_ai: bool,
        /// Follow the generation task until it finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// List reports
    List,
    /// Show one report
    Show { id: i64 },
    /// Download a rendered report
    Download {
        id: i64,
        #[arg(long, default_value = "pdf")]
        report_format: ReportFormat,
        /// Output file (default: report-<id>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a report
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List {
        #[arg(long)]
        task_type: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Show one task snapshot
    Status { task_id: String },
    /// Cancel a running task
    Cancel { task_id: String },
    /// Poll a task until it finishes
    Watch { task_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Works even when the current config file is broken
    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_deref());
    }

    // Loaded before logging is up, so failures are returned, not logged
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()
            .context("Fix the config file or regenerate it with `hotel-bi config`")?,
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
        config.validate()?;
    }

    init_logging(&config.logging);

    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.auth.token_path()));
    let api = ApiClient::new(config.api.client_config(), credentials)?
        .with_unauthorized_handler(|| {
            eprintln!("Session expired. Run `hotel-bi login <username>` to sign in again.");
        });
    let client = HotelBiClient::new(Arc::new(api), config.monitor.poll_interval());

    let format = cli.format;

    match cli.command {
        Commands::Hotels { id: Some(id) } => {
            let hotel = client.data.get_hotel_by_id(id).await?;
            match format {
                OutputFormat::Json => print_json(&hotel)?,
                OutputFormat::Table => print_hotels(std::slice::from_ref(&hotel)),
            }
        }

        Commands::Hotels { id: None } => {
            let hotels = client.data.get_hotels().await?;
            match format {
                OutputFormat::Json => print_json(&hotels)?,
                OutputFormat::Table => print_hotels(&hotels),
            }
        }

        Commands::Metrics {
            hotel_id,
            period_type,
            start_date,
            end_date,
        } => {
            let query = MetricQuery {
                hotel_id,
                period_type,
                start_date,
                end_date,
            };
            let metrics = client.data.get_metrics(&query).await?;
            match format {
                OutputFormat::Json => print_json(&metrics)?,
                OutputFormat::Table => print_metrics(&metrics),
            }
        }

        Commands::Upload {
            path,
            hotel_id,
            watch,
        } => {
            let receipt = client.uploads.upload_file(&path, &hotel_id).await?;
            match format {
                OutputFormat::Json => print_json(&receipt)?,
                OutputFormat::Table => {
                    println!("Uploaded {:?}, import task {}", path, receipt.task_id)
                }
            }
            if watch {
                exit_on_failure(watch_task(&client, &receipt.task_id).await?);
            }
        }

        Commands::Templates => {
            let templates = client.uploads.get_templates().await?;
            match format {
                OutputFormat::Json => print_json(&templates)?,
                OutputFormat::Table => {
                    if templates.is_empty() {
                        println!("No templates available.");
                    }
                    for template in templates {
                        println!("{:<30} {}", template.name, template.url);
                    }
                }
            }
        }

        Commands::Report { command } => run_report_command(&client, command, format).await?,

        Commands::Task { command } => run_task_command(&client, command, format).await?,

        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let result = client.auth.login(&username, &password).await?;
            println!(
                "Logged in as {} ({})",
                result.user.username,
                result.user.role.as_deref().unwrap_or("user")
            );
        }

        Commands::Logout => match client.auth.logout().await {
            Ok(_) => println!("Logged out."),
            Err(e) => {
                // The local token is gone either way
                tracing::warn!("Logout request failed: {}", e);
                println!("Logged out locally ({}).", e);
            }
        },

        Commands::Config { output } => write_default_config(output.as_deref())?,
    }

    Ok(())
}

fn write_default_config(output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let content = hotel_bi::config::generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &content)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", content);
        }
    }

    Ok(())
}

async fn run_report_command(
    client: &HotelBiClient,
    command: ReportCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ReportCommands::Generate {
            title,
            report_type,
            hotel_ids,
            period_start,
            period_end,
            output_formats,
            no_ai,
            watch,
        } => {
            let mut request = ReportRequest::new(title, report_type, hotel_ids).ai_analysis(!no_ai);
            if let (Some(start), Some(end)) = (period_start, period_end) {
                request = request.period(start, end);
            }
            if !output_formats.is_empty() {
                request = request.formats(output_formats);
            }

            let receipt = client.reports.generate_report(&request).await?;
            match format {
                OutputFormat::Json => print_json(&receipt)?,
                OutputFormat::Table => println!("Report queued, task {}", receipt.task_id),
            }
            if watch {
                exit_on_failure(watch_task(client, &receipt.task_id).await?);
            }
        }

        ReportCommands::List => {
            let reports = client.reports.get_reports().await?;
            match format {
                OutputFormat::Json => print_json(&reports)?,
                OutputFormat::Table => print_reports(&reports),
            }
        }

        ReportCommands::Show { id } => {
            let report = client.reports.get_report_by_id(id).await?;
            match format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Table => {
                    print_reports(std::slice::from_ref(&report));
                    if let Some(files) = &report.file_paths {
                        for fmt in [ReportFormat::Pdf, ReportFormat::Ppt] {
                            if let Some(path) = files.get(fmt) {
                                println!("  {}: {}", fmt, path);
                            }
                        }
                    }
                }
            }
        }

        ReportCommands::Download {
            id,
            report_format,
            output,
        } => {
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("report-{}.{}", id, report_format.extension()))
            });
            let size = client.reports.save_report(id, report_format, &path).await?;
            println!("Saved {} ({} bytes)", path.display(), size);
        }

        ReportCommands::Delete { id } => {
            if client.reports.delete_report(id).await? {
                println!("Report {} deleted.", id);
            } else {
                anyhow::bail!("Backend refused to delete report {}", id);
            }
        }
    }

    Ok(())
}

async fn run_task_command(
    client: &HotelBiClient,
    command: TaskCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        TaskCommands::List { task_type, status } => {
            let query = TaskQuery {
                task_type,
                status,
                ..Default::default()
            };
            let tasks = client.tasks.get_tasks(&query).await?;
            match format {
                OutputFormat::Json => print_json(&tasks)?,
                OutputFormat::Table => print_tasks(&tasks),
            }
        }

        TaskCommands::Status { task_id } => {
            let task = client.tasks.get_task_status(&task_id).await?;
            match format {
                OutputFormat::Json => print_json(&task)?,
                OutputFormat::Table => print_tasks(std::slice::from_ref(&task)),
            }
        }

        TaskCommands::Cancel { task_id } => {
            let result = client.tasks.cancel_task(&task_id).await?;
            if result.success {
                println!("Task {} cancelled.", task_id);
            } else {
                anyhow::bail!(
                    "Task {} could not be cancelled: {}",
                    task_id,
                    result.message.unwrap_or_default()
                );
            }
        }

        TaskCommands::Watch { task_id } => {
            exit_on_failure(watch_task(client, &task_id).await?);
        }
    }

    Ok(())
}

/// Render progress until the task stops; returns whether it completed
async fn watch_task(client: &HotelBiClient, task_id: &str) -> anyhow::Result<bool> {
    println!("Watching task {} (Ctrl+C to stop)", task_id);

    let handle = client.tasks.poll_task_status(task_id, print_progress)?;

    let canceller = handle.canceller();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let outcome = handle.wait().await;
    interrupt.abort();
    println!();

    let completed = match outcome {
        MonitorOutcome::Completed(task) => {
            println!("Task {} completed.", task.task_id);
            true
        }
        MonitorOutcome::Failed(task) => {
            eprintln!(
                "Task {} failed: {}",
                task.task_id,
                task.error_message.as_deref().unwrap_or("no error message")
            );
            false
        }
        MonitorOutcome::FetchFailed(e) => {
            eprintln!("Stopped watching task {}: {}", task_id, e);
            false
        }
        MonitorOutcome::Cancelled => {
            eprintln!("Stopped watching task {}; it keeps running on the server.", task_id);
            false
        }
        MonitorOutcome::Aborted => {
            eprintln!("Task monitor aborted unexpectedly.");
            false
        }
    };

    Ok(completed)
}

fn exit_on_failure(completed: bool) {
    if !completed {
        std::process::exit(1);
    }
}

fn print_progress(task: &Task) {
    const WIDTH: usize = 30;
    let filled = task.progress as usize * WIDTH / 100;
    print!(
        "\r[{}{}] {:>3}% {:<10}",
        "#".repeat(filled),
        ".".repeat(WIDTH - filled),
        task.progress,
        task.status
    );
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!("Failed to flush progress line: {}", e);
    }
}

fn read_password() -> anyhow::Result<String> {
    if let Ok(password) = std::env::var("HOTEL_BI_PASSWORD") {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("hotel_bi={}", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn opt_f64(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_hotels(hotels: &[HotelData]) {
    if hotels.is_empty() {
        println!("No hotels found.");
        return;
    }

    println!(
        "{:<6} {:<28} {:<16} {:>6} {:>8} {:>10} {:>8} {:>8} {:<10}",
        "ID", "Name", "Location", "Rooms", "Occ.", "Revenue", "ADR", "RevPAR", "Date"
    );
    println!("{}", "-".repeat(110));

    for hotel in hotels {
        println!(
            "{:<6} {:<28} {:<16} {:>6} {:>8} {:>10} {:>8} {:>8} {:<10}",
            hotel.id,
            hotel.hotel_name,
            hotel.location.as_deref().unwrap_or("-"),
            opt(hotel.room_count),
            opt_f64(hotel.occupancy_rate, 2),
            opt_f64(hotel.revenue, 0),
            opt_f64(hotel.adr, 1),
            opt_f64(hotel.revpar, 1),
            opt(hotel.date_recorded)
        );
    }
}

fn print_metrics(metrics: &[KpiMetric]) {
    if metrics.is_empty() {
        println!("No metrics for the selected filters.");
        return;
    }

    println!(
        "{:<8} {:<20} {:>12} {:<10} {:<10} {:<10}",
        "Hotel", "Metric", "Value", "Period", "Start", "End"
    );
    println!("{}", "-".repeat(75));

    for metric in metrics {
        println!(
            "{:<8} {:<20} {:>12} {:<10} {:<10} {:<10}",
            metric.hotel_id,
            metric.metric_name,
            opt_f64(metric.metric_value, 2),
            metric.period_type.as_deref().unwrap_or("-"),
            opt(metric.period_start),
            opt(metric.period_end)
        );
    }
}

fn print_reports(reports: &[Report]) {
    if reports.is_empty() {
        println!("No reports yet.");
        println!();
        println!("Create one with:");
        println!("  hotel-bi report generate \"Monthly review\" --hotel 1");
        return;
    }

    println!(
        "{:<6} {:<32} {:<12} {:<12} {:<20}",
        "ID", "Title", "Type", "Status", "Created"
    );
    println!("{}", "-".repeat(85));

    for report in reports {
        println!(
            "{:<6} {:<32} {:<12} {:<12} {:<20}",
            report.id,
            report.title,
            report.report_type,
            report.status,
            report.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    println!(
        "{:<38} {:<22} {:<10} {:>5} {:<20}",
        "Task", "Type", "Status", "%", "Started"
    );
    println!("{}", "-".repeat(100));

    for task in tasks {
        println!(
            "{:<38} {:<22} {:<10} {:>5} {:<20}",
            task.task_id,
            task.task_type,
            task.status,
            task.progress,
            opt(task.started_at.map(|t| t.format("%Y-%m-%d %H:%M")))
        );
        if let Some(error) = &task.error_message {
            println!("    error: {}", error);
        }
    }
}
