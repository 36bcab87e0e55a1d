use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use vital_core::domain::{compute_bmi, BmiCategory, HealthLog, HeightUnit, LogType, NewHealthLog, UnitSystem, WeightUnit};
use vital_core::offline::OfflineLogCache;
use vital_core::settings::{DisplayPatch, NotificationPatch, PrivacyPatch};
use vital_core::usecases::SyncOfflineLogsUseCase;
use vital_core::*;

#[derive(Parser)]
#[command(name = "vital")]
#[command(about = "Personal health tracking and prediction companion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered service key
    Services,

    /// Compute BMI from height and weight
    Bmi {
        #[arg(long)]
        height: f64,

        /// cm, ft or in
        #[arg(long, default_value = "cm")]
        height_unit: String,

        #[arg(long)]
        weight: f64,

        /// kg or lb
        #[arg(long, default_value = "kg")]
        weight_unit: String,
    },

    /// Show or change the theme
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },

    /// Show or change app settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },

    /// Record and sync health logs
    Log {
        #[command(subcommand)]
        action: LogCommand,
    },
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// Print the current theme state
    Show,
    /// Select light, dark or system
    Set { mode: String },
    /// Flip between light and dark
    Toggle,
    /// Report the system appearance (dark or light)
    System { appearance: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print all settings as JSON
    Show,
    /// Change individual settings; unnamed settings keep their value
    Set {
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        goal_reminders: Option<bool>,
        #[arg(long)]
        log_reminders: Option<bool>,
        #[arg(long)]
        health_insights: Option<bool>,
        #[arg(long)]
        share_analytics: Option<bool>,
        #[arg(long)]
        share_crash_reports: Option<bool>,
        #[arg(long)]
        biometric_lock: Option<bool>,
        /// metric or imperial
        #[arg(long)]
        unit_system: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Restore default settings
    Reset,
}

#[derive(Subcommand)]
enum LogCommand {
    /// Queue a measurement for the next sync
    Add {
        #[arg(long, default_value = "local")]
        user: String,

        /// weight, blood_pressure, steps, heart_rate, sleep, water_intake, exercise, medication
        #[arg(long = "type")]
        log_type: String,

        #[arg(long)]
        value: f64,

        /// Defaults to the usual unit for the log type
        #[arg(long)]
        unit: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// List queued logs
    List,
    /// Append queued logs to a CSV file
    Export {
        #[arg(long)]
        out: PathBuf,
    },
    /// Upload queued logs to the API
    Sync,
}

fn main() -> Result<()> {
    // Initialize logging
    vital_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    match cli.command {
        Commands::Bmi {
            height,
            height_unit,
            weight,
            weight_unit,
        } => cmd_bmi(height, &height_unit, weight, &weight_unit),
        Commands::Services => cmd_services(&start(config)?),
        Commands::Theme { action } => cmd_theme(&start(config)?, action),
        Commands::Settings { action } => cmd_settings(&start(config)?, action),
        Commands::Log { action } => cmd_log(&start(config)?, action),
    }
}

fn start(config: Config) -> Result<App> {
    tracing::debug!("Using data directory {:?}", config.data.data_dir);
    let app = App::new(config);
    app.initialize()?;
    Ok(app)
}

fn cmd_services(app: &App) -> Result<()> {
    for key in app.container()?.registered_keys() {
        println!("{}", key);
    }
    Ok(())
}

fn cmd_bmi(height: f64, height_unit: &str, weight: f64, weight_unit: &str) -> Result<()> {
    let height_unit: HeightUnit = height_unit.parse()?;
    let weight_unit: WeightUnit = weight_unit.parse()?;
    match compute_bmi(height, height_unit, weight, weight_unit) {
        Some(bmi) => {
            println!("BMI: {:.1} ({})", bmi, BmiCategory::from_bmi(bmi));
            Ok(())
        }
        None => Err(Error::InvalidValue(
            "height and weight must be positive".into(),
        )),
    }
}

fn print_theme(state: ThemeState) {
    println!("mode: {}", state.mode);
    println!("dark: {}", state.is_dark);
}

fn cmd_theme(app: &App, action: ThemeCommand) -> Result<()> {
    let theme: Arc<ThemeStore> = app.resolve(service::THEME_STORE)?;
    match action {
        ThemeCommand::Show => print_theme(theme.state()),
        ThemeCommand::Set { mode } => {
            let mode: ThemeMode = mode.parse()?;
            print_theme(theme.set_theme_mode(mode)?);
        }
        ThemeCommand::Toggle => print_theme(theme.toggle_theme()?),
        ThemeCommand::System { appearance } => {
            let is_dark = match appearance.to_lowercase().as_str() {
                "dark" => true,
                "light" => false,
                other => {
                    return Err(Error::InvalidValue(format!(
                        "appearance must be dark or light, got {}",
                        other
                    )))
                }
            };
            print_theme(theme.set_system_theme(is_dark));
        }
    }
    Ok(())
}

fn cmd_settings(app: &App, action: SettingsCommand) -> Result<()> {
    let store: Arc<SettingsStore> = app.resolve(service::SETTINGS_STORE)?;
    let settings = match action {
        SettingsCommand::Show => store.get_settings(),
        SettingsCommand::Reset => store.reset_settings()?,
        SettingsCommand::Set {
            notifications,
            goal_reminders,
            log_reminders,
            health_insights,
            share_analytics,
            share_crash_reports,
            biometric_lock,
            unit_system,
            language,
        } => {
            let unit_system = unit_system
                .map(|s| s.parse::<UnitSystem>())
                .transpose()?;

            let notifications = NotificationPatch {
                enabled: notifications,
                goal_reminders,
                log_reminders,
                health_insights,
            };
            let privacy = PrivacyPatch {
                share_analytics,
                share_crash_reports,
                biometric_lock,
            };
            let display = DisplayPatch {
                unit_system,
                language,
            };

            let patch = SettingsPatch {
                notifications: (notifications != NotificationPatch::default()).then_some(notifications),
                privacy: (privacy != PrivacyPatch::default()).then_some(privacy),
                display: (display != DisplayPatch::default()).then_some(display),
            };
            if patch.is_empty() {
                println!("No settings changed");
                return Ok(());
            }
            store.update_settings(patch)?
        }
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn print_log(log: &HealthLog) {
    println!(
        "{}  {:<14} {} {}{}",
        log.logged_at().format("%Y-%m-%d %H:%M"),
        log.log_type().as_str(),
        log.value(),
        log.unit(),
        log.notes().map(|n| format!("  ({})", n)).unwrap_or_default()
    );
}

fn cmd_log(app: &App, action: LogCommand) -> Result<()> {
    let cache: Arc<OfflineLogCache> = app.resolve(service::OFFLINE_LOG_CACHE)?;
    match action {
        LogCommand::Add {
            user,
            log_type,
            value,
            unit,
            notes,
        } => {
            let log = HealthLog::create(NewHealthLog {
                user_id: user,
                log_type: log_type.parse::<LogType>()?,
                value,
                unit,
                notes,
                logged_at: None,
            })?;
            println!(
                "Queued {} log {} ({} {})",
                log.log_type(),
                log.id(),
                log.value(),
                log.unit()
            );
            cache.enqueue(log)?;
        }
        LogCommand::List => {
            let pending = cache.pending();
            if pending.is_empty() {
                println!("No pending logs");
            } else {
                for log in &pending {
                    print_log(log);
                }
                println!("{} pending", pending.len());
            }
        }
        LogCommand::Export { out } => {
            let written = export_logs_csv(&cache.pending(), &out)?;
            println!("Exported {} logs to {}", written, out.display());
        }
        LogCommand::Sync => {
            if cache.is_empty() {
                println!("No pending logs");
                return Ok(());
            }
            let sync: Arc<SyncOfflineLogsUseCase> = app.resolve(service::SYNC_OFFLINE_LOGS)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let report = runtime.block_on(sync.execute())?;
            println!(
                "Uploaded {} logs, {} still pending",
                report.uploaded, report.remaining
            );
        }
    }
    Ok(())
}
