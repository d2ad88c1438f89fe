use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use privacy_guard_core::config::action_table::ProtectiveActionMode;
use privacy_guard_core::config::guard_config::{self, GuardConfig, LoadedConfig};
use privacy_guard_core::detection::domain::region_extractor::CountStrategy;
use privacy_guard_core::monitor::infrastructure::session_factory::{build_session, open_camera};
use privacy_guard_core::monitor::infrastructure::threaded_monitor::{
    run_in_background, run_in_foreground,
};
use privacy_guard_core::video::domain::frame_source::FrameSource;

/// Engages a protective action when more than one face is in front of the camera.
#[derive(Parser, Debug)]
#[command(name = "privacy-guard", version)]
struct Cli {
    /// Configuration file (default: ./privacy_guard_config.json, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monitor the camera (default).
    Run(RunArgs),
    /// Inspect or edit the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Open the camera and read a few frames.
    TestCamera {
        /// Frames to read.
        #[arg(long, default_value = "30")]
        frames: usize,
    },
}

/// Per-session overrides of configuration keys.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Heatmap confidence threshold (0.0-1.0).
    #[arg(long)]
    threshold: Option<f64>,

    /// Seconds more than one face must persist before privacy engages.
    #[arg(long)]
    delay: Option<f64>,

    /// Camera index.
    #[arg(long)]
    camera: Option<u32>,

    /// Seconds between detection ticks.
    #[arg(long)]
    interval: Option<f64>,

    /// Write an annotated preview snapshot every tick.
    #[arg(long)]
    preview: bool,

    /// Face counting strategy: clustering or grid_scan.
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<CountStrategy>,

    /// Protective action: app_launch or banner.
    #[arg(long, value_parser = parse_action)]
    action: Option<ProtectiveActionMode>,

    /// Application or script launched before the per-platform table.
    #[arg(long)]
    custom_path: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as JSON.
    Show,
    /// Write the default configuration.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Set one key and save.
    Set { key: String, value: String },
    /// Print which file the configuration is read from.
    Path,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        None => run_monitor(config_path, &RunArgs::default()),
        Some(Command::Run(args)) => run_monitor(config_path, &args),
        Some(Command::Config(cmd)) => run_config(config_path, cmd),
        Some(Command::TestCamera { frames }) => check_camera(config_path, frames),
    }
}

fn run_monitor(config_path: Option<&Path>, args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GuardConfig::load(config_path).config;
    apply_overrides(&mut config, args);
    config.validate()?;

    let (session, _metadata) = build_session(&config)?;

    let (interrupt_tx, interrupt_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;
    log::info!("Privacy Guard active, press Ctrl+C to stop");

    let interval = config.detection_interval();
    if session.preview_enabled() {
        run_in_foreground(session, interval, &interrupt_rx);
    } else {
        run_in_background(session, interval, &interrupt_rx)?;
    }
    log::info!("Privacy Guard stopped");
    Ok(())
}

fn apply_overrides(config: &mut GuardConfig, args: &RunArgs) {
    if let Some(t) = args.threshold {
        config.detection_threshold = t;
    }
    if let Some(d) = args.delay {
        config.privacy_delay = d;
    }
    if let Some(c) = args.camera {
        config.camera_index = c;
    }
    if let Some(i) = args.interval {
        config.detection_interval = i;
    }
    if args.preview {
        config.enable_face_preview = true;
    }
    if let Some(s) = args.strategy {
        config.count_strategy = s;
    }
    if let Some(a) = args.action {
        config.actions.protective_action = a;
    }
    if let Some(p) = &args.custom_path {
        config.actions.custom_path = p.clone();
    }
}

fn run_config(config_path: Option<&Path>, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show => {
            let LoadedConfig { config, .. } = GuardConfig::load(config_path);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => {
            let target = write_target(config_path)?;
            if target.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    target.display()
                )
                .into());
            }
            GuardConfig::default().save_to(&target)?;
            println!("Wrote default configuration to {}", target.display());
        }
        ConfigCommand::Set { key, value } => {
            let target = write_target(config_path)?;
            let mut config = if target.is_file() {
                GuardConfig::load_from(&target)?
            } else {
                GuardConfig::default()
            };
            config.set_key(&key, &value)?;
            config.save_to(&target)?;
            println!("{key} updated in {}", target.display());
        }
        ConfigCommand::Path => match GuardConfig::load(config_path).source {
            Some(path) => println!("{}", path.display()),
            None => println!(
                "No configuration file found; defaults in use (would write {})",
                write_target(config_path)?.display()
            ),
        },
    }
    Ok(())
}

/// The file `config init` and `config set` write to: the explicit path, an
/// existing file from the search order, or the per-user location.
fn write_target(config_path: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(p) = config_path {
        return Ok(p.to_path_buf());
    }
    if let Some(existing) = guard_config::search_paths().into_iter().find(|p| p.is_file()) {
        return Ok(existing);
    }
    Ok(guard_config::user_config_path()?)
}

fn check_camera(config_path: Option<&Path>, frames: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = GuardConfig::load(config_path).config;
    let (mut source, metadata) = open_camera(&config)?;

    let mut received = 0;
    for _ in 0..frames {
        match source.read() {
            Ok(Some(_)) => received += 1,
            Ok(None) => {}
            Err(e) => log::warn!("Frame read failed: {e}"),
        }
    }
    source.release();

    println!(
        "Camera {}: {} @ {:.0} fps, {received}/{frames} frames received",
        metadata.device,
        metadata.resolution(),
        metadata.fps
    );
    if received == 0 && frames > 0 {
        return Err("camera opened but delivered no frames".into());
    }
    Ok(())
}

fn parse_strategy(s: &str) -> Result<CountStrategy, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown strategy '{s}' (expected clustering or grid_scan)"))
}

fn parse_action(s: &str) -> Result<ProtectiveActionMode, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown action '{s}' (expected app_launch or banner)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("privacy-guard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_run_flags_override_config() {
        let cli = parse(&[
            "run",
            "--threshold",
            "0.5",
            "--delay",
            "3",
            "--camera",
            "1",
            "--interval",
            "0.25",
            "--preview",
            "--strategy",
            "grid_scan",
            "--action",
            "banner",
            "--custom-path",
            "/opt/cover",
        ]);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };

        let mut config = GuardConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.detection_threshold, 0.5);
        assert_eq!(config.privacy_delay, 3.0);
        assert_eq!(config.camera_index, 1);
        assert_eq!(config.detection_interval, 0.25);
        assert!(config.enable_face_preview);
        assert_eq!(config.count_strategy, CountStrategy::GridScan);
        assert_eq!(config.actions.protective_action, ProtectiveActionMode::Banner);
        assert_eq!(config.actions.custom_path, "/opt/cover");
    }

    #[test]
    fn test_no_flags_leave_config_alone() {
        let mut config = GuardConfig::default();
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = parse(&["config", "show", "--config", "/tmp/pg.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pg.json")));
        assert!(matches!(cli.command, Some(Command::Config(ConfigCommand::Show))));
    }

    #[test]
    fn test_config_set_takes_key_and_value() {
        let cli = parse(&["config", "set", "privacy_delay", "4.5"]);
        let Some(Command::Config(ConfigCommand::Set { key, value })) = cli.command else {
            panic!("expected config set");
        };
        assert_eq!(key, "privacy_delay");
        assert_eq!(value, "4.5");
    }

    #[test]
    fn test_config_init_force() {
        let cli = parse(&["config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Init { force: true }))
        ));
    }

    #[test]
    fn test_camera_frames_default() {
        let cli = parse(&["test-camera"]);
        assert!(matches!(cli.command, Some(Command::TestCamera { frames: 30 })));
    }

    #[rstest]
    #[case::strategy(&["run", "--strategy", "kmeans"])]
    #[case::action(&["run", "--action", "lock_screen"])]
    fn test_unknown_enum_values_rejected(#[case] args: &[&str]) {
        let argv = std::iter::once("privacy-guard").chain(args.iter().copied());
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_write_target_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        assert_eq!(write_target(Some(path.as_path())).unwrap(), path);
    }

    #[test]
    fn test_config_set_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg.json");

        run_config(
            Some(path.as_path()),
            ConfigCommand::Set {
                key: "detection_threshold".to_string(),
                value: "0.55".to_string(),
            },
        )
        .unwrap();

        let saved = GuardConfig::load_from(&path).unwrap();
        assert_eq!(saved.detection_threshold, 0.55);
        assert!(run_config(Some(path.as_path()), ConfigCommand::Init { force: false }).is_err());
        run_config(Some(path.as_path()), ConfigCommand::Init { force: true }).unwrap();
        assert_eq!(GuardConfig::load_from(&path).unwrap(), GuardConfig::default());
    }
}
