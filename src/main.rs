//! Motion Arcade - headless runner
//!
//! Drives one session over a replayed or synthetic landmark stream at the
//! fixed simulation rate, logging events as they happen.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use motion_arcade::consts::SIM_DT;
use motion_arcade::sim::landmarks::LandmarkSource;
use motion_arcade::sim::{GameEvent, GameKind, GamePhase, GameState, TickInput, tick};
use motion_arcade::source::{ReplaySource, SyntheticSource};
use motion_arcade::{Error, FrameSnapshot, QualityPreset, Result, Settings};

#[derive(Parser)]
#[command(name = "motion-arcade", about = "Camera-controlled party mini-games, headless")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one round against a landmark stream
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Game to play (basketball, fruit, dodge, tower)
    #[arg(long, value_parser = parse_game)]
    game: GameKind,

    /// Number of players (1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    players: u8,

    /// Recorded landmark frames (JSON array); synthetic motion when omitted
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Particle quality (low, medium, high); overrides the settings file
    #[arg(long, value_parser = parse_quality)]
    quality: Option<QualityPreset>,

    /// Random seed for the session
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Stop after this many frames even if the round is still running
    #[arg(long)]
    frames: Option<u64>,

    /// Write the final frame snapshot here (JSON)
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn parse_game(s: &str) -> std::result::Result<GameKind, String> {
    GameKind::from_str(s).ok_or_else(|| {
        let names: Vec<_> = GameKind::ALL.iter().map(|g| g.as_str()).collect();
        format!("unknown game '{}' (expected one of: {})", s, names.join(", "))
    })
}

fn parse_quality(s: &str) -> std::result::Result<QualityPreset, String> {
    QualityPreset::from_str(s).ok_or_else(|| format!("unknown quality '{}' (expected low, medium or high)", s))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let settings = match (&args.settings, args.quality) {
        (Some(path), quality) => {
            let mut settings = Settings::load(path)?;
            if let Some(quality) = quality {
                settings.quality = quality;
            }
            settings
        }
        (None, quality) => Settings::from_preset(quality.unwrap_or_default()),
    };

    let arena = settings.arena_rect();
    let mut source: Box<dyn LandmarkSource> = match &args.replay {
        Some(path) => Box::new(ReplaySource::load(path, arena)?),
        None => Box::new(SyntheticSource::new(
            args.game,
            usize::from(args.players),
            arena,
            &settings.tuning,
            args.seed,
        )),
    };
    if source.tracker() != args.game.tracker() {
        return Err(Error::Config(format!(
            "{} needs {:?} landmarks but the source produces {:?}",
            args.game.as_str(),
            args.game.tracker(),
            source.tracker()
        )));
    }

    let mut state = GameState::new(args.game, settings, args.seed)?;
    log::info!(
        "Motion Arcade: {} with {} player(s), seed {}",
        args.game.as_str(),
        args.players,
        args.seed
    );

    let mut input = TickInput {
        select_players: Some(args.players),
        ..Default::default()
    };
    loop {
        if args.frames.is_some_and(|limit| state.time_ticks >= limit) {
            log::info!("Frame limit reached");
            break;
        }
        let Some(frame) = source.poll() else {
            log::info!("Landmark source exhausted");
            break;
        };

        for event in tick(&mut state, &input, Some(&frame), SIM_DT) {
            log_event(&event);
        }
        input = TickInput::default();

        if state.phase.phase == GamePhase::GameOver || state.quit_requested {
            break;
        }
    }

    print_summary(&state);

    if let Some(path) = &args.snapshot {
        let json = FrameSnapshot::from_state(&state).to_json()?;
        std::fs::write(path, json)?;
        log::info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Scored { .. } | GameEvent::Jump { .. } => log::debug!("{:?}", event),
        GameEvent::PhaseChanged { .. } | GameEvent::TierRaised { .. } | GameEvent::GameOver { .. } => {}
        _ => log::info!("{:?}", event),
    }
}

fn print_summary(state: &GameState) {
    let session = &state.session;
    println!();
    println!("{} - {} tick(s), {:.1}s played", state.game().as_str(), state.time_ticks, session.elapsed);
    for player in &session.scoring.players {
        println!(
            "  {}: {} point(s){}",
            player.id,
            player.score,
            if player.alive { "" } else { " (eliminated)" }
        );
    }
    println!("  difficulty: {}", session.scoring.tier.as_str());
    match state.phase.game_over_reason {
        Some(reason) => println!("  result: {:?} ({:?})", session.scoring.outcome(), reason),
        None => println!("  result: round still running ({})", state.phase.phase.as_str()),
    }
}
