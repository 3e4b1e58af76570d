// DanceSync - Headless client
//
// Loads analysis data for one song (from a file or the music API), then plays it back
// against simulated character rigs at 60 ticks per second, logging what the tracker,
// dance engine and effects do.

use clap::Parser;
use dancesync::dance::{DanceId, PlayerId};
use dancesync::effects::EffectCommand;
use dancesync::headless::{CallLog, HeadlessAnimator, HeadlessClipSource, SimulatedPlayback};
use dancesync::messaging::{DanceRelay, DanceSelection, create_selection_channel};
use dancesync::{
    AnimationLengthCache, ApiError, ConfigError, SongData, SongDataClient, SyncConfig, SyncSession,
};
use ringbuf::traits::Consumer;
use std::path::PathBuf;
use std::process::ExitCode;

const TICK_RATE: f64 = 60.0;
// Length reported for every clip by the simulated rigs
const SIMULATED_CLIP_SECONDS: f64 = 8.0;

#[derive(Parser)]
#[command(name = "dancesync")]
#[command(about = "Beat-synchronised dance and effects client (headless)")]
#[command(version)]
struct Args {
    /// Config file (RON); defaults to the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read song analysis JSON from a file instead of the API
    #[arg(long, conflicts_with = "song_id")]
    song_json: Option<PathBuf>,

    /// Fetch song analysis from the API
    #[arg(long)]
    song_id: Option<String>,

    /// Seconds of playback to simulate
    #[arg(short, long, default_value_t = 30.0)]
    duration: f64,

    /// Dance for the local player
    #[arg(long, default_value = "1")]
    dance: String,

    /// Number of simulated remote participants
    #[arg(long, default_value_t = 2)]
    remote_players: u64,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("Config: {0}")]
    Config(#[from] ConfigError),

    #[error("API: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid song JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), RunError> {
    let config = SyncConfig::load_or_default(args.config.as_deref())?;
    let song = load_song_data(&args, &config)?;

    let local = PlayerId(1);
    let (outbox, mut server_inbox) = create_selection_channel(config.broadcast_capacity);
    let mut relay = DanceRelay::new(config.broadcast_capacity);
    let mut inbox = relay.join(local);

    let cache = AnimationLengthCache::new();
    let mut session = SyncSession::new(config, local, cache).with_broadcast(outbox);
    let log = CallLog::default();
    let mut clips = HeadlessClipSource::uniform(SIMULATED_CLIP_SECONDS);

    session
        .dance_mut()
        .attach_rig(local, Box::new(HeadlessAnimator::new("local", log.clone())));
    session.load_song(song.as_ref());

    // Remote participants pick dances through the relay, as their clients would
    let dance_ids: Vec<DanceId> = session.dance().library().ids().into_iter().cloned().collect();
    for (index, player) in (2..2 + args.remote_players).map(PlayerId).enumerate() {
        session.dance_mut().attach_rig(
            player,
            Box::new(HeadlessAnimator::new(player.to_string(), log.clone())),
        );
        if let Some(dance) = dance_ids.get(index % dance_ids.len().max(1)) {
            relay.relay(&DanceSelection::start(player, dance.clone()));
        }
    }
    session.drain_remote_selections(&mut inbox);

    session.handle_chat(&format!(":dance{}", args.dance));
    while let Some(selection) = server_inbox.try_pop() {
        relay.relay(&selection);
    }

    let mut playback = SimulatedPlayback::new();
    playback.play();

    let dt = 1.0 / TICK_RATE;
    let frames = (args.duration.max(0.0) * TICK_RATE).round() as u64;
    let mut beats = 0u64;

    for frame in 0..frames {
        let now = frame as f64 * dt;
        session.drain_remote_selections(&mut inbox);
        session.dance_mut().resolve_length_requests(&mut clips);

        let report = session.tick(now, &playback);
        if let Some(tempo) = report.tempo {
            tracing::info!("Tempo {}", tempo);
        }
        if let Some(beat) = report.beat {
            beats += 1;
            if beat.is_downbeat() {
                tracing::info!("Downbeat at {:.2}s", beat.time);
            }
        }
        for command in &report.effects {
            match command {
                EffectCommand::Ambient(transition) => {
                    tracing::debug!("Ambient -> {:?} over {:.2}s", transition.to, transition.duration)
                }
                EffectCommand::Fov(pulse) => tracing::trace!("FOV pulse to {:.1}", pulse.peak_fov),
            }
        }

        playback.advance(dt);
    }

    tracing::info!(
        "Simulated {:.1}s: {} beats, {} dancers, {} track calls",
        args.duration,
        beats,
        session.dance().playing_count(),
        log.len()
    );
    session.end();
    Ok(())
}

fn load_song_data(args: &Args, config: &SyncConfig) -> Result<Option<SongData>, RunError> {
    if let Some(path) = &args.song_json {
        let text = std::fs::read_to_string(path)?;
        return Ok(Some(SongData::from_json(&text)?));
    }

    let Some(song_id) = &args.song_id else {
        tracing::warn!("No song given, running without analysis data");
        return Ok(None);
    };

    let client = SongDataClient::new(&config.api.base_url, config.api.timeout())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // A failed fetch degrades to "no analysis" rather than aborting playback
    match runtime.block_on(client.get_song_data(song_id)) {
        Ok(data) => Ok(data),
        Err(e) => {
            tracing::warn!("Song data request failed: {}", e);
            Ok(None)
        }
    }
}
