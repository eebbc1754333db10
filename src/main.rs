mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod mix;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use mix::effects::EffectsConfig;
use mix::{RenderOptions, TrackSet};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect remixa.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("remixa.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("remixa").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("remixa").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.duration == 30.0 { cli.duration = cfg.output.duration; }
            if cli.crossfade == 1.5 { cli.crossfade = cfg.output.crossfade; }
            if cli.bass == 0.0 { cli.bass = cfg.effects.bass_gain_db; }
            if cli.echo == 0.0 { cli.echo = cfg.effects.echo_amount; }
            if !cli.flanger { cli.flanger = cfg.effects.flanger; }
            if !cli.reverb { cli.reverb = cfg.effects.reverb; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.inputs.len() < mix::MIN_TRACKS {
        anyhow::bail!("At least {} input tracks are required", mix::MIN_TRACKS);
    }

    log::info!("remixa - offline audio mashup generator");
    log::info!("Output: {}", cli.output.display());
    log::info!("Duration: {}s, crossfade: {}s", cli.duration, cli.crossfade);

    // 1. Decode tracks. A failing track is dropped from the working set;
    // the pipeline continues as long as enough tracks survive.
    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tracks decoded")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut set = TrackSet::new();
    for path in &cli.inputs {
        match audio::decode::decode_audio(path) {
            Ok(track) => set.push(track)?,
            Err(err) => {
                log::warn!("Dropping {}: {:#}", path.display(), err);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if set.len() < mix::MIN_TRACKS {
        anyhow::bail!(error::MixError::InsufficientTracks(set.len()));
    }

    // 2. Render
    let effects = EffectsConfig {
        bass_gain_db: cli.bass,
        echo_amount: cli.echo,
        flanger: cli.flanger,
        reverb: cli.reverb,
    };
    let opts = RenderOptions {
        total_duration_secs: cli.duration,
        crossfade_secs: cli.crossfade,
        seed: cli.seed.unwrap_or_else(rand::random),
    };

    log::info!("Rendering mashup from {} tracks...", set.len());
    let rendered = if cli.duet {
        if set.len() != 2 {
            anyhow::bail!("Duet mode requires exactly 2 tracks, got {}", set.len());
        }
        mix::render_duet(&set.tracks()[0], &set.tracks()[1], &opts, &effects)?
    } else {
        mix::render(set.tracks(), &opts, &effects)?
    };

    // 3. Encode
    log::info!("Encoding WAV...");
    let bytes = encode::wav::encode_wav(&rendered);
    std::fs::write(&cli.output, &bytes)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    log::info!(
        "Done! {} ({:.1}s, {} channels, {} bytes)",
        cli.output.display(),
        rendered.duration_secs(),
        rendered.channel_count(),
        bytes.len()
    );
    Ok(())
}
