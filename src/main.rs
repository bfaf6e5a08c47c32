use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod acquire;
mod cli;
mod compose;
mod config;
mod filter;
mod media;
mod output;
mod transcribe;
mod utils;

use cli::{Cli, Commands};
use compose::{ClipRequest, Composer};
use config::Config;
use filter::FilterEngine;
use media::MediaToolkit;
use transcribe::{HttpRecognizer, Transcriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Check for required external dependencies (non-fatal)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let config = Config::load().await?;
    let toolkit = MediaToolkit::new();

    match cli.command {
        Commands::Fetch {
            url,
            output_dir,
            session_id,
        } => {
            let url = utils::validate_and_normalize_url(&url)?;

            let dest_dir = output_dir
                .or_else(|| config.app.download_dir.clone())
                .map(Ok)
                .unwrap_or_else(std::env::current_dir)?;
            fs_err::create_dir_all(&dest_dir)?;

            let session_id = session_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()[..8].to_string());

            let registry = acquire::SourceRegistry::new();
            let path = registry.fetch(&url, &dest_dir, &session_id).await?;
            println!("Video saved to: {}", path.display());
        }

        Commands::Transcribe {
            input,
            output,
            format,
            language,
            show_skipped,
        } => {
            let recognizer = HttpRecognizer::new(
                config.recognizer.endpoint.clone(),
                config.recognizer.model.clone(),
                language.or_else(|| config.recognizer.language.clone()),
            );
            let transcriber =
                Transcriber::new(toolkit, Box::new(recognizer), config.app.window_seconds);

            let outcomes = transcriber.transcribe_media(&input).await?;

            if show_skipped {
                for outcome in &outcomes {
                    if let transcribe::ChunkOutcome::Skipped {
                        window_index,
                        start_time,
                        end_time,
                        reason,
                    } = outcome
                    {
                        eprintln!(
                            "skipped window {window_index} [{start_time:.1}s-{end_time:.1}s]: {reason}"
                        );
                    }
                }
            }

            let segments = transcribe::segments(&outcomes);
            match output {
                Some(path) => {
                    output::save_to_file(&segments, &path, &format).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&segments, &format)?;
                }
            }
        }

        Commands::Clip {
            input,
            start,
            end,
            output,
            vertical,
            subtitles,
            auto_captions,
        } => {
            let subtitle_segments = if let Some(path) = subtitles {
                output::load_segments(&path)
                    .with_context(|| format!("Failed to load subtitles from {}", path.display()))?
            } else if auto_captions {
                let recognizer = HttpRecognizer::new(
                    config.recognizer.endpoint.clone(),
                    config.recognizer.model.clone(),
                    config.recognizer.language.clone(),
                );
                let transcriber = Transcriber::new(
                    toolkit.clone(),
                    Box::new(recognizer),
                    config.app.window_seconds,
                );
                transcribe::segments(&transcriber.transcribe_media(&input).await?)
            } else {
                Vec::new()
            };

            let composer = Composer::new(toolkit, config.encoder.clone());
            let request = ClipRequest {
                source: input,
                start_time: start,
                end_time: end,
                output_path: output,
                subtitles: subtitle_segments,
                vertical,
            };

            let path = composer.compose(&request).await?;
            println!("Clip saved to: {}", path.display());
        }

        Commands::Filter {
            input,
            output,
            name,
        } => {
            let engine = FilterEngine::new(toolkit, config.encoder.clone());
            let path = engine.apply(&input, &output, name).await?;
            println!("Filtered clip saved to: {}", path.display());
        }

        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.save().await?;
                println!("Configuration written; edit it to change settings.");
                config.display();
            }
        }

        Commands::Sources => {
            println!("Supported video sources:");
            for name in acquire::SourceRegistry::new().list_sources() {
                println!("  • {}", name);
            }
            println!("  • Local video files (pass a path to `transcribe`, `clip`, or `filter`)");
        }
    }

    Ok(())
}
