use anyhow::Result;
use clap::{Parser, Subcommand};
use persona_core::{Completion, Locale};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod shell;

use app::{load_image, App};
use config::Config;

#[derive(Parser)]
#[command(name = "persona", version, about = "Guess age, gender and mood from a face photo and make a persona card")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output language (en, tr); overrides config and PERSONA_LOCALE
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo and print its persona
    Analyze {
        image: PathBuf,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze a photo and export its card as analysis-card.png
    Card {
        image: PathBuf,
        /// Directory to write the card into (default: config output_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Interactive session: open, analyze, reroll, export
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    tracing::debug!(?config, "configuration loaded");

    let engine = persona_vision::spawn_onnx_engine(config.model_paths(), config.detector_options())?;
    let mut app = App::new(&config, engine);

    match cli.command {
        Commands::Analyze { image, json } => {
            let photo = load_image(&image)?;
            let completion = app.analyze_photo(photo).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&app.report())?);
            } else if completion == Completion::NoFace {
                eprintln!("{}", app.locale().no_face_notice());
            } else if let Some(persona) = app.session().persona() {
                println!("{persona}");
            }
        }
        Commands::Card { image, out_dir } => {
            let photo = load_image(&image)?;
            if app.analyze_photo(photo).await? == Completion::NoFace {
                eprintln!("{}", app.locale().no_face_notice());
                return Ok(());
            }
            if let Some(persona) = app.session().persona() {
                println!("{persona}");
            }
            if let Some(path) = app.export(out_dir.as_deref())? {
                println!("saved {}", path.display());
                if !app.card_has_text() {
                    eprintln!("{}", shell::NO_FONT_NOTE);
                }
            }
        }
        Commands::Shell => shell::Shell::new(app).run().await?,
    }

    Ok(())
}
