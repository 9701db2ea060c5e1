mod display;
mod store;

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wikilens_core::{Dictionary, LensConfig, LensSession, annotate};
use wikilens_sync::KeywordClient;

#[derive(Parser)]
#[command(name = "wikilens", version, about = "Highlight and explain keywords in article text")]
struct Cli {
    /// TOML config file.
    #[arg(long, env = "WIKILENS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Base URL of the keyword-detection service (overrides the config file).
    #[arg(long, env = "WIKILENS_API_URL", global = true)]
    api_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate text (from --text, --file, or stdin).
    Annotate {
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Curated dictionary (JSON array of annotations).
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Saved keyword-detection response to use as the detected layer.
        #[arg(long, conflicts_with = "detect")]
        detected: Option<PathBuf>,
        /// Ask the keyword-detection service for keywords in the text.
        #[arg(long)]
        detect: bool,
        /// Turn lens mode off: print the text untouched.
        #[arg(long)]
        no_lens: bool,
        /// Emit segments as JSON.
        #[arg(long)]
        json: bool,
        #[arg(long)]
        no_color: bool,
    },
    /// Show the reference card for a keyword.
    Reference {
        keyword: String,
        #[arg(long)]
        dictionary: PathBuf,
        #[arg(long)]
        detected: Option<PathBuf>,
    },
    /// Advance a keyword's level: unknown → partial → known → unknown.
    Cycle {
        keyword: String,
        #[arg(long)]
        dictionary: PathBuf,
    },
    /// Mark a keyword as known.
    MarkKnown {
        keyword: String,
        #[arg(long)]
        dictionary: PathBuf,
    },
    /// Replace a keyword's reference description.
    Describe {
        keyword: String,
        description: String,
        #[arg(long)]
        dictionary: PathBuf,
    },
    /// Record a study session and update the keyword's level.
    Study {
        keyword: String,
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!("wikilens v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => LensConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LensConfig::default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    match cli.command {
        Command::Annotate {
            text,
            file,
            dictionary,
            detected,
            detect,
            no_lens,
            json,
            no_color,
        } => {
            let text = read_input(text, file.as_deref())?;
            let manual = match dictionary {
                Some(path) => store::load_dictionary(&path)?,
                None => Dictionary::new(),
            };
            let mut session = LensSession::new(config, manual);
            if no_lens {
                session.set_enabled(false);
            }

            if let Some(path) = detected {
                session.replace_detected(&store::load_detected(&path)?);
            } else if detect && session.is_enabled() {
                let client = KeywordClient::from_config(&session.config().api)?;
                let records = client.detect_keywords_or_default(&text).await;
                session.replace_detected(&records);
            }

            let dict = session.dictionary();
            let segments = annotate(&text, &dict, session.is_enabled());
            if json {
                let views = display::segment_views(&segments, &dict);
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                let color = !no_color && std::io::stdout().is_terminal();
                println!("{}", display::render_segments(&segments, &dict, color));
                if session.is_enabled() {
                    info!("{}", display::match_summary(&segments, &dict));
                }
            }
        }
        Command::Reference {
            keyword,
            dictionary,
            detected,
        } => {
            let manual = store::load_dictionary(&dictionary)?;
            let mut session = LensSession::new(config, manual);
            if let Some(path) = detected {
                session.replace_detected(&store::load_detected(&path)?);
            }
            let dict = session.dictionary();
            let Some(annotation) = dict.get(&keyword) else {
                bail!("keyword not in dictionary: {keyword}");
            };
            print!("{}", display::format_reference_card(annotation));
        }
        Command::Cycle {
            keyword,
            dictionary,
        } => {
            let mut session = open_session(config, &dictionary)?;
            let level = session.cycle(&keyword)?;
            store::save_dictionary(session.manual(), &dictionary)?;
            println!("{keyword}: {level}");
        }
        Command::MarkKnown {
            keyword,
            dictionary,
        } => {
            let mut session = open_session(config, &dictionary)?;
            let level = session.mark_known(&keyword)?;
            store::save_dictionary(session.manual(), &dictionary)?;
            println!("{keyword}: {level}");
        }
        Command::Describe {
            keyword,
            description,
            dictionary,
        } => {
            let mut session = open_session(config, &dictionary)?;
            session.set_description(&keyword, &description)?;
            store::save_dictionary(session.manual(), &dictionary)?;
            println!("{keyword}: description updated");
        }
        Command::Study {
            keyword,
            dictionary,
        } => {
            let client = KeywordClient::from_config(&config.api)?;
            let score = client.simulate_study(&keyword).await?;
            let level = config.study.level_for(score);

            if let Some(path) = dictionary {
                let mut session = open_session(config, &path)?;
                if session.manual().contains(&keyword) {
                    session.apply_study_score(&keyword, score)?;
                    store::save_dictionary(session.manual(), &path)?;
                } else {
                    info!(keyword = %keyword, "keyword not in dictionary, nothing saved");
                }
            }
            println!("{keyword}: {level} (score {score:.2})");
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wikilens={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(config: LensConfig, dictionary: &Path) -> anyhow::Result<LensSession> {
    let manual = store::load_dictionary(dictionary)?;
    Ok(LensSession::new(config, manual))
}

fn read_input(text: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading text from stdin")?;
    Ok(buf)
}
