use std::sync::Arc;
use std::time::Duration;

use canvas_art_proxy::prompt::styles;
use canvas_art_proxy::provider::ImageProvider;
use canvas_art_proxy::workflow::poller::PollConfig;
use canvas_art_proxy::{Config, GenerationWorkflow, Presenter, PromptComposer, ReplicateClient};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "artctl", about = "CLI for the Canvas art generation workflow", version)]
struct Cli {
    /// Override REPLICATE_API_BASE
    #[arg(global = true, long)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available art styles
    Styles,
    /// Print the prompt that would be sent for a style
    Compose {
        /// Style id (see `artctl styles`)
        #[arg(long)]
        style: String,
        /// Description of the image
        prompt: String,
    },
    /// Generate an image and wait for the result
    Generate {
        /// Style id (see `artctl styles`)
        #[arg(long)]
        style: String,
        /// Delay between status checks, in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Number of status checks before giving up
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Description of the image
        prompt: String,
    },
    /// Fetch the provider's view of a job
    Status {
        /// Job id returned when the job was created
        id: String,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let mut conf = Config::new()?;
    if let Some(base) = cli.api_base {
        conf.provider.api_base = base.trim_end_matches('/').to_string();
    }

    match cli.command {
        Commands::Styles => {
            for style in styles::all() {
                println!("{:<16} {:<28} {}", style.id, style.name, style.description);
            }
            Ok(())
        }
        Commands::Compose { style, prompt } => {
            let style = find_style(&style);
            let composed = PromptComposer::new().compose(&prompt, Some(style))?;
            println!("{}", composed);
            Ok(())
        }
        Commands::Generate { style, interval_ms, max_attempts, prompt } => {
            let style = find_style(&style);
            let poll = PollConfig {
                interval: interval_ms.map(Duration::from_millis).unwrap_or(conf.poll.interval),
                max_attempts: max_attempts.unwrap_or(conf.poll.max_attempts).max(1),
            };
            let provider: Arc<dyn ImageProvider> = Arc::new(ReplicateClient::new(conf.provider.clone())?);
            let workflow = GenerationWorkflow::new(provider, poll);

            let mut presenter = Presenter::new();
            presenter.set_prompt(prompt);
            presenter.select_style(style);
            let presenter = Mutex::new(presenter);

            let result = workflow.run(&presenter).await;
            let p = presenter.lock().await;
            if let Some(status) = &p.state().status_message {
                eprintln!("{}", status);
            }
            match result {
                Ok(url) => {
                    println!("{}", url);
                    Ok(())
                }
                Err(_) => {
                    eprintln!("Error: {}", p.state().error_message.as_deref().unwrap_or("generation failed"));
                    std::process::exit(1);
                }
            }
        }
        Commands::Status { id, pretty } => {
            let client = ReplicateClient::new(conf.provider.clone())?;
            let prediction = client.get_prediction(&id).await.map_err(|e| {
                eprintln!("Error: {}", e);
                e
            })?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                println!("{}", serde_json::to_string(&prediction)?);
            }
            Ok(())
        }
    }
}

fn find_style(id: &str) -> &'static styles::Style {
    match styles::find(id) {
        Some(style) => style,
        None => {
            let known: Vec<&str> = styles::all().iter().map(|s| s.id).collect();
            eprintln!("Unknown style '{}'. Known styles: {}", id, known.join(", "));
            std::process::exit(2);
        }
    }
}
