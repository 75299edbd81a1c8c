use anyhow::Result;
use clap::{Parser, Subcommand};
use college_qa::client::ChatClient;
use college_qa::composer::Composer;
use college_qa::config::Settings;
use college_qa::retriever::Retriever;
use college_qa::server;
use college_qa::service::QaService;
use college_qa::store::DirectoryStore;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "college-qa", about = "Answers questions from a fixed document set")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP chat API
    Serve,
    /// Ask questions interactively against the local documents
    Chat,
    /// Send one question to a running server
    Ask {
        message: String,
        /// Server base URL (defaults to client.endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn build_service(settings: &Settings) -> QaService {
    let store = DirectoryStore::new(&settings.documents.dir, settings.documents.chunk_chars);
    QaService::new(
        Arc::new(store),
        Retriever::new(settings.retriever_config()),
        Composer::new(settings.composer_config()),
    )
}

fn chat_loop(service: &QaService) -> Result<()> {
    println!("Ask about programs, admission, fees... (Ctrl+D to exit)");

    loop {
        let mut query = String::new();
        print!("> ");
        std::io::stdout().flush()?;

        if std::io::stdin().read_line(&mut query)? == 0 {
            break; // EOF (Ctrl+D)
        }

        let query = query.trim();
        if query.is_empty() {
            continue;
        }

        match service.answer(query) {
            Ok(answer) => println!("{}\n\nSources: {}\n", answer.response, answer.sources.join(", ")),
            Err(e) => eprintln!("Error: {}\n", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "college_qa=debug,tower_http=debug"
    } else {
        "college_qa=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => {
            let service = Arc::new(build_service(&settings));
            server::serve(service, &settings.bind_addr()).await?;
        }
        Command::Chat => {
            let service = build_service(&settings);
            tokio::task::spawn_blocking(move || chat_loop(&service)).await??;
        }
        Command::Ask { message, endpoint } => {
            let endpoint = endpoint.unwrap_or_else(|| settings.client.endpoint.clone());
            let reply = ChatClient::new(endpoint).ask(&message).await;
            println!("{}", reply.render());
        }
    }

    Ok(())
}
