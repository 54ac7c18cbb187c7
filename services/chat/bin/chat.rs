//! Main Entrypoint for the Terminal Chat Client
//!
//! Connects to the assistant, then reads lines from stdin. `/quit` ends the
//! session, `/reconnect` re-activates it after a disconnect, anything else is
//! sent as a message.

use agentchat_cli::{config::Config, transcript::Transcript};
use agentchat_client::{ChatClient, Endpoint, SubmitError, WsConnector};
use agentchat_core::ConversationState;
use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Chat with a streaming assistant from the terminal")]
struct Args {
    /// Base WebSocket endpoint. Overrides CHAT_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,
}

fn print_new(transcript: &mut Transcript, client: &ChatClient<WsConnector>) {
    for line in transcript.render(&client.snapshot()) {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- 1. Load Configuration ---
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // --- 3. Open the Session ---
    let initial = match &config.greeting {
        Some(greeting) => ConversationState::with_greeting(greeting.clone()),
        None => ConversationState::new(),
    };
    let mut client = ChatClient::with_state(
        WsConnector::new(),
        Endpoint::new(config.endpoint.clone()),
        initial,
    );
    let mut transcript = Transcript::new();
    print_new(&mut transcript, &client);

    client.activate();
    info!(
        endpoint = %config.endpoint,
        session_id = ?client.session_id(),
        "Chat session started."
    );

    // --- 4. Event Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match line.trim() {
                    "/quit" => break,
                    "/reconnect" => {
                        if !client.activate() {
                            println!("-- already connected --");
                        }
                    }
                    _ => match client.submit(&line) {
                        Ok(()) | Err(SubmitError::Empty) => {}
                        Err(SubmitError::NotConnected) => {
                            println!("-- not connected, type /reconnect to retry --");
                        }
                        Err(e) => println!("-- {e} --"),
                    },
                }
            }
            _ = client.next_event(), if client.is_listening() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        print_new(&mut transcript, &client);
    }

    client.teardown();
    print_new(&mut transcript, &client);
    Ok(())
}
