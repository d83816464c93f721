use std::sync::Arc;

use clap::{Parser, Subcommand};
use marketchat::transport::DeliverySink;
use marketchat::{
    Bubble, ChatConfig, ChatError, ChatWidget, ConfigError, ConnectionState, ConversationId, HttpRegistry, Message,
    SessionRegistry, StompTransport, Transport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("stdin read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid room id: {0:?}")]
    InvalidRoom(String),
}

#[derive(Parser, Debug)]
#[command(name = "chat-cli", about = "Marketplace buyer/seller chat client")]
struct Cli {
    #[arg(long, env = "MARKETCHAT_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "MARKETCHAT_WS_URL")]
    ws_url: Option<String>,

    #[arg(long, env = "MARKETCHAT_SESSION_TOKEN")]
    session_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a room id from the API and print it.
    Room,
    /// Interactive chat: `/open` toggles the room, other lines are sent.
    Chat,
    /// Publish one message to a room and exit.
    Send {
        #[arg(long)]
        room: String,
        text: String,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Toggle,
    Show,
    Help,
    Quit,
    Text(&'a str),
    Blank,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ChatConfig::from_env()?;
    config.override_endpoints(cli.base_url.as_deref(), cli.ws_url.as_deref())?;
    if let Some(token) = cli.session_token.filter(|token| !token.is_empty()) {
        config.session_token = Some(token);
    }

    match cli.command {
        Command::Room => run_room(&config).await,
        Command::Chat => run_chat(&config).await,
        Command::Send { room, text } => run_send(&config, &room, &text).await,
    }
}

async fn run_room(config: &ChatConfig) -> Result<(), CliError> {
    let registry = HttpRegistry::new(config)?;
    let id = registry.fetch_conversation_id().await?;
    println!("{id}");
    Ok(())
}

async fn run_send(config: &ChatConfig, room: &str, text: &str) -> Result<(), CliError> {
    let conversation = ConversationId::parse(room).ok_or_else(|| CliError::InvalidRoom(room.to_owned()))?;
    let transport = StompTransport::new(config);
    let (tx, _rx) = mpsc::unbounded_channel();

    transport.connect(&conversation, DeliverySink::new(0, tx)).await?;
    let sent = transport.send(&conversation, text).await;
    transport.disconnect().await;
    sent?;

    eprintln!("sent to room {conversation}");
    Ok(())
}

async fn run_chat(config: &ChatConfig) -> Result<(), CliError> {
    let registry = Arc::new(HttpRegistry::new(config)?);
    let transport = Arc::new(StompTransport::new(config));
    let mut widget = ChatWidget::new(registry, transport).with_clear_on_reopen(config.clear_on_reopen);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_help();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Toggle => {
                        let shown = widget.messages().len();
                        let state = widget.toggle().await;
                        if state.is_open() {
                            report_state(&state);
                            render(&widget);
                        } else {
                            // Closing drains deliveries `recv` has not printed yet.
                            print_messages(unprinted(widget.messages(), shown));
                            report_state(&state);
                        }
                    }
                    Input::Show => render(&widget),
                    Input::Help => print_help(),
                    Input::Quit => break,
                    Input::Text(text) => {
                        if !widget.is_open() {
                            eprintln!("chat is closed; type /open first");
                            continue;
                        }
                        widget.set_input(text);
                        widget.submit().await;
                    }
                    Input::Blank => {}
                }
            }
            message = widget.recv() => match message {
                Some(message) => print_messages(std::slice::from_ref(&message)),
                None => {
                    eprintln!("-- connection lost");
                    report_state(widget.state());
                }
            },
        }
    }

    if widget.is_open() {
        widget.toggle().await;
    }
    Ok(())
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Blank,
        "/open" | "/close" | "/toggle" => Input::Toggle,
        "/show" => Input::Show,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        _ => Input::Text(trimmed),
    }
}

fn report_state(state: &ConnectionState) {
    match state {
        ConnectionState::Open { conversation, .. } => eprintln!("-- room {conversation} open"),
        ConnectionState::Closed => eprintln!("-- chat closed"),
    }
}

/// Messages appended after the first `shown` were printed.
fn unprinted(messages: &[Message], shown: usize) -> &[Message] {
    messages.get(shown..).unwrap_or_default()
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        println!("{}", Bubble::right(message.body()));
    }
}

fn render(widget: &ChatWidget) {
    for bubble in widget.bubbles() {
        println!("{bubble}");
    }
}

fn print_help() {
    eprintln!("commands: /open (toggle), /show, /help, /quit; anything else is sent");
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
