//! Terminal front end for a RelayChat relay.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::watch;

use relaychat_client::{
    ChatClient, Conversation, RevealScheduler, RevealStyle, TurnUpdate, consume_turn, run_reveal,
};

#[derive(Parser)]
#[command(name = "relaychat", about = "Chat with a RelayChat relay from the terminal")]
struct Cli {
    /// Message to send; starts an interactive session when omitted.
    message: Option<String>,

    /// Relay server base URL.
    #[arg(long, env = "RELAYCHAT_SERVER_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Reveal pacing style.
    #[arg(long, value_enum, default_value = "smooth")]
    style: StyleArg,

    /// Request one block response instead of streaming.
    #[arg(long)]
    block: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Word,
    Burst,
    Chunked,
    Smooth,
}

impl From<StyleArg> for RevealStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Word => RevealStyle::Word,
            StyleArg::Burst => RevealStyle::Burst,
            StyleArg::Chunked => RevealStyle::Chunked,
            StyleArg::Smooth => RevealStyle::Smooth,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,relaychat_cli=info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let client = ChatClient::new(&cli.server);

    if cli.block {
        let message = cli
            .message
            .clone()
            .context("block mode needs a message argument")?;
        let reply = client.send_block(&message).await?;
        println!("{}", reply);
        return Ok(());
    }

    let mut conversation = Conversation::new();

    if let Some(message) = cli.message {
        let ok = run_turn(&client, &mut conversation, cli.style.into(), &message).await;
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Interactive session: one turn per input line, /retry resends the
    // last failed prompt, ctrl-c during a turn stops generation.
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }

        let prompt = if input == "/retry" {
            match conversation.take_retry_prompt() {
                Some(prompt) => prompt,
                None => {
                    println!("nothing to retry");
                    continue;
                }
            }
        } else {
            input.to_string()
        };

        run_turn(&client, &mut conversation, cli.style.into(), &prompt).await;
    }

    Ok(())
}

/// Drive one streaming turn: consume the SSE body while the reveal paces
/// stdout output from the shared transcript feed.
async fn run_turn(
    client: &ChatClient,
    conversation: &mut Conversation,
    style: RevealStyle,
    message: &str,
) -> bool {
    let (_ids, cancel) = conversation.begin_turn(message);

    let body = match client.open_stream(message).await {
        Ok(body) => body,
        Err(err) => {
            let outcome = Err(err);
            conversation.finish_turn(&outcome);
            if let Err(err) = outcome {
                eprintln!("error: {} (type /retry to resend)", err);
            }
            return false;
        }
    };

    let (updates, reveal_rx) = watch::channel(TurnUpdate::initial());

    // ctrl-c stops this turn, not the program.
    let interrupt_cancel = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt_cancel.cancel();
        }
    });

    let mut printed = 0usize;
    let reveal = tokio::spawn(run_reveal(
        RevealScheduler::new(style),
        reveal_rx,
        move |displayed: &str| {
            if displayed.len() > printed {
                print!("{}", &displayed[printed..]);
                io::stdout().flush().ok();
                printed = displayed.len();
            }
        },
    ));

    let outcome = consume_turn(body, &updates, &cancel).await;
    // Publishing stops here; the reveal drains whatever is left.
    drop(updates);
    let _ = reveal.await;
    interrupt.abort();
    println!();

    let ok = outcome.is_ok();
    conversation.finish_turn(&outcome);
    if let Err(err) = outcome {
        eprintln!("error: {} (type /retry to resend)", err);
    }
    ok
}
