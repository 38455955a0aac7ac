use clap::Parser;
use colloquy_session::{SessionConfig, SessionManager, SessionObserver};
use colloquy_wire::{HttpTransport, IdentityDescriptor, Turn};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "colloquy-cli")]
#[command(about = "Interactive host for one Colloquy conversation session")]
struct Cli {
    /// Endpoint of the conversation service; falls back to COLLOQUY_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    session_id: String,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn on_stage_change(&self, stage: u32) {
        eprintln!("[stage {stage}]");
    }

    fn on_initial_messages(&self, turns: &[Turn]) {
        for turn in turns {
            println!("{}: {}", turn.role.as_str(), turn.content);
        }
    }
}

fn identity_from_args(cli: &Cli) -> Option<IdentityDescriptor> {
    let id = cli.user_id.clone()?;
    Some(IdentityDescriptor {
        id,
        display_name: cli.display_name.clone().unwrap_or_default(),
        email: cli.email.clone().unwrap_or_default(),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let endpoint = match cli
        .endpoint
        .clone()
        .or_else(|| std::env::var("COLLOQUY_ENDPOINT").ok())
    {
        Some(endpoint) => endpoint,
        None => {
            eprintln!("no endpoint: pass --endpoint or set COLLOQUY_ENDPOINT");
            return ExitCode::from(2);
        }
    };

    let config = SessionConfig {
        identity: identity_from_args(&cli),
        ..SessionConfig::default()
    };
    let transport = Arc::new(HttpTransport::new(endpoint));
    let mut manager = SessionManager::with_observer(
        cli.session_id,
        transport,
        config,
        Arc::new(ConsoleObserver),
    );

    if let Err(error) = manager.connect_once().await {
        eprintln!("handshake failed: {error}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                eprintln!("stdin error: {error}");
                return ExitCode::from(1);
            }
        };

        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/retry" => {
                if let Err(error) = manager.retry().await {
                    eprintln!("retry failed: {error}");
                }
            }
            "/history" => {
                for turn in manager.history() {
                    println!("{}: {}", turn.role.as_str(), turn.content);
                }
            }
            "/clear" => manager.clear_history(),
            input => {
                let result = manager
                    .send_turn(
                        input,
                        |piece| {
                            print!("{piece}");
                            let _ = std::io::stdout().flush();
                        },
                        |_| println!(),
                    )
                    .await;
                if let Err(error) = result {
                    eprintln!("turn failed: {error}");
                }
            }
        }
    }

    ExitCode::SUCCESS
}
