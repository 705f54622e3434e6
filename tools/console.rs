/// Console: play the quiz from a terminal, as if chatting with the bot.
///
/// Usage: console [--offline] [--seed <n>] [--name <first name>]
///
/// Pools come from the environment (see `QuizConfig`). `--offline` uses the
/// bundled trivia pool instead of fetching.
///
/// Commands (anything else is sent to the bot as a message):
///   :user <id>   switch the simulated user
///   :score       show the current user's session
///   :help        list commands
///   :quit        exit

use quiz_engine::config::QuizConfig;
use quiz_engine::core::machine::ConversationMachine;
use quiz_engine::core::transport::{Inbound, ParseMode, ReplyOptions, Transport};
use quiz_engine::schema::session::UserId;
use quiz_engine::startup::{self, StartupError};
use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prints replies to stdout, rendering keyboards as bracketed buttons.
struct ConsoleTransport;

impl Transport for ConsoleTransport {
    type Error = Infallible;

    async fn send_text(
        &self,
        _user_id: UserId,
        text: &str,
        options: Option<&ReplyOptions>,
    ) -> Result<(), Infallible> {
        let html = options.and_then(|o| o.parse_mode) == Some(ParseMode::Html);
        let text = if html { strip_tags(text) } else { text.to_string() };
        for line in text.lines() {
            println!("bot> {}", line);
        }
        if let Some(keyboard) = options.and_then(|o| o.keyboard.as_ref()) {
            for row in &keyboard.rows {
                let buttons: Vec<String> = row.iter().map(|b| format!("[{}]", b)).collect();
                println!("     {}", buttons.join(" "));
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut offline = false;
    let mut seed = None;
    let mut display_name = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--offline" => offline = true,
            "--seed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse() {
                    Ok(n) => seed = Some(n),
                    Err(_) => {
                        eprintln!("Invalid seed: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--name" if i + 1 < args.len() => {
                i += 1;
                display_name = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let machine = match build_machine(offline, seed).await {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!("Type /start to begin, :help for console commands.\n");

    let transport = ConsoleTransport;
    let mut user = UserId(1);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}> ", user);
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            ":quit" | ":q" => {
                println!("Goodbye.");
                break;
            }
            ":help" => print_help(),
            ":user" => match parts.get(1).and_then(|id| id.parse().ok()) {
                Some(id) => {
                    user = UserId(id);
                    println!("Now chatting as user {}", user);
                }
                None => println!("Usage: :user <id>"),
            },
            ":score" => match machine.session(user).await {
                Some(session) => {
                    println!("  state: {}", session.state.name());
                    println!("  score: {}", session.score);
                    println!(
                        "  asked: {} trivia, {} riddles this cycle",
                        session.asked_trivia.len(),
                        session.asked_riddles.len()
                    );
                }
                None => println!("  user {} has not said anything yet", user),
            },
            _ => {
                let mut inbound = Inbound::text(user, line);
                if let Some(name) = &display_name {
                    inbound = inbound.with_display_name(name.clone());
                }
                if let Err(e) = machine.dispatch(inbound, &transport).await {
                    match e {}
                }
            }
        }
    }
}

async fn build_machine(offline: bool, seed: Option<u64>) -> Result<ConversationMachine, StartupError> {
    let mut config = QuizConfig::from_env()?;
    if seed.is_some() {
        config.seed = seed;
    }
    if offline {
        startup::bootstrap_with_trivia(&config, startup::bundled_trivia()?)
    } else {
        startup::bootstrap(&config).await
    }
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn print_usage() {
    println!("Usage: console [--offline] [--seed <n>] [--name <first name>]");
}

fn print_help() {
    println!("  :user <id>   switch the simulated user");
    println!("  :score       show the current user's session");
    println!("  :quit        exit");
    println!("  anything else is sent to the bot");
}
