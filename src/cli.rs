use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use tjbot::dispatch::{Action, TurnOutcome};
use tjbot::hardware::HardwareBackend;
use tjbot::integration::{Companion, TjBotConfig};
use tjbot::messages::{ChatTurn, Transcript};
use tjbot::session::{ComponentResult, InitReport};

#[derive(Debug, Parser)]
#[command(name = "tjbot", about = "Talk to a TJBot robot companion", version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/tjbot/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Actuator backend, overrides the config file
    #[arg(long, value_parser = parse_backend)]
    hardware: Option<HardwareBackend>,
    /// Start without initializing; use /init later
    #[arg(long)]
    no_init: bool,
}

fn parse_backend(s: &str) -> Result<HardwareBackend, String> {
    s.parse().map_err(|e: tjbot::TjBotError| e.to_string())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let mut config =
            TjBotConfig::load(self.config.as_deref()).context("failed to load configuration")?;
        if let Some(backend) = self.hardware {
            config = config.with_hardware_backend(backend);
        }
        if let Err(e) = config.validate() {
            warn!("{}", e);
        }

        let mut companion = Companion::with_cloud(config);
        if !self.no_init {
            print_report(&companion.initialize());
        }

        let transcript = Transcript::new();
        let result = repl(&mut companion, &transcript);

        let status = companion.shutdown();
        info!("Session {}", status);
        result
    }
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Say(String),
    Init,
    Shutdown,
    Status,
    Listen(Option<u32>),
    Perform(Action),
    SelfTest,
    History,
    Clear,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Input {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Input::Say(line.to_string());
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        match name {
            "init" => Input::Init,
            "shutdown" => Input::Shutdown,
            "status" => Input::Status,
            "listen" if rest.is_empty() => Input::Listen(None),
            "listen" => match rest.parse() {
                Ok(secs) => Input::Listen(Some(secs)),
                Err(_) => Input::Unknown(line.to_string()),
            },
            "wave" => Input::Perform(Action::Wave),
            "raise" => Input::Perform(Action::RaiseArm),
            "lower" => Input::Perform(Action::LowerArm),
            "dance" => Input::Perform(Action::Dance),
            "shine" if !rest.is_empty() => Input::Perform(Action::Shine(rest.to_string())),
            "say" if !rest.is_empty() => Input::Perform(Action::Speak(rest.to_string())),
            "selftest" => Input::SelfTest,
            "history" => Input::History,
            "clear" => Input::Clear,
            "help" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "\
Type a message to talk to TJBot, or a command:
  /init /shutdown /status /selftest
  /listen [secs]       record and send what you said
  /wave /raise /lower /dance
  /shine <color>       red green blue white yellow purple orange off
  /say <text>          speak without the assistant
  /history /clear /quit";

fn repl(companion: &mut Companion, transcript: &Transcript) -> anyhow::Result<()> {
    println!("{}", HELP);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line.context("failed to read input")?;

        match Input::parse(&line) {
            Input::Empty => {}
            Input::Say(text) => talk(companion, transcript, ChatTurn::user(text)),
            Input::Init => print_report(&companion.initialize()),
            Input::Shutdown => println!("Session {}", companion.shutdown()),
            Input::Status => println!("Session {}", companion.status()),
            Input::Listen(secs) => {
                let outcome = companion.listen(secs);
                match outcome.transcript {
                    Some(text) => {
                        println!("you said: {}", text);
                        talk(companion, transcript, ChatTurn::user(text).with_speech(true));
                    }
                    None if outcome.record.success => println!("(nothing heard)"),
                    None => println!("  [{}]", outcome.record),
                }
            }
            Input::Perform(action) => println!("{}", companion.perform(action)),
            Input::SelfTest => print_results(&companion.self_test()),
            Input::History => {
                for turn in transcript.get_all() {
                    println!("{}", turn);
                }
            }
            Input::Clear => {
                transcript.clear();
                companion.clear_context();
                println!("History cleared");
            }
            Input::Help => println!("{}", HELP),
            Input::Quit => return Ok(()),
            Input::Unknown(text) => println!("Unknown command: {} (try /help)", text),
        }
    }
}

fn talk(companion: &mut Companion, transcript: &Transcript, turn: ChatTurn) {
    let text = turn.text.clone();
    transcript.add(turn);
    match companion.dispatch(&text) {
        Ok(outcome) => show_outcome(transcript, &outcome),
        Err(e) => println!("! {}", e.user_message()),
    }
}

fn show_outcome(transcript: &Transcript, outcome: &TurnOutcome) {
    if let Some(turn) = outcome.agent_turn() {
        println!("tjbot: {}", turn.text);
        transcript.add(turn);
    }
    let record = &outcome.record;
    if record.action_taken != tjbot::dispatch::ActionKind::None || record.error_detail.is_some() {
        println!("  [{}]", record);
    }
}

fn print_report(report: &InitReport) {
    print_results(&report.components);
    println!("Session {}", report.status);
}

fn print_results(results: &[ComponentResult]) {
    for result in results {
        println!("  {:<11} {}", result.component, result.outcome);
    }
}
