use anyhow::{anyhow, bail, Result};
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::config::{WheelConfig, DEFAULT_CONFIG_FILE};
use crate::entropy::{RngSource, SlotSource};
use crate::error::WheelError;
use crate::render;
use crate::session::Session;
use crate::spin::PendingSpin;

const FRAME_INTERVAL: Duration = Duration::from_millis(500);

const HELP: &str = "Commands:
  spin             spin the wheel
  reset            clear spin count, rotation and selection
  set <n>          predestined number for every 3rd spin
  status           show the wheel
  help             show this message
  quit             leave";

pub struct Data {
    pub config_path: PathBuf,
}

impl Data {
    fn from_env() -> Self {
        let config_path = env::var("WHEEL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self { config_path }
    }

    async fn save_config(&self, config: &WheelConfig) -> Result<()> {
        config.save(&self.config_path).await?;
        info!("saved wheel config to {}", self.config_path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Spin,
    Reset,
    SetPredestined(u32),
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let word = parts
            .next()
            .ok_or_else(|| anyhow!("empty command"))?
            .to_ascii_lowercase();
        let command = match word.as_str() {
            "spin" => Command::Spin,
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "set" | "predestined" => {
                let value = parts.next().ok_or_else(|| anyhow!("usage: set <number>"))?;
                let number = value
                    .parse()
                    .map_err(|_| anyhow!("'{}' is not a number", value))?;
                Command::SetPredestined(number)
            }
            other => bail!("unknown command '{}', try 'help'", other),
        };
        if parts.next().is_some() {
            bail!("too many arguments for '{}'", word);
        }
        Ok(command)
    }
}

/// Runs one command against the session. Returns the spin it started, if any.
async fn handle_command<S: SlotSource>(
    command: Command,
    session: &mut Session<S>,
    data: &Data,
) -> Result<Option<PendingSpin>> {
    match command {
        Command::Spin => return Ok(session.spin()),
        Command::Reset => match session.reset() {
            Ok(()) => println!("{}", render::status(session.state(), session.config())),
            Err(WheelError::Spinning) => println!("Wait for the wheel to stop before resetting."),
            Err(why) => return Err(why.into()),
        },
        Command::SetPredestined(number) => match session.set_predestined(number) {
            Ok(()) => {
                if let Err(why) = data.save_config(session.config()).await {
                    warn!("could not save wheel config: {:?}", why);
                }
                println!("Predestined number is now {}", number);
            }
            Err(why) => {
                warn!("rejected predestined number {}: {}", number, why);
                println!("{}", why);
            }
        },
        Command::Status => println!("{}", render::status(session.state(), session.config())),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(None)
}

pub async fn start() -> Result<()> {
    let data = Data::from_env();
    let config = WheelConfig::load(&data.config_path).await?;
    let source = match env::var("WHEEL_SEED") {
        Ok(seed) => RngSource::seeded(seed.parse()?),
        Err(_) => RngSource::from_entropy(),
    };
    info!(
        "wheel ready: {} slots, predestined {}",
        config.total_slots, config.predestined_number
    );

    let (mut session, mut completions) = Session::new(config, source)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut spin_started: Option<Instant> = None;

    println!("{}", HELP);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if handle_command(command, &mut session, &data).await?.is_some() {
                            println!("Spinning...");
                            spin_started = Some(Instant::now());
                        }
                    }
                    Err(why) => println!("{}", why),
                }
            }
            Some(done) = completions.recv() => {
                if let Some(number) = session.complete(&done) {
                    spin_started = None;
                    println!("{}", render::landed(number, session.state()));
                }
            }
            _ = ticker.tick(), if spin_started.is_some() => {
                if let (Some(pending), Some(started)) = (session.in_flight(), spin_started) {
                    println!("{}", render::spinning_frame(pending, started.elapsed(), session.config()));
                }
            }
        }
    }
    Ok(())
}
