//! Command-line interface: replay and diagnostics over recorded landmark
//! streams. No camera and no UI; input is JSON Lines, one frame per line.

use crate::config::ConfigState;
use crate::hand::{HandFrame, SUPPORTED_LETTERS};
use crate::matcher::{self, SampleStore};
use crate::pipeline::Session;
use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

const HELP: &str = "\
fingerspell - fingerspelled-letter classification over hand landmarks

USAGE:
  fingerspell <COMMAND> [OPTIONS]

COMMANDS:
  run <frames.jsonl>    Replay a recorded landmark stream and print the
                        stabilized letters. Each line is a JSON array of 21
                        [x, y] pairs, or null for a frame with no hand.
  train <samples.json>  Train the template matcher from a sample store and
                        report the covered letters.
  letters               List the supported letters.
  profiles              List threshold profiles and mark the active one.
  use <name>            Switch the active threshold profile.
  help                  Show this help.

OPTIONS:
  -p, --profile <name>  Use a specific profile for this run only.
";

pub fn run() -> Result<()> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let cmd = match args.subcommand()? {
        Some(c) => c,
        None => {
            print!("{HELP}");
            return Ok(());
        }
    };

    match cmd.as_str() {
        "run" => {
            let profile_override: Option<String> = args.opt_value_from_str(["-p", "--profile"])?;
            let path: PathBuf = args.free_from_str().context("missing <frames.jsonl>")?;
            cmd_run(path, profile_override)
        }
        "train" => {
            let path: PathBuf = args.free_from_str().context("missing <samples.json>")?;
            cmd_train(path)
        }
        "letters" => {
            cmd_letters();
            Ok(())
        }
        "profiles" => cmd_profiles(),
        "use" => {
            let name: String = args.free_from_str().context("missing profile name")?;
            cmd_use(&name)
        }
        "help" => {
            print!("{HELP}");
            Ok(())
        }
        other => bail!("unknown command: {other} (try `fingerspell help`)"),
    }
}

fn load_profile(profile_override: Option<String>) -> Result<crate::config::Profile> {
    match profile_override {
        Some(name) => ConfigState::load_profile(&name)
            .with_context(|| format!("failed to load profile {name}")),
        None => Ok(ConfigState::load_or_install_default()?.profile),
    }
}

fn cmd_run(path: PathBuf, profile_override: Option<String>) -> Result<()> {
    let profile = load_profile(profile_override)?;
    let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut session = Session::new(profile);
    let mut last_letter = None;
    let mut emitted = String::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let points: Option<Vec<(f32, f32)>> = serde_json::from_str(&line)
            .with_context(|| format!("bad frame on line {}", lineno + 1))?;
        let frame = points.as_deref().and_then(HandFrame::from_points);
        if points.is_some() && frame.is_none() {
            warn!("line {}: not a 21-point frame, treating as no hand", lineno + 1);
        }

        let out = session.process(frame);
        if out.stable.letter != last_letter {
            last_letter = out.stable.letter;
            if let Some(letter) = out.stable.letter {
                println!("frame {:>5}  {}", lineno + 1, out.stable);
                emitted.push(letter.as_char());
            }
        }
    }

    if emitted.is_empty() {
        info!("no stable letters recognized");
    } else {
        println!("letters: {emitted}");
    }
    Ok(())
}

fn cmd_train(path: PathBuf) -> Result<()> {
    let profile = ConfigState::load_or_install_default()?.profile;
    let store = SampleStore::load(&path)?;
    let model = matcher::train(&store, &profile.fingers)
        .with_context(|| format!("cannot train from {}", path.display()))?;

    let mut letters: Vec<char> = model.letters().map(|l| l.as_char()).collect();
    letters.sort_unstable();
    println!(
        "trained {} letters from {} samples: {}",
        letters.len(),
        store.len(),
        letters.iter().collect::<String>()
    );
    Ok(())
}

fn cmd_letters() {
    let chars: String = SUPPORTED_LETTERS.iter().map(|l| l.as_char()).collect();
    println!("{chars}");
    println!("(J and Z require motion and are not supported)");
}

fn cmd_profiles() -> Result<()> {
    let state = ConfigState::load_or_install_default()?;
    for name in state.list_profiles() {
        let marker = if name == state.active_name { "*" } else { " " };
        println!("{marker} {name}");
    }
    Ok(())
}

fn cmd_use(name: &str) -> Result<()> {
    let mut state = ConfigState::load_or_install_default()?;
    state.set_active(name)?;
    println!("active profile: {name}");
    Ok(())
}
