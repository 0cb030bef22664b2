//! Scripted island runs on a virtual clock.
//!
//! A script is a TOML list of timed actions:
//!
//! ```toml
//! [[step]]
//! at_ms = 0
//! action = "switch"
//! id = "wifi"
//! label = "WiFi"
//! state = true
//!
//! [[step]]
//! at_ms = 200
//! action = "progress"
//! id = "download"
//! title = "Downloading"
//! progress = 0.4
//! ```
//!
//! Every published event is printed as one JSON line; a final `Summary`
//! line carries manager and reconciler counters.

use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use capsule_core::{Config, EventLog, IconRef, Island, ManualClock, ProgressUpdate};

#[derive(Args)]
pub struct SimulateArgs {
    /// TOML script of timed actions (built-in demo when omitted)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Config file to take display settings and timings from (defaults otherwise)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop the clock here (default: 3000 ms after the last step)
    #[arg(long)]
    until: Option<u64>,
    /// Host frame interval in milliseconds
    #[arg(long, default_value_t = 16)]
    tick: u64,
    /// Also print a rendered frame every N milliseconds
    #[arg(long)]
    frames: Option<u64>,
    /// Override the display scale
    #[arg(long)]
    scale: Option<f32>,
    /// Override the user label
    #[arg(long)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    at_ms: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action {
    Switch {
        id: String,
        label: String,
        state: bool,
    },
    Progress {
        id: String,
        title: String,
        subtitle: Option<String>,
        icon: Option<String>,
        progress: Option<f32>,
        duration_ms: Option<u64>,
    },
    Remove {
        id: String,
    },
    HideAll,
    Config {
        scale: f32,
        label: String,
    },
    Show,
    Hide,
}

const DEMO: &str = r#"
[[step]]
at_ms = 0
action = "switch"
id = "wifi"
label = "WiFi"
state = true

[[step]]
at_ms = 3000
action = "progress"
id = "download"
title = "Downloading"
subtitle = "update.bin"
icon = "download"
progress = 0.25

[[step]]
at_ms = 3500
action = "progress"
id = "download"
title = "Downloading"
subtitle = "update.bin"
progress = 0.75

[[step]]
at_ms = 3600
action = "switch"
id = "bluetooth"
label = "Bluetooth"
state = false

[[step]]
at_ms = 4000
action = "config"
scale = 1.0
label = "Ada"
"#;

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEMO.to_string(),
    };
    let mut script: Script = toml::from_str(&source)?;
    script.steps.sort_by_key(|step| step.at_ms);

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };
    if let Some(scale) = args.scale {
        config.island.scale = f64::from(scale);
    }
    if let Some(label) = args.label.clone() {
        config.island.label = label;
    }

    let clock = ManualClock::new(0);
    let mut island = Island::from_config_with_clock(&config, Rc::new(clock.clone()));
    island.show();
    let log = EventLog::new();
    island.add_listener(log.clone());

    let last_step = script.steps.last().map_or(0, |step| step.at_ms);
    let end = args.until.unwrap_or(last_step + 3000);
    let tick = args.tick.max(1);
    let mut pending = script.steps.into_iter().peekable();
    let mut now = 0;
    let mut next_frame = 0;

    loop {
        clock.set(now);
        island.tick();
        while let Some(step) = pending.next_if(|step| step.at_ms <= now) {
            apply(&mut island, &log, step.at_ms, step.action);
        }
        island.report_frame();
        let frame = island.tick();
        flush(&log)?;

        if let (Some(every), Some(frame)) = (args.frames, frame) {
            if now >= next_frame {
                println!("{}", json!({ "type": "Frame", "frame": frame }));
                next_frame = now + every.max(1);
            }
        }

        if now >= end {
            break;
        }
        let mut next = now + tick;
        if let Some(step) = pending.peek() {
            next = next.min(step.at_ms.max(now + 1));
        }
        now = next.min(end);
    }

    let reconcile = island.view().map(|view| view.reconciler().stats());
    let resizes = island.view().map(|view| view.morph().resizes());
    println!(
        "{}",
        json!({
            "type": "Summary",
            "at_ms": now,
            "showing": island.is_showing(),
            "expanded": island.is_expanded(),
            "stats": island.stats(),
            "reconcile": reconcile,
            "resizes": resizes,
        })
    );
    Ok(())
}

fn apply(island: &mut Island, log: &EventLog, at_ms: u64, action: Action) {
    debug!(at_ms, ?action, "applying script step");
    match action {
        Action::Switch { id, label, state } => island.upsert_switch(&id, &label, state),
        Action::Progress {
            id,
            title,
            subtitle,
            icon,
            progress,
            duration_ms,
        } => {
            let update = ProgressUpdate {
                title,
                subtitle,
                icon: icon.map(IconRef::new),
                progress,
                duration_ms,
            };
            island.upsert_progress(&id, update);
        }
        Action::Remove { id } => island.remove_task(&id),
        Action::HideAll => island.hide_all(),
        Action::Config { scale, label } => island.update_display_config(scale, label),
        Action::Show => {
            if !island.is_showing() {
                island.show();
                island.add_listener(log.clone());
            }
        }
        Action::Hide => island.hide(),
    }
}

fn flush(log: &EventLog) -> Result<(), serde_json::Error> {
    for event in log.take() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
