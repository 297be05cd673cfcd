use std::path::{Path, PathBuf};
use std::time::Duration;

use choreboard_core::{
    CelebrationDriver, CelebrationItem, CelebrationPresenter, CelebrationState,
    CelebrationTimings, Config, Event,
};
use clap::Subcommand;
use tracing::{debug, info, warn};

#[derive(Subcommand)]
pub enum CelebrateAction {
    /// Play celebrations from a JSON file, printing each event as a JSON line
    Play {
        /// JSON array of celebration items
        file: PathBuf,
        /// Dismiss the current celebration every N ms, as if the user tapped it
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        tap_after_ms: Option<u64>,
    },
    /// Validate a JSON file of celebration items without playing it
    Check {
        /// JSON array of celebration items
        file: PathBuf,
    },
}

/// Prints events to stdout and logs what would be on screen.
struct JsonLinesPresenter;

impl CelebrationPresenter for JsonLinesPresenter {
    fn present(&mut self, state: Option<&CelebrationState>) {
        match state {
            Some(s) => info!(
                token = %s.token,
                kind = %s.item.kind(),
                title = s.item.title(),
                visible = s.visible,
                "presenting celebration"
            ),
            None => debug!("celebration slot empty"),
        }
    }

    fn on_event(&mut self, event: &Event) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(event = event.name(), error = %e, "failed to encode event"),
        }
    }
}

fn read_items(path: &Path) -> Result<Vec<CelebrationItem>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let items: Vec<CelebrationItem> = serde_json::from_str(&content)?;
    Ok(items)
}

pub fn run(action: CelebrateAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CelebrateAction::Play { file, tap_after_ms } => {
            let items = read_items(&file)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(play(
                items,
                config.celebration_timings(),
                tap_after_ms.map(Duration::from_millis),
            ))
        }
        CelebrateAction::Check { file } => {
            let items = read_items(&file)?;
            let mut invalid = 0usize;
            for (index, item) in items.iter().enumerate() {
                let report = match item.validate() {
                    Ok(()) => serde_json::json!({
                        "index": index,
                        "kind": item.kind(),
                        "ok": true,
                    }),
                    Err(e) => {
                        invalid += 1;
                        serde_json::json!({
                            "index": index,
                            "kind": item.kind(),
                            "ok": false,
                            "error": e.to_string(),
                        })
                    }
                };
                println!("{report}");
            }
            if invalid > 0 {
                return Err(format!("{invalid} of {} items are invalid", items.len()).into());
            }
            Ok(())
        }
    }
}

async fn play(
    items: Vec<CelebrationItem>,
    timings: CelebrationTimings,
    tap_after: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, join) = CelebrationDriver::spawn(timings, JsonLinesPresenter);
    let total = items.len();
    for item in items {
        handle.enqueue(item)?;
    }
    info!(total, "celebrations queued");

    match tap_after {
        None => handle.wait_idle().await?,
        Some(period) => {
            let mut taps = tokio::time::interval(period);
            taps.tick().await;
            let idle = handle.wait_idle();
            tokio::pin!(idle);
            loop {
                tokio::select! {
                    result = &mut idle => {
                        result?;
                        break;
                    }
                    _ = taps.tick() => handle.complete_current()?,
                }
            }
        }
    }

    drop(handle);
    join.await?;
    Ok(())
}
