use crate::events::AppEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::MissedTickBehavior;

/// Render tick period, about 60 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Runs the recording replay, the render ticker and the config watcher on a
/// Tokio runtime in its own thread. Everything they produce arrives on `tx`.
pub fn start_background_services(tx: Sender<AppEvent>, recording: PathBuf) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::replay::run_replay(recording, tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_ticker(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}

async fn run_ticker(tx: Sender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).await.is_err() {
            break;
        }
    }
}
