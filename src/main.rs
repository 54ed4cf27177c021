use std::env::args;
use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), String> {
    // RUST_LOG=semaphore_ladder=trace shows the hand-offs
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    args()
        .nth(1)
        .ok_or(format!(
            "no demo supplied, use one of {} or see unit tests",
            Demo::iter()
                .map(|d| d.to_string())
                .collect::<Vec<String>>()
                .join(",")
        ))
        .and_then(|selector| {
            Demo::from_str(&selector)
                .map(|demo| match demo {
                    Demo::Semaphore => semaphore_ladder::semaphore::run(),
                    Demo::Mutex => semaphore_ladder::mutex::run(),
                    Demo::Lightswitch => semaphore_ladder::lightswitch::run(),
                    Demo::Rwmutex => semaphore_ladder::rwmutex::run(),
                    Demo::Barrier => semaphore_ladder::barrier::run(),
                    Demo::Dancers => semaphore_ladder::barrier::run_dancers(),
                })
                .map_err(|e| format!("{selector}: {e}"))
        })
}

#[derive(EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
enum Demo {
    Semaphore,
    Mutex,
    Lightswitch,
    Rwmutex,
    Barrier,
    Dancers,
}
