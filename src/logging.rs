use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

pub fn init(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}
