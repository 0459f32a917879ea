use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    modplay::app_core::ModPlay::new().run(paths)?;
    Ok(())
}
