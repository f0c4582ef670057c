use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = tui_wormhole::config::Config::parse();
    let settings = cfg.settings()?;
    tui_wormhole::logging::init_file(cfg.log_file.as_deref())?;
    tui_wormhole::app::run(cfg, settings)
}
