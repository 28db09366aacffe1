use anyhow::Context;
use env_logger::Env;

use mmtable::{get_cli_arguments, run, set_up};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let m = get_cli_arguments();

    let setup = set_up(&m)?;

    run(setup).context("failed writing results")?;

    Ok(())
}
