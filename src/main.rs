use clap::Parser;
use weather_extremes::cli::{run, Cli};
use weather_extremes::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
