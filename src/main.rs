use std::process::ExitCode;

use liblipsync::{cli::Args, logger, metadata};
use log::debug;

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    logger::init(args.level_filter());
    debug!("{:?}", metadata());

    let stdout = std::io::stdout();
    match args.run(&mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
