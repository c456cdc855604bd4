use std::path::PathBuf;
use clap::Parser;
use crate::gui::application::run_application;
use crate::error::AppRunError;

pub mod device;
pub mod gui;
pub mod error;

#[derive(Debug, Parser)]
#[command(name = "disto-live", version, about = "Live distance readout for Leica DISTO laser distance meters")]
pub struct Args {
    /// Also write the log to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level instead of info.
    #[arg(long)]
    pub verbose: bool,
}

pub fn init_logging(args: &Args) {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .chain(std::io::stderr());

    if let Some(log_file) = &args.log_file {
        dispatch = dispatch.chain(
            fern::log_file(log_file).expect("Failed to open log file")
        );
    }

    dispatch.apply().expect("Failed to initialize logger");
}

pub fn run(_args: Args) -> Result<(), AppRunError> {
    run_application()?;
    Ok(())
}
