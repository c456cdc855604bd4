use clap::Parser;
use log::info;
use disto_live::{init_logging, run, Args};
use disto_live::error::{error_msgbox, AppRunError};

fn main() -> Result<(), AppRunError> {
    let args = Args::parse();

    init_logging(&args);
    info!(concat!("DISTO Live ", env!("CARGO_PKG_VERSION")));

    match run(args) {
        Err(err) => {
            error_msgbox("Unexpected error", &err);
            Err(err)
        }
        Ok(_) => Ok(())
    }
}
