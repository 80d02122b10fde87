use clap::Parser;
use log::{error, info};
use snafu::ErrorCompat;

mod args;
mod tabulate;

fn main() {
    let args = args::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    info!("args: {:?}", args);

    let res = tabulate::run_election(&args.config, args.reference.clone(), args.out.clone());
    if let Err(e) = res {
        error!("{}", e);
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
