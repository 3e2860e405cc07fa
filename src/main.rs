use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod dash;

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }

    let res = match args.command {
        Command::Transform {
            input,
            framework,
            out_dir,
        } => dash::run_transform(input, framework, out_dir).map(|_| ()),
        Command::Inspect { input, out } => dash::inspect::run_inspect(input, out),
        Command::Serve { dir, port } => dash::server::run_serve(dir, port),
        Command::Check { input, reference } => dash::run_check(input, reference),
    };

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
