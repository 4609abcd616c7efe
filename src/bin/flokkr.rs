use clap::Parser;
use flokkr::commands::{CommandArgs, FlokkrArgs, FlokkrCommand};
use flokkr_process_management::logging::Logger;
use log::LevelFilter;

fn main() {
    let args = FlokkrArgs::parse();

    if let Err(e) = Logger::new()
        .filter_level(args.verbosity.log_level_filter())
        .filter_modules([("hyper_util", LevelFilter::Info), ("reqwest", LevelFilter::Info)])
        .log_out_dir(args.log_out.clone())
        .init()
    {
        eprintln!("{e:?}");
    }

    log::trace!("Parsed arguments: {args:#?}");

    match args.command {
        CommandArgs::Build(mut command) => command.run(),
        CommandArgs::Deploy(mut command) => command.run(),
        CommandArgs::Tags(mut command) => command.run(),
    }
}
