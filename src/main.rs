use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use rotofy::{
    args::Opt,
    config::Config,
    exif::ExifTool,
    pipeline::Pipeline,
    utils::LineConfirm,
    video::Ffmpeg,
    Result,
};
use tracing::{debug, error, Level};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let opt = Opt::parse();

    if let Some(shell) = opt.completions {
        generate(shell, &mut Opt::command(), "rotofy", &mut io::stdout());
        return;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if opt.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to set tracing subscriber");
    }

    if let Err(e) = run(opt) {
        error!("{e}");
        debug!("{e:?}");
        std::process::exit(e.exit_code());
    }
}

fn run(opt: Opt) -> Result<()> {
    let config = Config::from_opt(opt)?;
    let exiftool = config
        .exiftool
        .as_ref()
        .map_or_else(ExifTool::default, ExifTool::new);
    let ffmpeg = config
        .ffmpeg
        .as_ref()
        .map_or_else(Ffmpeg::default, Ffmpeg::new);
    let mut confirm = LineConfirm::stdin();

    Pipeline::new(&config, &exiftool, &ffmpeg, &mut confirm).run()?;
    Ok(())
}
