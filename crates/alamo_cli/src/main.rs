#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "alamo", about = "Alamo .alo/.ala inspection tools")]
struct Cli {
	/// Log skipped chunks and other decoder detail to stderr.
	#[arg(long, short, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Summarize one model file.
	Info(cmd::info::Args),
	/// Summarize one animation file.
	Anim(cmd::anim::Args),
	/// List submodel and animation files that belong to a model.
	Submodels(cmd::submodels::Args),
	/// Decode a model with every submodel and animation.
	Import(cmd::import::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> alamo::format::Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Anim(args) => cmd::anim::run(args),
		Commands::Submodels(args) => cmd::submodels::run(args),
		Commands::Import(args) => cmd::import::run(args),
	}
}

/// `RUST_LOG` wins over the default level.
fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
