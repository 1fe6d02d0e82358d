use anyhow::Result;
use clap::Parser;
use smellscope::cli::{Cli, Commands, GlobalArgs};
use smellscope::commands::{self, CommandContext};
use smellscope::observability::install_panic_hook;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();

    init_logging(cli.global.verbosity);
    apply_environment_setup(&cli.global);

    if let Commands::Init { force } = cli.command {
        return commands::init_config(&std::env::current_dir()?, force);
    }

    let context = CommandContext::from_args(&cli.global)?;
    match cli.command {
        Commands::Extract {
            repo,
            repo_list,
            checkouts,
            run_dir,
        } => commands::collect::extract(&context, repo, repo_list, checkouts, &run_dir),
        Commands::Prune { repo, execute } => commands::collect::prune(&context, &repo, execute),
        Commands::Clear { run_dir } => commands::collect::clear(&context, &run_dir),
        Commands::Analyze { path } => commands::analyze::analyze(&context, &path),
        Commands::Label { input } => commands::analyze::label(&context, &input),
        Commands::Dataset { input } => commands::dataset::dataset(&context, &input),
        Commands::Features { input, pipeline } => {
            commands::dataset::features(&context, &input, &pipeline)
        }
        Commands::Train { input } => commands::train::train(&context, &input),
        Commands::Evaluate { input, folds } => commands::train::evaluate(&context, &input, folds),
        Commands::Predict { path, model } => commands::predict::predict(&context, &path, &model),
        Commands::Report { path } => commands::report::report(&context, &path),
        Commands::Run {
            repo,
            work_dir,
            extract,
            no_train,
        } => commands::run::run(&context, &repo, &work_dir, extract, !no_train),
        Commands::Init { .. } => Ok(()),
    }
}

// -v info, -vv debug, -vvv trace; RUST_LOG wins when set
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

// Side effects from global flags: colors and the worker pool
fn apply_environment_setup(args: &GlobalArgs) {
    if args.plain {
        colored::control::set_override(false);
    }
    let jobs = if args.no_parallel {
        1
    } else {
        get_worker_count(args.jobs)
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .ok(); // Ignore if already configured
}

fn get_worker_count(jobs: usize) -> usize {
    if jobs == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    } else {
        jobs
    }
}
