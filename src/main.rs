use clap::Parser;
use miphy_tools::cli::{self, Commands};
use miphy_tools::clustering::Weights;
use miphy_tools::commands;
use miphy_tools::config::Config;
use miphy_tools::utils::verbose_from_env;
use miphy_tools::{ErrorCategory, MiphyError};

fn main() {
    let args = cli::Args::parse();
    let config = Config::load();
    let verbose = args.verbose || verbose_from_env();

    let result = match args.command {
        Commands::Cluster {
            input,
            inc_weight,
            dup_weight,
            loss_weight,
            spread_weight,
            results_file,
            only_species,
            json,
        } => {
            let defaults = config.weights();
            Weights::new(
                inc_weight.unwrap_or(defaults.incongruence),
                dup_weight.unwrap_or(defaults.duplication),
                loss_weight.unwrap_or(defaults.loss),
                spread_weight.unwrap_or(defaults.spread),
            )
            .map_err(anyhow::Error::from)
            .and_then(|weights| {
                commands::cluster::run(input, weights, results_file, only_species, json, &config, verbose)
            })
        }
        Commands::Sweep {
            input,
            weights,
            threads,
            json,
        } => commands::sweep::run(
            input,
            weights,
            threads.unwrap_or(config.threads),
            json,
            &config,
            verbose,
        ),
        Commands::Coords {
            tree,
            output,
            tree_format,
            max_dimensions,
        } => commands::coords::run(
            tree,
            output,
            tree_format,
            max_dimensions.unwrap_or(config.max_dimensions),
        ),
        Commands::Info {
            tree,
            prefix_size,
            output,
        } => commands::info::run(tree, prefix_size, output),
        Commands::Clean { tree, output } => commands::clean::run(tree, output),
        Commands::Midpoint { tree, output } => commands::midpoint::run(tree, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    let category = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<MiphyError>())
        .map(MiphyError::category);
    match category {
        Some(ErrorCategory::Validation) => 2,
        Some(ErrorCategory::Runtime) => 3,
        _ => 1,
    }
}
