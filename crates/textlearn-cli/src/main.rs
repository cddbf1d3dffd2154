use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

use textlearn::config::ClassifierConfig;
use textlearn::learner::DEFAULT_CLASSIFIER_FILE;
use textlearn_cli::experiment::config::{load_run_config, RunConfig};
use textlearn_cli::experiment::runner::{run_classify, run_cross_validate, run_eval, run_train};

fn config_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .help("Path to the run configuration file (JSON)")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("dataset")
                .short('d')
                .long("dataset")
                .help("Path to the dataset. Overrides the dataset in the configuration file.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("classifier")
                .short('c')
                .long("classifier")
                .help("Override the classifier type from the JSON config.")
                .value_parser(["naive_bayes", "majority"])
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("output_file")
                .short('o')
                .long("output")
                .help("File the trained classifier is written to. Overrides the config.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("state_file")
                .long("state")
                .help("Also write the full learner state (JSON) to this file.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("log_errors")
                .long("log-errors")
                .help("Log every misclassified test sample.")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TEXTLEARN_LOG", "error,textlearn=info"))
        .init();

    let matches = Command::new("textlearn")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("Train, evaluate and cross-validate text classifiers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(config_args(
            Command::new("train").about("Train a classifier on the training split and save it"),
        ))
        .subcommand(config_args(
            Command::new("eval")
                .about("Train on the training split and report statistics on the test split"),
        ))
        .subcommand(
            config_args(
                Command::new("cross-validate")
                    .about("Run k-fold cross-validation and report micro/macro statistics"),
            )
            .arg(
                Arg::new("folds")
                    .short('k')
                    .long("folds")
                    .help("Number of folds. Overrides the config.")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("verbose_level")
                    .short('v')
                    .long("verbose-level")
                    .help("0 = silent, 1 = one line per fold, 2 = per-fold counts")
                    .value_parser(clap::value_parser!(u8)),
            )
            .arg(
                Arg::new("parallel")
                    .long("parallel")
                    .help("Train folds concurrently.")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify text with a saved classifier")
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the saved classifier")
                        .default_value(DEFAULT_CLASSIFIER_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("inputs")
                        .help("Text to classify, one label is printed per input")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("classify", sub_m)) => handle_classify(sub_m),
        Some((name, sub_m)) => handle_experiment(name, sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

/// Build the run configuration from the config file (if any) and the
/// command-line overrides. Returns `None` after printing a template when no
/// config file is given.
fn resolve_config(matches: &ArgMatches) -> Result<Option<RunConfig>> {
    let Some(config_path) = matches.get_one::<PathBuf>("config") else {
        eprintln!("[textlearn] No config file provided; printing a template configuration.");
        println!("{}", serde_json::to_string_pretty(&RunConfig::default())?);
        return Ok(None);
    };
    log::info!("[textlearn] Using config: {:?}", config_path);
    let mut config = load_run_config(config_path)?;

    if let Some(dataset) = matches.get_one::<PathBuf>("dataset") {
        config.dataset = dataset.clone();
    }
    if let Some(classifier) = matches.get_one::<String>("classifier") {
        config.learner.classifier =
            ClassifierConfig::from_str(classifier).map_err(anyhow::Error::msg)?;
    }
    if let Some(output) = matches.get_one::<PathBuf>("output_file") {
        config.model_path = output.clone();
    }
    if let Some(state) = matches.get_one::<PathBuf>("state_file") {
        config.state_path = Some(state.clone());
    }
    if matches.get_flag("log_errors") {
        config.log_errors = true;
    }
    Ok(Some(config))
}

fn handle_experiment(name: &str, matches: &ArgMatches) -> Result<()> {
    let Some(mut config) = resolve_config(matches)? else {
        return Ok(());
    };

    match name {
        "train" => {
            run_train(&config)?;
            eprintln!(
                "[textlearn] Saved classifier to {}",
                config.model_path.display()
            );
        }
        "eval" => {
            let stats = run_eval(&config)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "cross-validate" => {
            if let Some(&folds) = matches.get_one::<usize>("folds") {
                config.num_folds = folds;
            }
            if let Some(&level) = matches.get_one::<u8>("verbose_level") {
                config.verbose_level = level;
            }
            if matches.get_flag("parallel") {
                config.learner.parallel_folds = true;
            }
            let summary = run_cross_validate(&config)?;
            eprintln!(
                "[textlearn] {} folds: micro F1 {:.4}, macro F1 {:.4}",
                summary.num_folds, summary.micro_avg.f1, summary.macro_avg.f1
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn handle_classify(matches: &ArgMatches) -> Result<()> {
    let model_path: &PathBuf = matches
        .get_one("model_path")
        .ok_or_else(|| anyhow::anyhow!("Missing --model"))?;
    let inputs: Vec<String> = matches
        .get_many::<String>("inputs")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    for label in run_classify(model_path, &inputs)? {
        println!("{}", label);
    }
    Ok(())
}
