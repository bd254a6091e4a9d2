mod cli;
mod commands;
mod logging;

use cli::{DumpParams, GenerateParams, PlanParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();
    logging::init(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("plan", m)) => commands::plan::run(PlanParams::from_matches(m).into()),
        Some(("generate", m)) => commands::generate::run(GenerateParams::from_matches(m).into()),
        Some(("dump", m)) => commands::dump::run(DumpParams::from_matches(m).into()),
        _ => unreachable!("clap should have caught this"),
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
