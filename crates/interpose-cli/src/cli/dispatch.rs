//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::dump::DumpArgs;
use crate::commands::generate::GenerateArgs;
use crate::commands::plan::PlanArgs;

pub struct PlanParams {
    pub surface_path: PathBuf,
    pub json: bool,
    pub color: ColorChoice,
}

impl PlanParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            surface_path: surface_path(m),
            json: m.get_flag("json"),
            color: parse_color(m),
        }
    }
}

impl From<PlanParams> for PlanArgs {
    fn from(p: PlanParams) -> Self {
        Self {
            surface_path: p.surface_path,
            json: p.json,
            color: p.color.should_colorize(),
        }
    }
}

pub struct GenerateParams {
    pub surface_path: PathBuf,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
    pub ctor_args: Vec<String>,
}

impl GenerateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            surface_path: surface_path(m),
            name: m.get_one::<String>("name").cloned(),
            output: m.get_one::<PathBuf>("output").cloned(),
            ctor_args: m
                .get_many::<String>("ctor_arg")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

impl From<GenerateParams> for GenerateArgs {
    fn from(p: GenerateParams) -> Self {
        Self {
            surface_path: p.surface_path,
            name: p.name,
            output: p.output,
            ctor_args: p.ctor_args,
        }
    }
}

pub struct DumpParams {
    pub class_path: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            class_path: m.get_one::<PathBuf>("class_path").cloned().unwrap_or_default(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            class_path: p.class_path,
            color: p.color.should_colorize(),
        }
    }
}

fn surface_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("surface_path").cloned().unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
