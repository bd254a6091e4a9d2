use std::path::PathBuf;

use interpose::config::{DEFAULT_PACKAGE, DEFAULT_PREFIX};
use interpose::{Placement, validate};
use interpose_core::{JType, names};
use interpose_gen::{ArtifactSpec, GenerationContext, generate};

use super::CliError;
use super::surface_loader::load_surface;

pub struct GenerateArgs {
    pub surface_path: PathBuf,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
    pub ctor_args: Vec<String>,
}

pub fn run(args: GenerateArgs) -> Result<String, CliError> {
    let surface = load_surface(&args.surface_path)?;
    let ctor_args = parse_types(&args.ctor_args)?;
    let placement = validate(&surface, &ctor_args)?;
    let name = args.name.unwrap_or_else(|| default_name(&placement));

    let spec = ArtifactSpec::new(name, &surface)
        .access(placement.access)
        .base_constructor(ctor_args);
    let artifact = generate(&spec, &GenerationContext::default())?;

    let path = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("{}.class", names::simple_name(&artifact.name)))
    });
    std::fs::write(&path, &artifact.bytes).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(name = %artifact.name, path = %path.display(), "class file written");

    Ok(format!(
        "{}: {} members, {} bytes -> {}\n",
        artifact.name,
        artifact.members.len(),
        artifact.bytes.len(),
        path.display()
    ))
}

fn parse_types(texts: &[String]) -> Result<Vec<JType>, CliError> {
    texts
        .iter()
        .map(|text| {
            text.parse::<JType>().map_err(|source| CliError::CtorArg {
                text: text.clone(),
                source,
            })
        })
        .collect()
}

fn default_name(placement: &Placement) -> String {
    let package = placement.package.as_deref().unwrap_or(DEFAULT_PACKAGE);
    names::qualify(package, &format!("{DEFAULT_PREFIX}0"))
}
