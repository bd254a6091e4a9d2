use std::path::PathBuf;

use interpose_classfile::{ClassFile, dump};
use interpose_core::Colors;

use super::CliError;

pub struct DumpArgs {
    pub class_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) -> Result<String, CliError> {
    let bytes = std::fs::read(&args.class_path).map_err(|source| CliError::Read {
        path: args.class_path.clone(),
        source,
    })?;
    let class = ClassFile::parse(&bytes)?;
    Ok(dump(&class, Colors::new(args.color))?)
}
