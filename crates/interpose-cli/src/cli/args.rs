//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Capability surface JSON file (positional, `-` for stdin).
pub fn surface_path_arg() -> Arg {
    Arg::new("surface_path")
        .value_name("SURFACE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Capability surface as a JSON array of contracts ('-' for stdin)")
}

/// Class file to disassemble (positional).
pub fn class_path_arg() -> Arg {
    Arg::new("class_path")
        .value_name("CLASS")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Class file to disassemble")
}

/// Binary name of the generated class (--name).
pub fn name_arg() -> Arg {
    Arg::new("name")
        .short('n')
        .long("name")
        .value_name("NAME")
        .help("Binary class name (default: <package>.$Proxy0)")
}

/// Output file (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Output class file (default: <Simple>.class)")
}

/// Base constructor parameter type, repeatable (--ctor-arg).
pub fn ctor_arg() -> Arg {
    Arg::new("ctor_arg")
        .long("ctor-arg")
        .value_name("TYPE")
        .action(ArgAction::Append)
        .help("Base constructor parameter type, in order (e.g. java.lang.String, long)")
}

/// JSON output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the plan as JSON")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity (-v, repeatable).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Verbosity level (-v info, -vv debug, -vvv trace); overrides INTERPOSE_LOG")
}
