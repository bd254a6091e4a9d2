//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("interpose")
        .about("Runtime JVM interception proxy generator")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(plan_command())
        .subcommand(generate_command())
        .subcommand(dump_command())
}

/// Show the member plan of a surface.
pub fn plan_command() -> Command {
    Command::new("plan")
        .about("Show the member plan and dispatch ids of a capability surface")
        .after_help(
            r#"EXAMPLES:
  interpose plan surface.json          # table of members
  interpose plan surface.json --json   # machine-readable plan"#,
        )
        .arg(surface_path_arg())
        .arg(json_arg())
        .arg(color_arg())
}

/// Generate a class file for a surface.
pub fn generate_command() -> Command {
    Command::new("generate")
        .about("Generate the proxy class file for a capability surface")
        .after_help(
            r#"EXAMPLES:
  interpose generate surface.json
  interpose generate surface.json -n com.acme.GreeterProxy -o GreeterProxy.class
  interpose generate base.json --ctor-arg java.lang.String --ctor-arg long"#,
        )
        .arg(surface_path_arg())
        .arg(name_arg())
        .arg(output_arg())
        .arg(ctor_arg())
}

/// Disassemble a class file.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Disassemble a class file")
        .after_help(
            r#"EXAMPLES:
  interpose dump '$Proxy0.class'
  interpose dump Foo.class --color never"#,
        )
        .arg(class_path_arg())
        .arg(color_arg())
}
