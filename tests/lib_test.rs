//! Library integration tests.

use shell_step::ShellStepError;

#[test]
fn error_types_are_public() {
    let err = ShellStepError::MissingConfig {
        key: "shell-script".into(),
    };
    assert!(err.to_string().contains("shell-script"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> shell_step::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use shell_step::cli::{Cli, Commands};

    let cli = Cli::parse_from(["shell-step", "config", "--json"]);

    if let Commands::Config(args) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Config command");
    }
}
