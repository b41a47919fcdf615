// tests/cli_args.rs

use clap::Parser;

use assetpipe::cli::{CliArgs, Command};
use assetpipe::engine::TaskKind;
use assetpipe::logging::parse_level_str;

#[test]
fn composite_commands_run_every_task() {
    let args = CliArgs::try_parse_from(["assetpipe", "dev"]).unwrap();
    assert_eq!(args.command, Command::Dev);
    assert_eq!(args.command.tasks(), TaskKind::ALL.to_vec());
    assert!(args.command.watches());

    let build = CliArgs::try_parse_from(["assetpipe", "build"]).unwrap();
    assert_eq!(build.command.tasks().len(), 5);
    assert!(!build.command.watches());
}

#[test]
fn single_task_commands_map_to_their_task() {
    let cases = [
        ("css", TaskKind::Css),
        ("js", TaskKind::Js),
        ("images", TaskKind::Images),
        ("webp", TaskKind::Webp),
        ("avif", TaskKind::Avif),
    ];
    for (name, task) in cases {
        let args = CliArgs::try_parse_from(["assetpipe", name]).unwrap();
        assert_eq!(args.command.tasks(), vec![task], "{name}");
        assert!(!args.command.watches());
    }
}

#[test]
fn global_flags_follow_the_subcommand() {
    let args = CliArgs::try_parse_from([
        "assetpipe",
        "css",
        "--config",
        "site/Assetpipe.toml",
        "--log-level",
        "debug",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(args.config.as_deref(), Some("site/Assetpipe.toml"));
    assert!(args.dry_run);
    assert!(args.log_level.is_some());
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(CliArgs::try_parse_from(["assetpipe", "serve"]).is_err());
}

#[test]
fn log_levels_parse_from_env_strings() {
    assert_eq!(parse_level_str(" Debug "), Some(tracing::Level::DEBUG));
    assert_eq!(parse_level_str("warning"), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("loud"), None);
}
