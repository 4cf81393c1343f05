//! Tests for CLI parsing and defaults.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["packwright", "build"]);
    assert_eq!(cli.command, Command::Build);
    assert_eq!(cli.config, Utf8PathBuf::from("packwright.toml"));
    assert!(!cli.release);
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["packwright"]).is_err());
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::parse_from([
        "packwright",
        "assemble",
        "--config",
        "mods/embeddium/packwright.toml",
        "--release",
        "-vv",
    ]);
    assert_eq!(
        cli.config,
        Utf8PathBuf::from("mods/embeddium/packwright.toml")
    );
    assert!(cli.release);
    assert_eq!(cli.verbosity, 2);
}

#[test]
fn verbose_and_quiet_conflict() {
    let result = Cli::try_parse_from(["packwright", "-v", "-q", "build"]);
    assert!(result.is_err());
}

#[rstest]
#[case("assemble", Goal::Assemble)]
#[case("build", Goal::Build)]
#[case("publish", Goal::Publish)]
fn plan_takes_a_goal(#[case] name: &str, #[case] goal: Goal) {
    let cli = Cli::parse_from(["packwright", "plan", name]);
    assert_eq!(cli.command, Command::Plan { goal });
    assert_eq!(cli.command.goal(), None);
}

#[test]
fn plan_rejects_unknown_goal() {
    assert!(Cli::try_parse_from(["packwright", "plan", "deploy"]).is_err());
}

#[test]
fn publish_parses_dry_run_and_targets() {
    let cli = Cli::parse_from([
        "packwright",
        "publish",
        "--dry-run",
        "--target",
        "curseforge",
        "-t",
        "modrinth",
    ]);
    let args = cli.command.publish_args();
    assert!(args.dry_run);
    assert_eq!(args.targets, vec!["curseforge", "modrinth"]);
    assert_eq!(cli.command.goal(), Some(Goal::Publish));
}

#[rstest]
#[case("version", None)]
#[case("assemble", Some(Goal::Assemble))]
#[case("build", Some(Goal::Build))]
fn commands_map_to_goals(#[case] name: &str, #[case] goal: Option<Goal>) {
    let cli = Cli::parse_from(["packwright", name]);
    assert_eq!(cli.command.goal(), goal);
    assert_eq!(cli.command.publish_args(), PublishArgs::default());
}
