use std::path::PathBuf;

use clap::Parser;
use genflow_cli::{Cli, Command};

#[test]
fn describe_defaults() {
    let cli = Cli::try_parse_from(["genflow", "describe"]).unwrap();
    let Command::Describe(args) = cli.command else {
        panic!("expected describe");
    };
    assert_eq!(args.path, PathBuf::from("wally.jpeg"));
    assert_eq!(args.model, "llava");
}

#[test]
fn describe_with_path_model_and_address() {
    let cli = Cli::try_parse_from([
        "genflow",
        "describe",
        "cat.png",
        "--model",
        "bakllava",
        "--ollama-address",
        "http://gpu-box:11434",
    ])
    .unwrap();
    assert_eq!(cli.ollama_address, "http://gpu-box:11434");
    let Command::Describe(args) = cli.command else {
        panic!("expected describe");
    };
    assert_eq!(args.path, PathBuf::from("cat.png"));
    assert_eq!(args.model, "bakllava");
}

#[test]
fn flow_input_is_optional() {
    let cli = Cli::try_parse_from(["genflow", "flow"]).unwrap();
    let Command::Flow(args) = cli.command else {
        panic!("expected flow");
    };
    assert_eq!(args.input, None);
    assert_eq!(args.gemini_model, "gemini-1.5-flash");

    let cli = Cli::try_parse_from(["genflow", "flow", "--input", "pumpkins"]).unwrap();
    let Command::Flow(args) = cli.command else {
        panic!("expected flow");
    };
    assert_eq!(args.input.as_deref(), Some("pumpkins"));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["genflow"]).is_err());
}
