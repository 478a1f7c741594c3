use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorSelection {
    Ip,
    Domain,
    AccountUsage,
    All,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub selection: CollectorSelection,
    pub past_due: bool,
}

enum ParseOutcome {
    Args(CliArgs),
    Help,
}

fn usage() {
    eprintln!(
        "usage:
  scout-ingest [--config <path>] [--past-due] [ip|domain|account-usage|all]
"
    );
}

fn parse_args_impl(mut args: impl Iterator<Item = String>) -> Result<ParseOutcome, String> {
    let mut config_path: Option<PathBuf> = None;
    let mut selection = CollectorSelection::All;
    let mut past_due = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--past-due" => {
                past_due = true;
            }
            "ip" => selection = CollectorSelection::Ip,
            "domain" => selection = CollectorSelection::Domain,
            "account-usage" => selection = CollectorSelection::AccountUsage,
            "all" => selection = CollectorSelection::All,
            "-h" | "--help" | "help" => {
                return Ok(ParseOutcome::Help);
            }
            other => {
                return Err(format!("unknown argument: {other}"));
            }
        }
    }

    Ok(ParseOutcome::Args(CliArgs {
        config_path: scout_config::resolve_config_path(config_path),
        selection,
        past_due,
    }))
}

pub fn parse_args() -> CliArgs {
    match parse_args_impl(std::env::args().skip(1)) {
        Ok(ParseOutcome::Args(args)) => args,
        Ok(ParseOutcome::Help) => {
            usage();
            std::process::exit(0);
        }
        Err(error) => {
            eprintln!("error: {error}");
            usage();
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_args_impl, CollectorSelection, ParseOutcome};
    use std::path::PathBuf;

    #[test]
    fn parse_args_rejects_config_without_value() {
        let result = parse_args_impl(vec!["--config".to_string()].into_iter());
        assert!(matches!(
            result,
            Err(error) if error == "--config requires a value"
        ));
    }

    #[test]
    fn parse_args_accepts_config_with_value() {
        let result =
            parse_args_impl(vec!["--config".to_string(), "custom.toml".to_string()].into_iter());

        let ParseOutcome::Args(args) = result.expect("parse success") else {
            panic!("expected parsed args");
        };

        assert_eq!(args.config_path, PathBuf::from("custom.toml"));
        assert_eq!(args.selection, CollectorSelection::All);
        assert!(!args.past_due);
    }

    #[test]
    fn parse_args_selects_a_single_collector() {
        let result = parse_args_impl(vec!["domain".to_string()].into_iter());

        let ParseOutcome::Args(args) = result.expect("parse success") else {
            panic!("expected parsed args");
        };

        assert_eq!(args.selection, CollectorSelection::Domain);
    }

    #[test]
    fn parse_args_accepts_past_due_flag() {
        let result =
            parse_args_impl(vec!["--past-due".to_string(), "account-usage".to_string()].into_iter());

        let ParseOutcome::Args(args) = result.expect("parse success") else {
            panic!("expected parsed args");
        };

        assert!(args.past_due);
        assert_eq!(args.selection, CollectorSelection::AccountUsage);
    }

    #[test]
    fn parse_args_rejects_unknown_arguments() {
        let result = parse_args_impl(vec!["frobnicate".to_string()].into_iter());
        assert!(matches!(
            result,
            Err(error) if error == "unknown argument: frobnicate"
        ));
    }
}
