//! Interactive menu, shown when no subcommand is given

use anyhow::{Context, Result};
use console::style;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::{extract, require_jar, single, ExtractMode};
use crate::config::HarvestConfig;
use crate::error::HarvestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    PerClass,
    Aggregated,
    Single,
}

impl MenuChoice {
    fn parse(input: &str) -> Result<Self, HarvestError> {
        match input.trim() {
            "1" => Ok(MenuChoice::PerClass),
            "2" => Ok(MenuChoice::Aggregated),
            "3" => Ok(MenuChoice::Single),
            other => Err(HarvestError::InvalidChoice(other.to_string())),
        }
    }
}

/// Line-based prompts over any reader/writer pair
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line.trim().to_string())
    }

    /// Ask, falling back to `default` on an empty answer
    fn ask_or(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{} (default: {}): ", prompt, default))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    fn choose(&mut self) -> Result<MenuChoice> {
        writeln!(self.output, "{}", style("== ck-harvest: CBO, DIT and LCOM metrics ==").bold())?;
        writeln!(self.output)?;
        writeln!(self.output, "1. Multiple repositories - metrics per CLASS")?;
        writeln!(self.output, "2. Multiple repositories - metrics AGGREGATED per repository")?;
        writeln!(self.output, "3. Single repository")?;
        let answer = self.ask("Choose an option (1, 2 or 3): ")?;
        Ok(MenuChoice::parse(&answer)?)
    }
}

pub fn run(config: &HarvestConfig) -> Result<()> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter {
        input: stdin.lock(),
        output: std::io::stdout(),
    };
    run_with(config, &mut prompter)
}

fn run_with<R: BufRead, W: Write>(config: &HarvestConfig, prompter: &mut Prompter<R, W>) -> Result<()> {
    let choice = prompter.choose()?;
    require_jar(config)?;

    match choice {
        MenuChoice::PerClass | MenuChoice::Aggregated => {
            let input = PathBuf::from(prompter.ask(
                "Path to the CSV with repositories (e.g. repositories.csv): ",
            )?);
            let mode = if choice == MenuChoice::PerClass {
                ExtractMode::PerClass
            } else {
                ExtractMode::Aggregated
            };
            let default = mode.default_output(config);
            let output = prompter.ask_or("Output file name", &default.to_string_lossy())?;
            extract::run(config, mode, &input, &PathBuf::from(output))
        }
        MenuChoice::Single => {
            let url = prompter.ask("GitHub repository URL: ")?;
            single::run(config, &url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter {
            input: input.as_bytes(),
            output: Vec::new(),
        }
    }

    #[test]
    fn test_parse_choices() {
        assert_eq!(MenuChoice::parse(" 1\n").unwrap(), MenuChoice::PerClass);
        assert_eq!(MenuChoice::parse("2").unwrap(), MenuChoice::Aggregated);
        assert_eq!(MenuChoice::parse("3").unwrap(), MenuChoice::Single);
        assert!(matches!(MenuChoice::parse("4"), Err(HarvestError::InvalidChoice(_))));
        assert!(MenuChoice::parse("").is_err());
    }

    #[test]
    fn test_ask_or_uses_default() {
        let mut p = prompter("\ncustom.csv\n");
        assert_eq!(p.ask_or("Output", "all_class_metrics.csv").unwrap(), "all_class_metrics.csv");
        assert_eq!(p.ask_or("Output", "all_class_metrics.csv").unwrap(), "custom.csv");
        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("(default: all_class_metrics.csv)"));
    }

    #[test]
    fn test_invalid_choice_exits_with_two() {
        let err = run_with(&HarvestConfig::default(), &mut prompter("9\n")).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_missing_jar_checked_after_choice() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarvestConfig::default();
        config.extraction.jar = dir.path().join("missing.jar");
        let err = run_with(&config, &mut prompter("1\n")).unwrap_err();
        assert_eq!(exit_code_for(&err), 1);
        assert!(err.to_string().contains("CK jar not found"));
    }
}
