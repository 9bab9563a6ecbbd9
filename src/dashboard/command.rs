//! Commands accepted by the interactive session.

use crate::dashboard::View;
use crate::models::TrendMetric;

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(View),
    ListStartups,
    ListInvestors,
    Help,
    Quit,
}

/// Help text for the interactive session.
pub const HELP: &str = "\
Commands:
  overall [total|count]   market overview, trend by total funding or count
  startup <name>          one startup's profile and funding rounds
  investor <name>         one investor's portfolio
  startups                list startup names
  investors               list investor names
  help                    show this help
  quit                    leave the session";

/// Parse a command line. Names keep their inner spaces and case.
pub fn parse_command(line: &str, default_trend: TrendMetric) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "overall" => {
            let trend = match rest.to_lowercase().as_str() {
                "" => default_trend,
                "total" | "total-funding" => TrendMetric::TotalFunding,
                "count" | "investment-count" => TrendMetric::InvestmentCount,
                other => return Err(format!("Unknown trend '{}': use total or count", other)),
            };
            Ok(Command::Show(View::Overall { trend }))
        }
        "startup" => named(rest, "startup").map(|name| Command::Show(View::Startup { name })),
        "investor" => named(rest, "investor").map(|name| Command::Show(View::Investor { name })),
        "startups" => Ok(Command::ListStartups),
        "investors" => Ok(Command::ListInvestors),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "" => Err("Empty command. Type 'help' for commands.".to_string()),
        other => Err(format!("Unknown command '{}'. Type 'help' for commands.", other)),
    }
}

fn named(rest: &str, what: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("Usage: {} <name>", what))
    } else {
        Ok(rest.to_string())
    }
}
