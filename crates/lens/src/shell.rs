//! Interactive session.
//!
//! Lines typed at the prompt accumulate into the query draft. Backslash
//! commands edit the draft or submit it. Submissions run in the background;
//! a renderer task prints every workflow state change, so the prompt stays
//! usable while an analysis is outstanding.

use lens_core::{AnalysisCoordinator, Dialect, LensError, WorkflowState};
use lens_ui::render_state;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const HELP: &str = "\
Type SQL over one or more lines, then:
  \\g          analyze the current query
  \\d [NAME]   show or set the dialect (postgresql, mysql, sqlite, sqlserver)
  \\s [PATH]   load schema DDL from a file, or clear it
  \\p          print the current query
  \\c          clear the current query
  \\?          show this help
  \\q          quit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input<'a> {
    /// SQL text to append to the draft.
    Sql(&'a str),
    Submit,
    Dialect(Option<&'a str>),
    Schema(Option<&'a str>),
    Print,
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('\\') else {
        return Input::Sql(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (command, None),
    };

    match name {
        "g" => Input::Submit,
        "d" => Input::Dialect(arg),
        "s" => Input::Schema(arg),
        "p" => Input::Print,
        "c" => Input::Clear,
        "?" | "h" => Input::Help,
        "q" => Input::Quit,
        _ => Input::Unknown(trimmed),
    }
}

/// Run the session until `\q` or end of input.
pub async fn run(coordinator: AnalysisCoordinator) -> Result<(), LensError> {
    let state = coordinator.state().clone();
    let renderer = tokio::spawn(render_changes(state.subscribe()));

    println!("Lens {} - type \\? for help", env!("CARGO_PKG_VERSION"));
    println!("Dialect: {}", state.draft().dialect.display_name());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(state.draft().text.is_empty());

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Sql(sql) => state.push_line(sql),
            Input::Submit => {
                if state.with_workflow(WorkflowState::is_in_flight) {
                    println!("An analysis is already in progress.");
                } else if !state.can_submit() {
                    println!("Nothing to analyze: the query is empty.");
                } else {
                    let _ = coordinator.spawn_submit();
                }
            }
            Input::Dialect(None) => println!("Dialect: {}", state.draft().dialect.display_name()),
            Input::Dialect(Some(name)) => match name.parse::<Dialect>() {
                Ok(dialect) => {
                    state.set_dialect(dialect);
                    println!("Dialect: {}", dialect.display_name());
                }
                Err(e) => println!("{e}"),
            },
            Input::Schema(None) => {
                state.set_schema_info(None);
                println!("Schema cleared.");
            }
            Input::Schema(Some(path)) => match std::fs::read_to_string(Path::new(path)) {
                Ok(ddl) => {
                    state.set_schema_info(Some(ddl));
                    println!("Schema loaded from {path}.");
                }
                Err(e) => println!("Failed to read {path}: {e}"),
            },
            Input::Print => println!("{}", state.draft().text),
            Input::Clear => state.set_text(""),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(command) => println!("Unknown command {command}; type \\? for help"),
        }
    }

    renderer.abort();
    tracing::debug!(requests = state.last_request_id(), "Shell session ended");
    Ok(())
}

/// Print the view for every workflow state change.
async fn render_changes(mut rx: watch::Receiver<WorkflowState>) {
    while rx.changed().await.is_ok() {
        let text = render_state(&rx.borrow_and_update());
        println!();
        print!("{text}");
        if rx.borrow().is_settled() {
            prompt(true);
        }
    }
}

fn prompt(fresh: bool) {
    print!("{}", if fresh { "lens> " } else { "  ..> " });
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_lines_pass_through_untrimmed() {
        assert_eq!(parse_input("  SELECT *"), Input::Sql("  SELECT *"));
        assert_eq!(parse_input(""), Input::Sql(""));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_input("\\g"), Input::Submit);
        assert_eq!(parse_input("  \\q  "), Input::Quit);
        assert_eq!(parse_input("\\d"), Input::Dialect(None));
        assert_eq!(parse_input("\\d mysql"), Input::Dialect(Some("mysql")));
        assert_eq!(parse_input("\\s  schema.sql "), Input::Schema(Some("schema.sql")));
        assert_eq!(parse_input("\\s"), Input::Schema(None));
        assert_eq!(parse_input("\\?"), Input::Help);
        assert_eq!(parse_input("\\x"), Input::Unknown("\\x"));
    }
}
