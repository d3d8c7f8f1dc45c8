//! Interactive roster browsing over stdin.
//!
//! Plain lines are search queries and pass through the debouncer; lines
//! starting with `:` are commands applied immediately.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rehearsal_core::{Market, RosterState, RosterView};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::display;

const HELP: &str = "type to search; :market TW|US|CN, :page N, :next, :prev, :quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Query(String),
    Market(Market),
    Page(usize),
    Next,
    Prev,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((command, ""));
    match name {
        "market" | "m" => match arg.parse() {
            Ok(market) => Input::Market(market),
            Err(e) => Input::Invalid(e.to_string()),
        },
        "page" => match arg.parse() {
            Ok(page) => Input::Page(page),
            Err(_) => Input::Invalid(format!("not a page number: {arg:?}")),
        },
        "next" | "n" => Input::Next,
        "prev" | "p" => Input::Prev,
        "quit" | "q" => Input::Quit,
        other => Input::Invalid(format!("unknown command :{other}")),
    }
}

/// Run the browse loop until `:quit` or end of input.
pub async fn run(mut view: RosterView) -> anyhow::Result<()> {
    if let RosterState::Failed(reason) = view.state() {
        anyhow::bail!("citizen roster unavailable: {reason}");
    }

    let mut rng = StdRng::from_entropy();
    let (debouncer, mut queries) = Debouncer::new(SEARCH_DEBOUNCE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("{HELP}");
    display::print_roster_page(&view, &mut rng);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Input::Query(query) => {
                        debouncer.submit(query);
                        continue;
                    }
                    Input::Market(market) => view.set_market(market),
                    Input::Page(page) => view.go_to_page(page),
                    Input::Next => view.next_page(),
                    Input::Prev => view.prev_page(),
                    Input::Quit => break,
                    Input::Invalid(message) => {
                        eprintln!("{message}\n{HELP}");
                        continue;
                    }
                }
                display::print_roster_page(&view, &mut rng);
            }
            Some(query) = queries.recv() => {
                view.set_query(query);
                display::print_roster_page(&view, &mut rng);
            }
        }
    }

    Ok(())
}
