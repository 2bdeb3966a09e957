//! Line-oriented terminal front end for the search page.

use std::io::{self, Write};

use search_core::{AppViewModel, SetCreationOutcome, ToolbarEvent};

use super::widgets::Widgets;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toolbar(ToolbarEvent),
    /// Toggle the check box of a grid item (0-based).
    Check(usize),
    Search(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
Type search text and press enter (prefix with tag: or title: to scope it).
  :bigger  :smaller  :roots  :home
  :check N        toggle grid item N
  :newset         create a set from checked items
  :help  :quit";

/// Parses one input line. Unknown `:` commands are treated as search text.
pub fn parse_command(line: &str) -> ConsoleCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut words = line.split_whitespace();
    let command = match words.next() {
        Some(":bigger") => ConsoleCommand::Toolbar(ToolbarEvent::Bigger),
        Some(":smaller") => ConsoleCommand::Toolbar(ToolbarEvent::Smaller),
        Some(":roots") => ConsoleCommand::Toolbar(ToolbarEvent::Roots),
        Some(":home") => ConsoleCommand::Toolbar(ToolbarEvent::Home),
        Some(":newset") => ConsoleCommand::Toolbar(ToolbarEvent::CreateSetFromChecked),
        Some(":help") => ConsoleCommand::Help,
        Some(":quit") => ConsoleCommand::Quit,
        Some(":check") => match words.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(index) => ConsoleCommand::Check(index),
            None => ConsoleCommand::Help,
        },
        _ => return ConsoleCommand::Search(line.to_string()),
    };
    if words.next().is_some() {
        return ConsoleCommand::Search(line.to_string());
    }
    command
}

pub fn render(out: &mut impl Write, view: &AppViewModel, widgets: &Widgets) -> io::Result<()> {
    writeln!(out, "== {} ==", view.title)?;
    let busy = if widgets.form.is_enabled() { "" } else { " (busy)" };
    writeln!(out, "Search: {}{busy}", widgets.form.text())?;
    writeln!(
        out,
        "Checked: {} | Thumbnails: {}px | Sets pending: {}",
        widgets.toolbar.checked_count(),
        widgets.grid.thumbnail_size(),
        view.pending_sets
    )?;
    if let Some(error) = &view.search_error {
        writeln!(out, "Search failed: {error}")?;
    }
    for (index, item) in widgets.grid.items().iter().enumerate() {
        let mark = if widgets.grid.is_checked(index) { "x" } else { " " };
        writeln!(out, "  [{mark}] {index:>3} {item}")?;
    }
    if let Some(outcome) = &view.last_set {
        writeln!(out, "{}", describe_outcome(outcome))?;
    }
    if let Some(location) = &widgets.navigation {
        writeln!(out, "Navigate: {location}")?;
    }
    Ok(())
}

fn describe_outcome(outcome: &SetCreationOutcome) -> String {
    match outcome {
        SetCreationOutcome::Created { permanode, members } => {
            format!("Created set {permanode} with {members} member(s)")
        }
        SetCreationOutcome::Incomplete {
            permanode,
            title_attached,
            unattached,
            reason,
        } => {
            let target = permanode
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "(no permanode)".to_string());
            let mut text = format!("Set {target} is incomplete: {reason}");
            if !title_attached {
                text.push_str("; title not set");
            }
            if !unattached.is_empty() {
                let names: Vec<String> = unattached.iter().map(ToString::to_string).collect();
                text.push_str(&format!("; not attached: {}", names.join(", ")));
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::BlobRef;

    #[test]
    fn colon_words_are_toolbar_commands() {
        assert_eq!(
            parse_command(":newset\n"),
            ConsoleCommand::Toolbar(ToolbarEvent::CreateSetFromChecked)
        );
        assert_eq!(parse_command(":check 3"), ConsoleCommand::Check(3));
        assert_eq!(parse_command(":check x"), ConsoleCommand::Help);
        assert_eq!(parse_command(":quit"), ConsoleCommand::Quit);
    }

    #[test]
    fn everything_else_is_search_text() {
        assert_eq!(
            parse_command("tag:vacation"),
            ConsoleCommand::Search("tag:vacation".to_string())
        );
        assert_eq!(
            parse_command(":roots please"),
            ConsoleCommand::Search(":roots please".to_string())
        );
        assert_eq!(parse_command(""), ConsoleCommand::Search(String::new()));
    }

    #[test]
    fn incomplete_outcome_names_missing_members() {
        let text = describe_outcome(&SetCreationOutcome::Incomplete {
            permanode: Some(BlobRef::from("sha224-set")),
            title_attached: true,
            unattached: vec![BlobRef::from("sha224-b")],
            reason: "1 of 3 claims failed: timeout".to_string(),
        });
        assert_eq!(
            text,
            "Set sha224-set is incomplete: 1 of 3 claims failed: timeout; not attached: sha224-b"
        );
    }

    #[test]
    fn render_lists_grid_items() {
        let mut widgets = Widgets::default();
        widgets
            .grid
            .populate(vec![BlobRef::from("sha224-a"), BlobRef::from("sha224-b")]);
        widgets.grid.toggle(1);
        let view = AppViewModel {
            title: "Search",
            ..AppViewModel::default()
        };

        let mut out = Vec::new();
        render(&mut out, &view, &widgets).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[ ]   0 sha224-a"));
        assert!(text.contains("[x]   1 sha224-b"));
    }
}
