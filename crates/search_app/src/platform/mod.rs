mod config;
mod console;
mod effects;
mod events;
mod logging;
mod page;
mod widgets;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use page_logging::page_info;
use search_engine::EngineHandle;

use config::{PageConfig, DEFAULT_CONFIG_PATH};
use console::ConsoleCommand;
use page::{Component, SearchPage};

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = PageConfig::load(&config_path)?;
    logging::initialize(config.log_destination, config.level_filter());
    page_info!("Starting search page against {}", config.server_url);

    let engine = EngineHandle::connect(&config.connection_settings())
        .with_context(|| format!("connecting to {}", config.server_url))?;

    let mut page = SearchPage::new(engine);
    page.enter_document();
    if let Some(query) = &config.initial_query {
        let form = &mut page.widgets_mut().form;
        form.type_text(query);
        form.submit();
    }

    let commands = spawn_stdin_reader();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", console::HELP)?;

    loop {
        match commands.recv_timeout(Duration::from_millis(20)) {
            Ok(ConsoleCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(command) => apply_command(&mut page, command, &mut stdout)?,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if let Some(view) = page.process_pending_messages() {
            console::render(&mut stdout, &view, page.widgets())?;
        }
    }

    page.dispose();
    Ok(())
}

fn apply_command(
    page: &mut SearchPage,
    command: ConsoleCommand,
    out: &mut impl Write,
) -> io::Result<()> {
    match command {
        ConsoleCommand::Toolbar(event) => page.widgets().toolbar.click(event),
        ConsoleCommand::Check(index) => page.widgets_mut().grid.toggle(index),
        ConsoleCommand::Search(text) => {
            let form = &mut page.widgets_mut().form;
            form.type_text(&text);
            form.submit();
        }
        ConsoleCommand::Help => writeln!(out, "{}", console::HELP)?,
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<ConsoleCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(console::parse_command(&line)).is_err() {
                break;
            }
        }
    });
    rx
}
