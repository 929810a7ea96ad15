//! mapnote - terminal host for map polygon annotations

mod app;
mod io;
mod ui;

use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use app::{App, Mode};

fn main() -> Result<()> {
    env_logger::init();

    // Optional GeoJSON seed file from args
    let args: Vec<String> = std::env::args().collect();
    let seed_path = args.get(1);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app: mounts the surface and wires it to the store
    let mut app = App::new()?;

    if let Some(path) = seed_path {
        match io::load_features(path) {
            Ok(features) => {
                let count = app.seed(features);
                app.set_status(&format!("Loaded {} shape(s) from {}", count, path));
            }
            Err(e) => {
                app.set_status(&format!("Error: {}", e));
            }
        }
    } else {
        app.set_status("Press 'p' to draw a shape, '?' for help");
    }

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal and unhook the surface
    app.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Clear status on any key
            app.clear_status();

            match app.mode {
                Mode::Browse => handle_browse_mode(app, key.code),
                Mode::EditName => handle_edit_mode(app, key.code),
                Mode::Help => {
                    app.mode = Mode::Browse;
                }
            }
        }
    }
    Ok(())
}

fn handle_browse_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.mode = Mode::Help,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),

        // Surface interaction
        KeyCode::Char('p') => app.draw_shape(),
        KeyCode::Char('m') => app.reshape_selected(),
        KeyCode::Char('x') => app.trash_selected(),

        // Annotation commands
        KeyCode::Char('e') | KeyCode::Enter => app.begin_edit(),
        KeyCode::Char('d') => app.delete_selected(),

        // Export
        KeyCode::Char('w') => {
            let result = io::export_set(&app.published());
            match result {
                Ok(path) => app.set_status(&format!("Exported to {}", path.display())),
                Err(e) => app.set_status(&format!("Export failed: {}", e)),
            }
        }

        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}
