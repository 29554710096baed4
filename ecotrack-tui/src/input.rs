use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Open directions to the selected point in the platform browser
    OpenDirections,
    /// Spawn a generation request for the current assistant
    SubmitChat,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Char, Tab};

    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.mode == InputMode::Editing {
        return handle_editing(key, app);
    }

    app.clear_messages();

    match key.code {
        Char('q') => return Action::Quit,
        Tab => {
            app.screen = app.screen.next();
            return Action::None;
        }
        BackTab => {
            app.screen = app.screen.previous();
            return Action::None;
        }
        Char(digit @ '1'..='3') => {
            let picked = Screen::ALL
                .iter()
                .zip('1'..='3')
                .find_map(|(screen, key)| (key == digit).then_some(*screen));
            if let Some(screen) = picked {
                app.screen = screen;
            }
            return Action::None;
        }
        _ => {}
    }

    match app.screen {
        Screen::Points => handle_points(key, app),
        Screen::Jobs => handle_jobs(key, app),
        Screen::Assistants => handle_assistants(key, app),
    }
}

fn handle_points(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Up};

    match key.code {
        Up | Char('k') => app.move_point_cursor(false),
        Down | Char('j') => app.move_point_cursor(true),
        Enter | Char(' ') => app.select_point_under_cursor(),
        Char('w') => app.cycle_waste_type(),
        Char('s') => app.cycle_status(),
        Char('r') => app.reset_points(),
        Char('/') => app.mode = InputMode::Editing,
        Char('d') => return Action::OpenDirections,
        Char('y') => app.share_selected(),
        _ => {}
    }
    Action::None
}

fn handle_jobs(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Up};

    match key.code {
        Up | Char('k') => app.move_job_cursor(false),
        Down | Char('j') => app.move_job_cursor(true),
        Enter | Char('a') => app.apply_to_job_under_cursor(),
        Char('t') => app.cycle_employment_type(),
        Char('l') => app.cycle_location(),
        Char('r') => app.reset_jobs(),
        Char('/') => app.mode = InputMode::Editing,
        _ => {}
    }
    Action::None
}

fn handle_assistants(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Up};

    match key.code {
        Up | Char('k') => app.switch_conversation(false),
        Down | Char('j') => app.switch_conversation(true),
        Enter | Char('i') => app.mode = InputMode::Editing,
        _ => {}
    }
    Action::None
}

fn handle_editing(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Enter, Esc};

    let typed = match key.code {
        Char(character)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(character)
        }
        _ => None,
    };

    match app.screen {
        Screen::Points => {
            match key.code {
                Backspace => {
                    app.point_search.pop();
                }
                Enter | Esc => {
                    app.mode = InputMode::Normal;
                    return Action::None;
                }
                _ => match typed {
                    Some(character) => app.point_search.push(character),
                    None => return Action::None,
                },
            }
            app.update_point_search();
        }
        Screen::Jobs => {
            match key.code {
                Backspace => {
                    app.job_search.pop();
                }
                Enter | Esc => {
                    app.mode = InputMode::Normal;
                    return Action::None;
                }
                _ => match typed {
                    Some(character) => app.job_search.push(character),
                    None => return Action::None,
                },
            }
            app.update_job_search();
        }
        Screen::Assistants => match key.code {
            Backspace => {
                app.chat_input.pop();
            }
            Enter => return Action::SubmitChat,
            Esc => app.mode = InputMode::Normal,
            _ => {
                if let Some(character) = typed {
                    app.chat_input.push(character);
                }
            }
        },
    }
    Action::None
}

pub(crate) fn handle_mouse_event(mouse: MouseEvent, app: &mut App) -> Action {
    if app.screen == Screen::Points
        && mouse.kind == MouseEventKind::Down(MouseButton::Left)
    {
        app.clear_messages();
        app.click_map(mouse.column, mouse.row);
    }
    Action::None
}
