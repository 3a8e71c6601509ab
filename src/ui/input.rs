//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Every handled key also counts as user
//! activity for the session inactivity timer.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{now_ms, App, AppState, LoginFocus, Tab};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Any keypress counts as activity while a session is live
    app.guard.record_activity(now_ms());

    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle form overlay (create / edit / approval)
    if matches!(app.state, AppState::Editing) {
        return handle_form_input(app, key);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(false);
        }
        KeyCode::Char('1') => app.current_tab = Tab::Countries,
        KeyCode::Char('2') => app.current_tab = Tab::MachineTypes,
        KeyCode::Char('3') => app.current_tab = Tab::Makes,
        KeyCode::Char('4') => app.current_tab = Tab::ModelSizes,
        KeyCode::Char('5') => app.current_tab = Tab::ItemMasters,
        KeyCode::Char('6') => app.current_tab = Tab::ProcessFlows,
        KeyCode::Char('7') => app.current_tab = Tab::MachineRates,
        KeyCode::Char('8') => app.current_tab = Tab::CostAggregates,
        KeyCode::Left => {
            app.current_tab = app.current_tab.prev();
        }
        KeyCode::Right => {
            app.current_tab = app.current_tab.next();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_selection(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_selection(-1);
        }
        KeyCode::PageDown => {
            app.move_selection(10);
        }
        KeyCode::PageUp => {
            app.move_selection(-10);
        }
        KeyCode::Home => {
            app.move_selection(isize::MIN / 2);
        }
        KeyCode::End => {
            app.move_selection(isize::MAX / 2);
        }
        KeyCode::Enter => {
            if app.current_tab == Tab::ItemMasters {
                app.select_current_item();
            }
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
        }
        KeyCode::Char('c') => {
            if app.current_tab == Tab::MachineRates {
                app.cycle_country();
            }
        }
        KeyCode::Char('a') => {
            app.open_create_form();
        }
        KeyCode::Char('e') => {
            app.open_edit_form();
        }
        KeyCode::Char('A') => {
            app.open_approval_form();
        }
        KeyCode::Char('d') => {
            app.delete_selected();
        }
        KeyCode::Esc => {
            app.notice = None;
        }
        _ => {}
    }

    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password => {
                app.login_focus = LoginFocus::Button;
            }
            LoginFocus::Button => {
                // On success the state flips to Normal and a refresh is
                // already scheduled; on failure login_error is set.
                app.attempt_login().await;
            }
        },
        KeyCode::Backspace => {
            app.pop_login_char();
        }
        KeyCode::Delete => {
            app.forget_saved_password();
        }
        KeyCode::Char(c) => {
            app.push_login_char(c);
        }
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.close_form();
        }
        KeyCode::Down | KeyCode::Tab => {
            if let Some(ref mut form) = app.form {
                form.active = (form.active + 1) % form.fields.len();
            }
        }
        KeyCode::Up | KeyCode::BackTab => {
            if let Some(ref mut form) = app.form {
                form.active = (form.active + form.fields.len() - 1) % form.fields.len();
            }
        }
        KeyCode::Enter => {
            let submit = match app.form {
                Some(ref mut form) => {
                    if form.active + 1 < form.fields.len() {
                        form.active += 1;
                        false
                    } else {
                        true
                    }
                }
                None => false,
            };
            if submit {
                app.submit_form();
            }
        }
        KeyCode::Backspace => {
            if let Some(ref mut form) = app.form {
                form.fields[form.active].value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(ref mut form) = app.form {
                form.fields[form.active].value.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}
