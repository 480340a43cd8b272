// Keyboard event handling
//
// This module contains the keyboard event handler that processes
// user input and updates the application state accordingly.

use super::AppState;
use crate::telemetry::Scenario;
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit. Every key press counts as the user
/// interaction that unlocks alert sounds.
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `1`, `2`, `3` - Scenario NORMAL / DDOS / BRUTE_FORCE
/// - `+`, `=` - Raise detection threshold by 5%
/// - `-`, `_` - Lower detection threshold by 5%
/// - `m`, `M` - Toggle alert sound
/// - `t`, `T` - Toggle map labels
/// - `b`, `B` - Cycle map backdrop
/// - `i`, `I` - Add an IP rule
/// - `Up` / `Down` - Select a firewall rule
/// - `x`, `Delete` - Remove the selected rule
///
/// While the rule input is open, keys edit the input line instead:
/// `Tab` switches allow/deny, `Enter` submits, `Esc` cancels.
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    app.on_user_interaction();

    if app.rule_input.is_some() {
        handle_input_key(app, key);
        return true;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.running = false;
            false
        }
        KeyCode::Char('1') => {
            app.set_scenario(Scenario::Normal);
            true
        }
        KeyCode::Char('2') => {
            app.set_scenario(Scenario::Ddos);
            true
        }
        KeyCode::Char('3') => {
            app.set_scenario(Scenario::BruteForce);
            true
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.adjust_threshold(1);
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.adjust_threshold(-1);
            true
        }
        KeyCode::Char('m') | KeyCode::Char('M') => {
            app.toggle_mute();
            true
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.toggle_labels();
            true
        }
        KeyCode::Char('b') | KeyCode::Char('B') => {
            app.cycle_backdrop();
            true
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            app.begin_rule_input();
            true
        }
        KeyCode::Up => {
            app.select_previous_rule();
            true
        }
        KeyCode::Down => {
            app.select_next_rule();
            true
        }
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => {
            app.remove_selected_rule();
            true
        }
        _ => true,
    }
}

fn handle_input_key(app: &mut AppState, key: KeyCode) {
    match key {
        KeyCode::Esc => app.cancel_rule_input(),
        KeyCode::Enter => app.submit_rule_input(),
        KeyCode::Tab | KeyCode::BackTab => {
            if let Some(input) = app.rule_input.as_mut() {
                input.list = input.list.toggle();
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = app.rule_input.as_mut() {
                input.text.pop();
            }
        }
        KeyCode::Char(c) if !c.is_control() => {
            if let Some(input) = app.rule_input.as_mut() {
                input.text.push(c);
            }
        }
        _ => {}
    }
}
