use crate::app::App;
use crate::input::InputAction;

const SCROLL_STEP: usize = 10;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => {
            if app.show_help {
                app.show_help = false;
            } else {
                app.should_quit = true;
            }
        }
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::Submit => app.submit(),
        InputAction::Insert(ch) => app.insert_char(ch),
        InputAction::Backspace => app.backspace(),
        InputAction::ClearLine => app.clear_input(),
        InputAction::HistoryPrev => app.history_prev(),
        InputAction::HistoryNext => app.history_next(),
        InputAction::ScrollUp => app.scroll_up(SCROLL_STEP),
        InputAction::ScrollDown => app.scroll_down(SCROLL_STEP),
        InputAction::Complete => app.complete(),
    }
}
