use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::input_box::INPUT_HEIGHT;
use crate::tui::components::{LandingPage, MessageList, TitleBar};

/// Draw one frame: title bar, welcome screen or transcript, input.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(INPUT_HEIGHT)]);
    let [title_area, main_area, input_area] = layout.areas(frame.area());

    // Main area first so the title bar sees this frame's scroll state
    if app.view.is_welcome() {
        LandingPage::new(&app.user_name, &app.example_prompts, tui.example_index)
            .render(frame, main_area);
        tui.message_list.has_unseen_content = false;
    } else {
        MessageList::new(
            &mut tui.message_list,
            app.store.all(),
            app.is_loading(),
            spinner_frame,
        )
        .render(frame, main_area);
    }

    TitleBar::new(
        app.backend_name.clone(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);

    tui.input_box.render(frame, input_area);
}
