//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status bar showing backend, status and "↓ New"
//! - `LandingPage`: Welcome greeting and example prompts
//! - `MessageBlock`: A single transcript entry
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: Single-line query editor
//! - `MessageList`: Scrollable transcript with layout caching and autoscroll
//!
//! Components receive external data as props (struct fields), not by reaching
//! into `App`:
//!
//! ```rust,ignore
//! // Good: dependencies are explicit
//! TitleBar::new(app.backend_name.clone(), app.status_message.clone(), unseen).render(frame, area);
//! ```
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── landing.rs       (Welcome screen)
//! ├── message.rs       (Single message + loading indicator)
//! ├── message_list.rs  (Scrollable transcript)
//! └── input_box.rs     (Query editor)
//! ```

pub mod input_box;
pub mod landing;
pub mod message;
pub mod message_list;
mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use landing::LandingPage;
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;
