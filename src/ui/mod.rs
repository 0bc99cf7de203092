pub mod dialogs;
pub mod keybindings;
mod panels;
pub mod terminal_guard;
mod toast;

pub use dialogs::{HelpDialog, OtpAction, OtpDialog, OtpFocus};
pub use panels::{spinner_frame, HeaderBar, ResponsePanel, StatusBar, StepsPanel};
pub use terminal_guard::{install_panic_hook, TerminalGuard};
pub use toast::Toast;
