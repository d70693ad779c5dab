pub mod demo_page;
pub mod info_dialog;
pub mod keyboard_panel;
