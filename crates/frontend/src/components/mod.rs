pub mod comment_list;
pub mod help_overlay;
pub mod map_view;
pub mod options_panel;
