mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_add_item, handle_add_theme, handle_copy, handle_import, handle_init, handle_list,
    handle_themes, load_config,
};
