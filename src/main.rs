use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use badp::cli::{
    handle_add_item, handle_add_theme, handle_copy, handle_import, handle_init, handle_list,
    handle_themes, load_config, Cli, Commands,
};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "badp=debug" } else { "badp=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Init { file } => handle_init(config, file),
        Commands::Import {
            file,
            meta,
            data,
            force,
        } => handle_import(config, file, meta, data, force),
        Commands::List {
            file,
            category,
            json,
        } => handle_list(config, file, category, json),
        Commands::Themes { file, json } => handle_themes(config, file, json),
        Commands::AddTheme {
            file,
            image,
            name,
            id,
        } => handle_add_theme(config, file, image, name, id),
        Commands::AddItem {
            file,
            category,
            title,
            date,
            level,
            theme,
            content,
            stdin,
        } => handle_add_item(config, file, category, title, date, level, theme, content, stdin),
        Commands::Copy { file, destination } => handle_copy(config, file, destination),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
