use std::path::Path;

use clap::{Parser, Subcommand};

use lexis_cli::commands::{self, browse_ops, config_ops, dict_ops, user_data_ops};
use lexis_engine::lexis_core::SHOW_ALL_VIEW_ID;

#[derive(Parser)]
#[command(name = "lexistool", about = "Lexis dictionary database tool")]
struct Cli {
    /// Dictionary database (default: ~/.local/share/lexis/lexis.db)
    #[arg(long, global = true)]
    db: Option<String>,
    /// View preferences file (default: views.lxvp next to the database)
    #[arg(long, global = true)]
    prefs: Option<String>,
    /// Custom settings TOML
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Write JSON-lines traces to this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<String>,
    /// Trace filter directives (default: RUST_LOG, else debug for lexis)
    #[arg(long, global = true)]
    trace_filter: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install or upgrade a dictionary from a JSON bundle
    Install {
        /// Bundle file
        bundle_file: String,
    },
    /// Remove a dictionary with its bookmarks and history
    Uninstall {
        /// Dictionary id
        dictionary: String,
    },
    /// List installed dictionaries
    Dictionaries,
    /// List a dictionary's categories
    Categories {
        /// Dictionary id
        dictionary: String,
    },
    /// List a dictionary's views
    Views {
        /// Dictionary id
        dictionary: String,
    },
    /// Print the resolved lexeme order for a view and sort
    Order {
        /// Dictionary id
        dictionary: String,
        /// View id
        #[arg(long, default_value = SHOW_ALL_VIEW_ID)]
        view: String,
        /// Sort category id (default: by form)
        #[arg(long)]
        sort: Option<String>,
    },
    /// Print one page of the listing
    Page {
        /// Dictionary id
        dictionary: String,
        /// Page key (1-based position)
        #[arg(long)]
        key: Option<i64>,
        /// Page size (default: paging.page_size)
        #[arg(short, long)]
        n: Option<usize>,
        /// View id (remembered)
        #[arg(long)]
        view: Option<String>,
        /// Sort category id (remembered)
        #[arg(long)]
        sort: Option<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Assemble and print one entry
    Entry {
        /// Dictionary id
        dictionary: String,
        /// Lexeme id
        lexeme: String,
        /// View id (remembered)
        #[arg(long)]
        view: Option<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive substring search over forms and property values
    Search {
        /// Dictionary id
        dictionary: String,
        /// Text to look for
        text: String,
        /// Only match values of this category
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage bookmarks
    Bookmark {
        /// Dictionary id
        dictionary: String,
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Show lookup history, newest first
    History {
        /// Dictionary id
        dictionary: String,
        /// Number of records
        #[arg(short, long, default_value = "20")]
        n: usize,
        /// Delete the dictionary's history instead
        #[arg(long)]
        clear: bool,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

#[derive(Subcommand)]
enum BookmarkAction {
    /// Bookmark a lexeme
    Add {
        /// Lexeme id
        lexeme: String,
    },
    /// Remove a bookmark
    Remove {
        /// Lexeme id
        lexeme: String,
    },
    /// List bookmarked entries
    List,
}

fn main() {
    let cli = Cli::parse();

    if let Some(file) = &cli.settings {
        config_ops::load_settings(file);
    }
    let _trace = cli
        .trace_dir
        .as_deref()
        .map(|dir| config_ops::start_tracing(Path::new(dir), cli.trace_filter.as_deref()));
    let engine = || commands::open_engine(cli.db.as_deref(), cli.prefs.as_deref());

    match cli.command {
        Command::Install { ref bundle_file } => dict_ops::install(&engine(), bundle_file),
        Command::Uninstall { ref dictionary } => dict_ops::uninstall(&engine(), dictionary),
        Command::Dictionaries => dict_ops::dictionaries(&engine()),
        Command::Categories { ref dictionary } => dict_ops::categories(&engine(), dictionary),
        Command::Views { ref dictionary } => dict_ops::views(&engine(), dictionary),
        Command::Order {
            ref dictionary,
            ref view,
            ref sort,
        } => browse_ops::order(&engine(), dictionary, view, sort.as_deref()),
        Command::Page {
            ref dictionary,
            key,
            n,
            ref view,
            ref sort,
            json,
        } => browse_ops::page(
            &engine(),
            dictionary,
            view.as_deref(),
            sort.as_deref(),
            key,
            n,
            json,
        ),
        Command::Entry {
            ref dictionary,
            ref lexeme,
            ref view,
            json,
        } => browse_ops::entry(&engine(), dictionary, lexeme, view.as_deref(), json),
        Command::Search {
            ref dictionary,
            ref text,
            ref category,
            json,
        } => browse_ops::search(&engine(), dictionary, text, category.as_deref(), json),
        Command::Bookmark {
            ref dictionary,
            ref action,
        } => {
            let engine = engine();
            match action {
                BookmarkAction::Add { lexeme } => {
                    user_data_ops::bookmark_add(&engine, dictionary, lexeme)
                }
                BookmarkAction::Remove { lexeme } => {
                    user_data_ops::bookmark_remove(&engine, dictionary, lexeme)
                }
                BookmarkAction::List => user_data_ops::bookmark_list(&engine, dictionary),
            }
        }
        Command::History {
            ref dictionary,
            n,
            clear,
        } => user_data_ops::history(&engine(), dictionary, n, clear),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { ref file } => config_ops::settings_validate(file),
    }
}
