use std::process::ExitCode;

use clap::Parser;
use desktop_menu_win::{Language, OrderingPolicy, Settings};

#[cfg(windows)]
use std::io;

#[cfg(windows)]
use dialoguer::{Select, console::Term};
#[cfg(windows)]
use desktop_menu_win::Presenter;
#[cfg(windows)]
use desktop_menu_win::log::{force_logging, log_cli, log_ui};
#[cfg(windows)]
use desktop_menu_win::tree::ClassesRootTree;

#[cfg(windows)]
#[path = "manager/bootstrap.rs"]
mod bootstrap;
#[cfg(windows)]
#[path = "manager/entries.rs"]
mod entries;
#[cfg(windows)]
#[path = "manager/prompts.rs"]
mod prompts;
#[cfg(windows)]
#[path = "manager/regedit.rs"]
mod regedit;
#[cfg(windows)]
#[path = "manager/restart_explorer.rs"]
mod restart_explorer;
#[cfg(windows)]
#[path = "manager/toggle_logging.rs"]
mod toggle_logging;

#[cfg(windows)]
pub(crate) type Manager = Presenter<ClassesRootTree>;

/// Add, remove, rename and reorder entries of the desktop right-click menu.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[cfg_attr(not(windows), allow(dead_code))]
struct Cli {
    /// Ordering policy; overrides the stored setting
    #[arg(long, value_enum)]
    policy: Option<OrderingPolicy>,

    /// Language suffix for keys written with alphabetical ordering
    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Shorthand for `--lang en`
    #[arg(long, conflicts_with = "lang")]
    english: bool,

    /// List entries created by other programs too
    #[arg(long)]
    show_all: bool,

    /// Log this session to the log file even if logging is switched off
    #[arg(long)]
    log: bool,
}

#[cfg_attr(not(windows), allow(dead_code))]
impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(policy) = self.policy {
            settings.policy = policy;
        }
        if self.english {
            settings.language = Language::English;
        } else if let Some(language) = self.lang {
            settings.language = language;
        }
        settings.show_all |= self.show_all;
    }
}

#[cfg(not(windows))]
fn main() -> ExitCode {
    let _cli = Cli::parse();
    eprintln!("desktop-menu-manager edits HKEY_CLASSES_ROOT and only runs on Windows.");
    ExitCode::from(1)
}

#[cfg(windows)]
fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.log {
        force_logging();
    }
    log_cli("Manager started");

    if !bootstrap::is_elevated() {
        log_ui("Administrator rights are required to change the desktop context menu.");
        log_ui("Please run this program as administrator.");
        prompts::pause("\nPress Enter to exit...");
        return ExitCode::from(1);
    }

    let _instance = match bootstrap::acquire_single_instance() {
        Ok(Some(guard)) => Some(guard),
        Ok(None) => {
            log_cli("Another instance is running; activating it");
            bootstrap::activate_existing_window();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            log_cli(format!("Single-instance check failed: {err}; continuing"));
            None
        }
    };
    bootstrap::set_console_title();

    let mut settings = Settings::load();
    cli.apply(&mut settings);
    log_cli(format!(
        "Settings: policy = {}, language = {}, show all = {}",
        settings.policy,
        settings.language.suffix(),
        settings.show_all
    ));

    let catalog = desktop_menu_win::Catalog::from_settings(ClassesRootTree::open(), &settings);
    let mut manager = Presenter::new(catalog);

    match run(&mut manager) {
        Ok(()) => {
            log_cli("Manager exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log_ui(format!("Fatal console error: {err}"));
            ExitCode::from(1)
        }
    }
}

#[cfg(windows)]
fn run(manager: &mut Manager) -> io::Result<()> {
    loop {
        prompts::print_entries(manager);
        let action = choose_action(manager)?;
        log_cli(format!("Menu selection: {}", action.title()));

        if action == Action::Exit {
            break;
        }

        match execute_action(action, manager) {
            Ok(()) => log_cli(format!("Action '{}' finished", action.title())),
            Err(err) => {
                log_cli(format!("Action '{}' failed: {}", action.title(), err));
                return Err(err);
            }
        }
        if let Some(result) = manager.take_commit_notice() {
            prompts::report_rename(result);
        }

        prompts::pause("\nPress Enter to return to the menu...");
    }
    Ok(())
}

/* ---------- Menu ---------- */

#[cfg(windows)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    AddProgram,
    Remove,
    Rename,
    MoveUp,
    MoveDown,
    SortAlphabetically,
    ToggleShowAll,
    RefreshList,
    RefreshEntry,
    OpenInRegistryEditor,
    RestartExplorer,
    ToggleLogging,
    Exit,
}

#[cfg(windows)]
impl Action {
    const ALL: [Action; 13] = [
        Action::AddProgram,
        Action::Remove,
        Action::Rename,
        Action::MoveUp,
        Action::MoveDown,
        Action::SortAlphabetically,
        Action::ToggleShowAll,
        Action::RefreshList,
        Action::RefreshEntry,
        Action::OpenInRegistryEditor,
        Action::RestartExplorer,
        Action::ToggleLogging,
        Action::Exit,
    ];

    fn title(self) -> &'static str {
        match self {
            Action::AddProgram => "Add program",
            Action::Remove => "Remove",
            Action::Rename => "Rename",
            Action::MoveUp => "Move up",
            Action::MoveDown => "Move down",
            Action::SortAlphabetically => "Sort alphabetically",
            Action::ToggleShowAll => "Show all items",
            Action::RefreshList => "Refresh list",
            Action::RefreshEntry => "Refresh entry",
            Action::OpenInRegistryEditor => "Open in Registry Editor",
            Action::RestartExplorer => "Restart Explorer",
            Action::ToggleLogging => "Toggle logging",
            Action::Exit => "Exit",
        }
    }

    fn available(self, policy: OrderingPolicy) -> bool {
        match self {
            Action::MoveUp | Action::MoveDown => policy == OrderingPolicy::Positional,
            _ => true,
        }
    }
}

#[cfg(windows)]
fn choose_action(manager: &Manager) -> io::Result<Action> {
    let actions: Vec<Action> = Action::ALL
        .into_iter()
        .filter(|action| action.available(manager.catalog().policy()))
        .collect();
    let items: Vec<String> = actions
        .iter()
        .map(|action| match action {
            Action::ToggleShowAll => format!(
                "{} [{}]",
                action.title(),
                if manager.catalog().show_all() { "on" } else { "off" }
            ),
            _ => action.title().to_string(),
        })
        .collect();

    let idx = Select::with_theme(&prompts::menu_theme())
        .with_prompt(desktop_menu_win::keys::WINDOW_TITLE)
        .items(&items)
        .default(0)
        .interact_on(&Term::stdout())?;

    Ok(actions.get(idx).copied().unwrap_or(Action::Exit))
}

#[cfg(windows)]
fn execute_action(action: Action, manager: &mut Manager) -> io::Result<()> {
    use desktop_menu_win::Direction;

    match action {
        Action::AddProgram => entries::add_program(manager),
        Action::Remove => entries::remove_entry(manager),
        Action::Rename => entries::rename_entry(manager),
        Action::MoveUp => entries::move_entry(manager, Direction::Up),
        Action::MoveDown => entries::move_entry(manager, Direction::Down),
        Action::SortAlphabetically => entries::sort_entries(manager),
        Action::ToggleShowAll => entries::toggle_show_all(manager),
        Action::RefreshList => entries::refresh_list(manager),
        Action::RefreshEntry => entries::refresh_entry(manager),
        Action::OpenInRegistryEditor => regedit::open_selected(manager),
        Action::RestartExplorer => restart_explorer::restart_explorer(),
        Action::ToggleLogging => toggle_logging::toggle_logging(),
        Action::Exit => Ok(()),
    }
}
