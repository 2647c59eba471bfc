use directories::ProjectDirs;
use log::{debug, error};

use sqlitemaint::cli::Cli;
use sqlitemaint::config::Config;
use sqlitemaint::logging;

fn main() {
    let Some(project_dirs) = ProjectDirs::from("", "", "sqlitemaint") else {
        eprintln!("Could not determine the sqlitemaint data directory");
        std::process::exit(1);
    };

    let config = Config::load_config(&project_dirs);

    // Keep the handle alive for the whole run or flexi_logger stops writing
    let _logger = match logging::setup_logging(&config.logging, &project_dirs) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    if let Err(err) = Cli::handle_command_line(&config) {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
