use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use dashgrid::auth::{AuthProvider, Credentials, MockAuthProvider};
use dashgrid::config::DashboardConfig;
use dashgrid::constants::{CONTAINER_ROWS, GRID_COLUMNS};
use dashgrid::dashboard::Dashboard;
use dashgrid::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use dashgrid::host::{DashboardApp, TerminalGrid};
use dashgrid::log_buffer::{LogBuffer, set_global_log_buffer};
use dashgrid::runner::run_dashboard;
use dashgrid::seed::default_widgets;
use dashgrid::storage::FileStorage;
use dashgrid::store::WidgetStateStore;
use dashgrid::tracing_sub;

/// Drag-and-drop dashboard in the terminal.
#[derive(Debug, Parser)]
#[command(name = "dashgrid", version, about)]
struct Cli {
    /// Directory the layout is saved in (defaults to the XDG state dir).
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Grid columns.
    #[arg(long, default_value_t = GRID_COLUMNS)]
    columns: u16,

    /// Grid rows.
    #[arg(long, default_value_t = CONTAINER_ROWS)]
    rows: u16,

    #[arg(long, default_value = "admin@example.com")]
    email: String,

    #[arg(long, default_value = "admin123")]
    password: String,

    /// Discard the saved layout and start from the default one.
    #[arg(long)]
    reset: bool,

    /// Input poll interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    poll_ms: u64,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let log = LogBuffer::default();
    set_global_log_buffer(log.clone());
    tracing_sub::init_default();

    let auth = MockAuthProvider::new();
    let Some(session) = auth.login(&Credentials::new(&cli.email, &cli.password)) else {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("invalid credentials for {}", cli.email),
        ));
    };

    let storage = match &cli.state_dir {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::default_for_app("dashgrid"),
    };
    info!(dir = %storage.dir().display(), user = %session.user.email, "starting dashboard");

    let config = DashboardConfig {
        columns: cli.columns,
        rows: cli.rows,
        ..DashboardConfig::default()
    };
    let store = WidgetStateStore::new(default_widgets(), Box::new(storage));
    let dashboard = Dashboard::new(TerminalGrid::new(), store, config);
    let mut app = DashboardApp::new(dashboard, Some(session.user.clone())).with_log_buffer(log);
    app.init().map_err(io::Error::other)?;
    if cli.reset {
        app.dashboard_mut()
            .clear_persisted_layout()
            .map_err(io::Error::other)?;
    }

    let mut output = ConsoleOutputDriver::new()?;
    let result = run_dashboard(
        &mut output,
        ConsoleInputDriver::new(),
        &mut app,
        Duration::from_millis(cli.poll_ms),
    );
    auth.logout(&session.token);
    result
}
