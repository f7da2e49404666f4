use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use dashgrid::config::DashboardConfig;
use dashgrid::dashboard::Dashboard;
use dashgrid::host::TerminalGrid;
use dashgrid::seed::default_widgets;
use dashgrid::snapshot::Snapshot;
use dashgrid::store::WidgetStateStore;
use dashgrid::tracing_sub;
use dashgrid::widget::WidgetId;

#[derive(Parser, Debug)]
#[command(
    name = "grid-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Throw random drops and resizes at the layout engine and check it holds"
)]
struct BenchCli {
    /// Number of gestures to run.
    #[arg(short = 'n', long = "rounds", value_name = "N", default_value_t = 2_000)]
    rounds: u32,

    /// RNG seed; the same seed replays the same gestures.
    #[arg(short = 's', long = "seed", default_value_t = 42)]
    seed: u64,

    /// Share of gestures that resize instead of move.
    #[arg(long = "resize-ratio", value_name = "RATIO", default_value_t = 0.3)]
    resize_ratio: f64,

    #[arg(long, default_value_t = 6)]
    columns: u16,

    #[arg(long, default_value_t = 40)]
    rows: u16,

    /// Print engine logs to stderr.
    #[arg(long)]
    log: bool,
}

struct BenchConfig {
    rounds: u32,
    seed: u64,
    resize_ratio: f64,
    columns: u16,
    rows: u16,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=1_000_000).contains(&cli.rounds) {
            return Err("rounds must be between 1 and 1000000".to_string());
        }
        if !(0.0..=1.0).contains(&cli.resize_ratio) {
            return Err("resize ratio must be between 0 and 1".to_string());
        }
        if !(1..=48).contains(&cli.columns) || !(1..=400).contains(&cli.rows) {
            return Err("columns must be 1..=48 and rows 1..=400".to_string());
        }
        Ok(Self {
            rounds: cli.rounds,
            seed: cli.seed,
            resize_ratio: cli.resize_ratio,
            columns: cli.columns,
            rows: cli.rows,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    if args.log {
        tracing_sub::init(
            tracing_sub::LogSink::Stderr,
            tracing_sub::level_from_env(tracing::Level::INFO),
        );
    }

    let stats = run_bench(&config).map_err(io::Error::other)?;
    println!("{}", stats.final_report(&config));
    if stats.violations > 0 || !stats.save_idempotent {
        return Err(io::Error::other("layout invariants broken"));
    }
    Ok(())
}

#[derive(Default)]
struct BenchStats {
    drops: u64,
    resizes: u64,
    toggles: u64,
    events: u64,
    corrections: u64,
    pushes: u64,
    violations: u64,
    save_idempotent: bool,
    restored_widgets: usize,
    elapsed: Duration,
}

fn run_bench(config: &BenchConfig) -> Result<BenchStats, String> {
    let started = Instant::now();
    let dashboard_config = DashboardConfig {
        columns: config.columns,
        rows: config.rows,
        ..DashboardConfig::default()
    };
    let bounds = dashboard_config.bounds();
    let store = WidgetStateStore::in_memory(default_widgets());
    let mut dashboard = Dashboard::new(TerminalGrid::new(), store, dashboard_config);
    dashboard.init().map_err(|err| err.to_string())?;
    dashboard.measure_container(bounds);
    dashboard.enter_edit_mode();
    settle(&mut dashboard);
    if !dashboard.is_editing() || dashboard.transition().is_some() {
        return Err("dashboard never reached edit mode".to_string());
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = BenchStats::default();
    let cols = config.columns as i32;
    let rows = config.rows as i32;

    for _ in 0..config.rounds {
        let visible: Vec<WidgetId> = dashboard
            .store()
            .visible_widgets()
            .map(|w| w.id.clone())
            .collect();
        if rng.gen_ratio(1, 40) || visible.is_empty() {
            if let Some(widget) = dashboard.widgets().choose(&mut rng) {
                let id = widget.id.clone();
                dashboard.toggle_visibility(&id);
                stats.toggles += 1;
            }
        } else if let Some(id) = visible.choose(&mut rng) {
            let grid = dashboard.grid_mut();
            if rng.gen_bool(config.resize_ratio) {
                let w = rng.gen_range(-2..=cols + 3);
                let h = rng.gen_range(-2..=rows / 2);
                if grid.resize_widget(id, w, h) {
                    stats.resizes += 1;
                }
            } else {
                let x = rng.gen_range(-3..=cols + 3);
                let y = rng.gen_range(-3..=rows + 5);
                if grid.drop_widget(id, x, y) {
                    stats.drops += 1;
                }
            }
        }
        dashboard.advance(Duration::from_millis(rng.gen_range(0..=80)));
        stats.violations += dashboard
            .store()
            .visible_widgets()
            .filter(|w| !bounds.contains(&w.rect))
            .count() as u64;
    }
    settle(&mut dashboard);

    dashboard.exit_edit_mode();
    let first = dashboard
        .store()
        .last_saved_json()
        .map(str::to_owned)
        .ok_or("leaving edit mode did not save")?;
    dashboard.save_layout().map_err(|err| err.to_string())?;
    let second = dashboard
        .store()
        .last_saved_json()
        .map(str::to_owned)
        .ok_or("explicit save produced nothing")?;
    stats.save_idempotent = first == second;
    let snapshot = Snapshot::from_json(&second).map_err(|err| err.to_string())?;
    stats.restored_widgets = snapshot.widgets().len();

    let sync = dashboard.sync_stats();
    stats.events = sync.events;
    stats.corrections = sync.corrections;
    stats.pushes = sync.pushes;
    stats.elapsed = started.elapsed();
    dashboard.dispose();
    Ok(stats)
}

/// Step simulated time until no transition or scheduled task is left.
fn settle(dashboard: &mut Dashboard<TerminalGrid>) {
    for _ in 0..50 {
        if dashboard.transition().is_none() && dashboard.scheduler().is_empty() {
            return;
        }
        dashboard.advance(Duration::from_millis(100));
    }
}

impl BenchStats {
    fn final_report(&self, config: &BenchConfig) -> String {
        let status = if self.violations == 0 && self.save_idempotent {
            "passed"
        } else {
            "FAILED"
        };
        indoc::formatdoc!(
            r#"
            Grid bench {status} (seed {seed}, {cols}x{rows} container).
            Gestures: {drops} drops | {resizes} resizes | {toggles} visibility toggles
            Engine: {events} events | {corrections} clamp corrections | {pushes} pushes
            Containment violations: {violations}
            Save idempotent: {idempotent} ({widgets} widgets in snapshot)
            Wall time: {elapsed:.2} ms
            "#,
            seed = config.seed,
            cols = config.columns,
            rows = config.rows,
            drops = self.drops,
            resizes = self.resizes,
            toggles = self.toggles,
            events = self.events,
            corrections = self.corrections,
            pushes = self.pushes,
            violations = self.violations,
            idempotent = self.save_idempotent,
            widgets = self.restored_widgets,
            elapsed = self.elapsed.as_secs_f64() * 1_000.0,
        )
    }
}
