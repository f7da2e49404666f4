use std::io;
use std::time::{Duration, Instant};

use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::host::DashboardApp;

/// Drive `app` until it asks to quit.
///
/// Idle passes advance the dashboard's timers to the wall clock and redraw;
/// input passes route the event to the app. The output is entered before the
/// first frame and left again afterwards, also when the loop fails, and the
/// dashboard is disposed on the way out.
pub fn run_dashboard<O, D>(
    output: &mut O,
    input: D,
    app: &mut DashboardApp,
    poll_interval: Duration,
) -> io::Result<()>
where
    O: OutputDriver,
    D: InputDriver,
{
    output.enter()?;
    let result = drive(output, input, app, poll_interval);
    app.dashboard_mut().dispose();
    let exited = output.exit();
    result.and(exited)
}

fn drive<O, D>(
    output: &mut O,
    input: D,
    app: &mut DashboardApp,
    poll_interval: Duration,
) -> io::Result<()>
where
    O: OutputDriver,
    D: InputDriver,
{
    let (width, height) = output.size()?;
    app.resize(width, height);

    let mut event_loop = EventLoop::new(input, poll_interval);
    event_loop
        .driver()
        .set_mouse_capture(app.state().mouse_capture_enabled())?;

    event_loop.run(|driver, event| {
        let flow = match event {
            Some(event) => app.handle_event(&event),
            None => {
                app.tick(Instant::now());
                output.draw(|mut frame| app.draw(&mut frame))?;
                ControlFlow::Continue
            }
        };
        if let Some(enabled) = app.state_mut().take_mouse_capture_change() {
            driver.set_mouse_capture(enabled)?;
        }
        Ok(flow)
    })
}
