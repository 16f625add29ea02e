//! Interactive lightcurve view in the terminal.
//!
//! Draws the plot as a ratatui chart on the alternate screen and blocks
//! until the user quits with `q`, `Esc` or `Ctrl-C`.

use super::PlotData;
use crate::error::{LcError, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Chart, Dataset, GraphType},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Chart geometry derived from plot data.
///
/// Magnitudes are negated so brighter detections sit higher; the y-axis
/// labels undo the negation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub points: Vec<(f64, f64)>,
    /// Error bars as vertical two-point segments.
    pub bars: Vec<[(f64, f64); 2]>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: String,
    pub y_label: String,
}

impl ChartData {
    pub fn new(data: &PlotData) -> Self {
        let (x0, x1) = data.x_range();
        let (y0, y1) = data.y_range();

        Self {
            title: format!(
                " VIRAC v2 source {} ({} epochs), q to quit ",
                data.source_id,
                data.points.len()
            ),
            points: data.points.iter().map(|p| (p.time, -p.magnitude)).collect(),
            bars: data
                .points
                .iter()
                .filter_map(|p| {
                    p.error.map(|e| {
                        [
                            (p.time, -(p.magnitude + e)),
                            (p.time, -(p.magnitude - e)),
                        ]
                    })
                })
                .collect(),
            x_bounds: [x0, x1],
            y_bounds: [-y1, -y0],
            x_label: data.x_label.clone(),
            y_label: data.y_label.clone(),
        }
    }

    fn x_labels(&self) -> Vec<Span<'static>> {
        axis_labels(self.x_bounds, |v| format!("{v:.2}"))
    }

    fn y_labels(&self) -> Vec<Span<'static>> {
        axis_labels(self.y_bounds, |v| format!("{:.2}", -v))
    }
}

fn axis_labels(bounds: [f64; 2], format: impl Fn(f64) -> String) -> Vec<Span<'static>> {
    let [lo, hi] = bounds;
    [lo, (lo + hi) / 2.0, hi]
        .into_iter()
        .map(|v| Span::raw(format(v)))
        .collect()
}

/// Renders the chart into a frame.
pub fn render(frame: &mut Frame, chart: &ChartData) {
    let bar_style = Style::default().fg(Color::DarkGray);
    let mut datasets: Vec<Dataset> = chart
        .bars
        .iter()
        .map(|bar| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(bar_style)
                .data(bar)
        })
        .collect();

    datasets.push(
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&chart.points),
    );

    let widget = Chart::new(datasets)
        .block(Block::bordered().title(chart.title.as_str()))
        .x_axis(
            Axis::default()
                .title(chart.x_label.as_str())
                .bounds(chart.x_bounds)
                .labels(chart.x_labels()),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.as_str())
                .bounds(chart.y_bounds)
                .labels(chart.y_labels()),
        );

    frame.render_widget(widget, frame.area());
}

/// Returns true for the keys that close the view.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Shows the lightcurve until the user quits.
pub fn show(data: &PlotData) -> Result<()> {
    let chart = ChartData::new(data);

    let restore_hook = install_panic_hook();
    let result = setup_terminal().and_then(|mut terminal| {
        let drawn = event_loop(&mut terminal, &chart);
        drawn.and(restore_terminal(&mut terminal))
    });
    restore_hook();

    result
}

/// Installs a panic hook that leaves the alternate screen before reporting.
///
/// The returned closure puts back whichever hook was installed before.
fn install_panic_hook() -> impl FnOnce() {
    let previous = Arc::new(panic::take_hook());
    let chained = Arc::clone(&previous);
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        (**chained)(panic_info);
    }));

    move || {
        drop(panic::take_hook());
        panic::set_hook(Box::new(move |panic_info| (**previous)(panic_info)));
    }
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, chart: &ChartData) -> Result<()> {
    loop {
        terminal
            .draw(|frame| render(frame, chart))
            .map_err(|e| LcError::internal(format!("Failed to draw: {e}")))?;

        let ready = event::poll(TICK_RATE)
            .map_err(|e| LcError::internal(format!("Failed to poll events: {e}")))?;
        if !ready {
            continue;
        }

        let event =
            event::read().map_err(|e| LcError::internal(format!("Failed to read event: {e}")))?;
        if let Event::Key(key) = event {
            if is_quit_key(&key) {
                return Ok(());
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(|e| LcError::internal(format!("Failed to enable raw mode: {e}")))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| LcError::internal(format!("Failed to enter alternate screen: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| LcError::internal(format!("Failed to create terminal: {e}")))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()
        .map_err(|e| LcError::internal(format!("Failed to disable raw mode: {e}")))?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| LcError::internal(format!("Failed to leave alternate screen: {e}")))?;

    terminal
        .show_cursor()
        .map_err(|e| LcError::internal(format!("Failed to show cursor: {e}")))
}
