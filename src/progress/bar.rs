//! Progress bar types and builder.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::progress_bar::BarGlyphs;
use crate::{Error, Result};

use super::backend::{self, Backend};
use super::diagnostics;
use super::rate::{estimate_rate, eta};
use super::registry::Registry;
use super::render::{LineModel, bar_width, render_line};

/// Lifecycle state of a bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, strum::EnumIs)]
#[serde(rename_all = "snake_case")]
pub enum BarState {
    /// Still accepting progress (default).
    #[default]
    Active,
    /// Reached its total or was finished explicitly. Only
    /// [`ProgressBar::reset`] leads back to [`BarState::Active`].
    Complete,
}

/// A rich display that renders bars outside the terminal, e.g. a notebook
/// widget.
///
/// Implementations receive a [`BarSnapshot`] on every redraw and decide how to
/// present it.
pub trait RichDisplay: Send {
    /// Shows the bar's current state.
    fn show(&mut self, bar: &BarSnapshot);
    /// Hides the widget. Called on finish when the bar does not `leave`.
    fn close(&mut self);
    /// Makes the widget visible again. Called on reset.
    fn open(&mut self);
}

/// Point-in-time view of a bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSnapshot {
    pub prefix: String,
    pub suffix: String,
    pub progress: u64,
    pub total: u64,
    /// Items per second at the last redraw.
    pub rate: f64,
    pub elapsed_secs: f64,
    pub remaining_secs: f64,
    pub state: BarState,
    /// Line offset in the terminal registry, for terminal bars.
    pub line_offset: Option<usize>,
}

enum Sink {
    Terminal {
        registry: Arc<Registry>,
        line_offset: usize,
    },
    Rich(Mutex<Box<dyn RichDisplay>>),
    Headless,
}

/// Builder for creating progress bars.
#[must_use]
pub struct ProgressBarBuilder {
    total: u64,
    prefix: String,
    suffix: String,
    glyphs: BarGlyphs,
    minimum_interval: Option<Duration>,
    leave: bool,
    backend: Option<Backend>,
    registry: Option<Arc<Registry>>,
    rich_display: Option<Box<dyn RichDisplay>>,
}

impl fmt::Debug for ProgressBarBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBarBuilder")
            .field("total", &self.total)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("glyphs", &self.glyphs)
            .field("minimum_interval", &self.minimum_interval)
            .field("leave", &self.leave)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl ProgressBarBuilder {
    /// Creates a builder for a bar counting up to `total`.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            prefix: String::new(),
            suffix: String::new(),
            glyphs: BarGlyphs::default(),
            minimum_interval: None,
            leave: true,
            backend: None,
            registry: None,
            rich_display: None,
        }
    }

    /// Sets the label drawn before the bar.
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the label drawn after the rate.
    pub fn suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the glyph for completed cells.
    pub fn fill<S: Into<String>>(mut self, fill: S) -> Self {
        self.glyphs.fill = fill.into();
        self
    }

    /// Sets the glyph for remaining cells.
    pub fn track<S: Into<String>>(mut self, track: S) -> Self {
        self.glyphs.track = track.into();
        self
    }

    /// Replaces both glyphs.
    pub fn glyphs(mut self, glyphs: BarGlyphs) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Sets the minimum spacing between redraws.
    ///
    /// Defaults to the backend's [`Backend::default_interval`]. The redraw
    /// that reaches the total is never skipped.
    pub fn minimum_interval(mut self, interval: Duration) -> Self {
        self.minimum_interval = Some(interval);
        self
    }

    /// Sets whether a rich display stays visible after the bar finishes.
    pub fn leave(mut self, leave: bool) -> Self {
        self.leave = leave;
        self
    }

    /// Sets the backend instead of using [`backend::selected`].
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the terminal registry instead of [`Registry::global`].
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attaches the display used by the [`Backend::RichDisplay`] backend.
    pub fn rich_display<D: RichDisplay + 'static>(mut self, display: D) -> Self {
        self.rich_display = Some(Box::new(display));
        self
    }

    /// Builds the bar, registering it with its terminal registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for a zero total, glyphs that
    /// are not one column wide, or a rich-display backend with no display.
    pub fn build(self) -> Result<ProgressBar> {
        if self.total == 0 {
            return Err(Error::InvalidConfiguration(
                "total must be greater than zero".into(),
            ));
        }
        self.glyphs.validate()?;
        let backend = self.backend.unwrap_or_else(backend::selected);
        let minimum_interval = self
            .minimum_interval
            .unwrap_or_else(|| backend.default_interval());

        let mut width = 0;
        let sink = match backend {
            Backend::Terminal => {
                let registry = self.registry.unwrap_or_else(Registry::global);
                width = bar_width(registry.columns(), &self.prefix, &self.suffix, self.total);
                let line_offset = registry.register();
                Sink::Terminal {
                    registry,
                    line_offset,
                }
            }
            Backend::RichDisplay => {
                let display = self.rich_display.ok_or_else(|| {
                    Error::InvalidConfiguration(
                        "the rich_display backend needs a display attached".into(),
                    )
                })?;
                Sink::Rich(Mutex::new(display))
            }
            Backend::Headless => Sink::Headless,
        };

        let bar = ProgressBar {
            total: self.total,
            prefix: self.prefix,
            suffix: self.suffix,
            glyphs: self.glyphs,
            width,
            minimum_interval,
            leave: self.leave,
            backend,
            sink,
            inner: Mutex::new(BarInner::default()),
        };
        if let Sink::Rich(display) = &bar.sink {
            let inner = bar.inner.lock().unwrap();
            display
                .lock()
                .unwrap()
                .show(&bar.snapshot_at(&inner, Instant::now()));
        }
        Ok(bar)
    }
}

#[derive(Debug, Default)]
struct BarInner {
    progress: u64,
    start: Option<Instant>,
    /// Time and progress of the last throttled redraw.
    last_render: Option<(Instant, u64)>,
    rate: f64,
    state: BarState,
}

/// A progress bar handle, safe to share between workers through an [`Arc`].
///
/// Redraws are throttled to the minimum interval, except the one that reaches
/// the total. Terminal bars redraw their own line in place without touching
/// the lines of other bars.
pub struct ProgressBar {
    total: u64,
    prefix: String,
    suffix: String,
    glyphs: BarGlyphs,
    /// Bar body width, fixed at construction.
    width: usize,
    minimum_interval: Duration,
    leave: bool,
    backend: Backend,
    sink: Sink,
    inner: Mutex<BarInner>,
}

impl ProgressBar {
    /// Shorthand for [`ProgressBarBuilder::new`].
    pub fn builder(total: u64) -> ProgressBarBuilder {
        ProgressBarBuilder::new(total)
    }

    /// Advances progress by `delta` and redraws if due.
    ///
    /// The first update of any terminal bar reserves the registry's lines.
    /// Reaching the total always redraws and then finishes the bar.
    pub fn update(&self, delta: u64) -> Result<()> {
        if let Sink::Terminal { registry, .. } = &self.sink {
            registry.reserve_lines()?;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.progress = inner.progress.saturating_add(delta);
        let now = Instant::now();
        inner.start.get_or_insert(now);

        let complete = inner.progress >= self.total;
        let due = match inner.last_render {
            Some((last_time, _)) => {
                now.saturating_duration_since(last_time) >= self.minimum_interval
            }
            None => true,
        };
        if due || complete {
            inner.rate = estimate_rate(now, inner.progress, inner.last_render);
            self.draw_locked(&inner, now)?;
            inner.last_render = Some((now, inner.progress));
        }
        if complete {
            self.finish_locked(&mut inner)?;
        }
        Ok(())
    }

    /// Advances progress by one.
    pub fn inc(&self) -> Result<()> {
        self.update(1)
    }

    /// Redraws immediately, ignoring the throttle. The rate is not
    /// recomputed.
    pub fn draw(&self) -> Result<()> {
        let inner = self.inner.lock().unwrap();
        self.draw_locked(&inner, Instant::now())
    }

    /// Marks the bar complete and moves the cursor below it.
    ///
    /// Repeated calls repeat the cursor move, which leaves the screen as it
    /// was.
    pub fn finish(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        self.finish_locked(&mut inner)
    }

    /// Zeroes progress and rate, re-arms the bar and redraws it.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        *inner = BarInner::default();
        if let Sink::Rich(display) = &self.sink {
            display.lock().unwrap().open();
        }
        self.draw_locked(&inner, Instant::now())
    }

    fn draw_locked(&self, inner: &BarInner, now: Instant) -> Result<()> {
        match &self.sink {
            Sink::Terminal {
                registry,
                line_offset,
            } => {
                let snapshot = self.snapshot_at(inner, now);
                let line = render_line(&LineModel {
                    prefix: &self.prefix,
                    suffix: &self.suffix,
                    progress: snapshot.progress,
                    total: self.total,
                    width: self.width,
                    glyphs: &self.glyphs,
                    elapsed: snapshot.elapsed_secs,
                    remaining: snapshot.remaining_secs,
                    rate: snapshot.rate,
                });
                registry.write_line(*line_offset, &line)?;
                diagnostics::log_frame(&line, &snapshot);
            }
            Sink::Rich(display) => {
                display.lock().unwrap().show(&self.snapshot_at(inner, now));
            }
            Sink::Headless => {}
        }
        Ok(())
    }

    fn finish_locked(&self, inner: &mut BarInner) -> Result<()> {
        inner.state = BarState::Complete;
        match &self.sink {
            Sink::Terminal {
                registry,
                line_offset,
            } => registry.move_below(*line_offset)?,
            Sink::Rich(display) => {
                if !self.leave {
                    display.lock().unwrap().close();
                }
            }
            Sink::Headless => {}
        }
        Ok(())
    }

    fn snapshot_at(&self, inner: &BarInner, now: Instant) -> BarSnapshot {
        let elapsed = inner
            .start
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        BarSnapshot {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            progress: inner.progress,
            total: self.total,
            rate: inner.rate,
            elapsed_secs: elapsed.as_secs_f64(),
            remaining_secs: eta(self.total, inner.progress, inner.rate),
            state: inner.state,
            line_offset: self.line_offset(),
        }
    }

    /// Returns a snapshot of the bar's current state.
    #[must_use]
    pub fn snapshot(&self) -> BarSnapshot {
        let inner = self.inner.lock().unwrap();
        self.snapshot_at(&inner, Instant::now())
    }

    /// Cumulative progress, which may exceed the total.
    #[must_use]
    pub fn progress(&self) -> u64 {
        self.inner.lock().unwrap().progress
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Items per second measured between the last two redraws.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.inner.lock().unwrap().rate
    }

    /// Time since the first update.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.inner
            .lock()
            .unwrap()
            .start
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Estimated time until the total is reached.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        let secs = eta(self.total, inner.progress, inner.rate);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    #[must_use]
    pub fn state(&self) -> BarState {
        self.inner.lock().unwrap().state
    }

    /// Returns `true` once the bar has reached its total or been finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state().is_complete()
    }

    /// Fixed line offset among the registry's bars, for terminal bars.
    #[must_use]
    pub fn line_offset(&self) -> Option<usize> {
        match &self.sink {
            Sink::Terminal { line_offset, .. } => Some(*line_offset),
            _ => None,
        }
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Width of the bar body in terminal cells. Zero for non-terminal bars.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("ProgressBar")
            .field("prefix", &self.prefix)
            .field("progress", &inner.progress)
            .field("total", &self.total)
            .field("state", &inner.state)
            .field("backend", &self.backend)
            .field("line_offset", &self.line_offset())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl RichDisplay for Recorder {
        fn show(&mut self, bar: &BarSnapshot) {
            self.0
                .lock()
                .unwrap()
                .push(format!("show {}/{}", bar.progress, bar.total));
        }
        fn close(&mut self) {
            self.0.lock().unwrap().push("close".into());
        }
        fn open(&mut self) {
            self.0.lock().unwrap().push("open".into());
        }
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn headless(total: u64) -> ProgressBar {
        ProgressBar::builder(total)
            .backend(Backend::Headless)
            .minimum_interval(Duration::ZERO)
            .build()
            .unwrap()
    }

    #[test]
    fn test_zero_total_rejected() {
        let err = ProgressBar::builder(0)
            .backend(Backend::Headless)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rich_display_requires_display() {
        let err = ProgressBar::builder(10)
            .backend(Backend::RichDisplay)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_wide_fill_rejected() {
        let err = ProgressBar::builder(10)
            .backend(Backend::Headless)
            .fill("##")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_new_bar_is_idle() {
        let bar = headless(100);
        assert_eq!(bar.progress(), 0);
        assert_eq!(bar.total(), 100);
        assert_eq!(bar.rate(), 0.0);
        assert_eq!(bar.elapsed(), Duration::ZERO);
        assert_eq!(bar.remaining(), Duration::ZERO);
        assert!(bar.state().is_active());
        assert_eq!(bar.line_offset(), None);
        assert_eq!(bar.width(), 0);
    }

    #[test]
    fn test_default_interval_follows_backend() {
        let bar = ProgressBar::builder(5)
            .backend(Backend::Headless)
            .build()
            .unwrap();
        assert_eq!(bar.minimum_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_headless_counts_and_completes() {
        let bar = headless(10);
        bar.update(4).unwrap();
        bar.inc().unwrap();
        assert_eq!(bar.progress(), 5);
        assert!(!bar.is_complete());
        bar.update(5).unwrap();
        assert!(bar.is_complete());
    }

    #[test]
    fn test_overshoot_is_accepted() {
        let bar = headless(10);
        bar.update(25).unwrap();
        assert_eq!(bar.progress(), 25);
        assert!(bar.is_complete());
        assert_eq!(bar.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_reset_rearms() {
        let bar = headless(10);
        bar.update(10).unwrap();
        assert!(bar.is_complete());
        bar.reset().unwrap();
        assert_eq!(bar.progress(), 0);
        assert_eq!(bar.rate(), 0.0);
        assert!(bar.state().is_active());
    }

    #[test]
    fn test_rate_after_second_redraw() {
        let bar = headless(1000);
        bar.update(10).unwrap();
        assert_eq!(bar.rate(), 0.0);
        std::thread::sleep(Duration::from_millis(20));
        bar.update(10).unwrap();
        assert!(bar.rate() > 0.0);
        assert!(bar.remaining() > Duration::ZERO);
    }

    #[test]
    fn test_rich_display_lifecycle() {
        let recorder = Recorder::default();
        let bar = ProgressBar::builder(10)
            .backend(Backend::RichDisplay)
            .rich_display(recorder.clone())
            .minimum_interval(Duration::ZERO)
            .leave(false)
            .build()
            .unwrap();
        bar.update(4).unwrap();
        bar.update(6).unwrap();
        bar.reset().unwrap();
        assert_eq!(
            recorder.events(),
            vec!["show 0/10", "show 4/10", "show 10/10", "close", "open", "show 0/10"]
        );
    }

    #[test]
    fn test_rich_display_leave_keeps_widget() {
        let recorder = Recorder::default();
        let bar = ProgressBar::builder(3)
            .backend(Backend::RichDisplay)
            .rich_display(recorder.clone())
            .build()
            .unwrap();
        bar.update(3).unwrap();
        bar.finish().unwrap();
        assert!(!recorder.events().contains(&"close".to_string()));
        assert_eq!(recorder.events().last().unwrap(), "show 3/3");
    }

    #[test]
    fn test_rich_display_default_interval() {
        let bar = ProgressBar::builder(3)
            .backend(Backend::RichDisplay)
            .rich_display(Recorder::default())
            .build()
            .unwrap();
        assert_eq!(bar.minimum_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_snapshot() {
        let bar = ProgressBar::builder(8)
            .prefix("Files:")
            .suffix("done")
            .backend(Backend::Headless)
            .build()
            .unwrap();
        bar.update(2).unwrap();
        let snapshot = bar.snapshot();
        assert_eq!(snapshot.prefix, "Files:");
        assert_eq!(snapshot.suffix, "done");
        assert_eq!(snapshot.progress, 2);
        assert_eq!(snapshot.total, 8);
        assert_eq!(snapshot.state, BarState::Active);
        assert_eq!(snapshot.line_offset, None);
    }

    #[test]
    fn test_bar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProgressBar>();
    }
}
