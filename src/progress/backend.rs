//! Backend selection for progress display.
//!
//! The backend is resolved once per process and handed to each bar when it is
//! built; bars never probe the environment themselves.

use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use console::Term;

/// Where a bar draws itself.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum::Display,
    strum::EnumIs,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Backend {
    /// In-place redraw on an ANSI terminal using cursor addressing.
    Terminal,
    /// An external rich display (e.g. a notebook widget) supplied by the
    /// caller as a [`RichDisplay`](super::RichDisplay).
    RichDisplay,
    /// Counters and rates are tracked but nothing is drawn.
    Headless,
}

impl Backend {
    /// Default minimum spacing between redraws for this backend.
    #[must_use]
    pub fn default_interval(&self) -> Duration {
        match self {
            Backend::RichDisplay => Duration::from_millis(10),
            Backend::Terminal | Backend::Headless => Duration::from_millis(100),
        }
    }

    /// Picks a backend from the environment.
    ///
    /// `STACKBAR_NO_PROGRESS=1` selects [`Backend::Headless`], then a valid
    /// `STACKBAR_BACKEND` value wins. Otherwise stdout decides: a terminal gets
    /// [`Backend::Terminal`], anything else [`Backend::Headless`].
    #[must_use]
    pub fn detect() -> Self {
        env_backend().unwrap_or_else(|| {
            if Term::stdout().is_term() {
                Backend::Terminal
            } else {
                Backend::Headless
            }
        })
    }
}

static ENV_BACKEND: OnceLock<Option<Backend>> = OnceLock::new();
static DETECTED: OnceLock<Backend> = OnceLock::new();
static SELECTED: Mutex<Option<Backend>> = Mutex::new(None);

/// Checks if an environment variable is set to a truthy value ("1" or "true").
fn check_env_bool(var_name: &str) -> bool {
    std::env::var(var_name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_env_backend(no_progress: bool, value: Option<&str>) -> Option<Backend> {
    if no_progress {
        return Some(Backend::Headless);
    }
    value.and_then(|v| Backend::from_str(v.trim()).ok())
}

/// Backend forced through `STACKBAR_NO_PROGRESS` or `STACKBAR_BACKEND`.
fn env_backend() -> Option<Backend> {
    *ENV_BACKEND.get_or_init(|| {
        parse_env_backend(
            check_env_bool("STACKBAR_NO_PROGRESS"),
            std::env::var("STACKBAR_BACKEND").ok().as_deref(),
        )
    })
}

/// Sets the backend used by bars built without an explicit one.
///
/// This should be called before building any bars. Environment overrides
/// still take precedence.
pub fn set_backend(backend: Backend) {
    *SELECTED.lock().unwrap() = Some(backend);
}

/// Returns the backend for bars built without an explicit one.
#[must_use]
pub fn selected() -> Backend {
    if let Some(backend) = env_backend() {
        return backend;
    }
    if let Some(backend) = *SELECTED.lock().unwrap() {
        return backend;
    }
    *DETECTED.get_or_init(Backend::detect)
}
