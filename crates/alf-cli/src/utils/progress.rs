use alfkit::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders core progress events as an `indicatif` spinner while a phase
/// (compile, run, analysis) runs and as a bar while files are analysed.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state without drawing anything.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_style(Self::spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb_guard.disable_steady_tick();
                    let phase = pb_guard.message();
                    pb_guard.finish_with_message(format!("{phase} done"));
                }
                Progress::TaskStart { total_steps } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.set_length(total_steps);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                }
                Progress::TaskIncrement => {
                    pb_guard.inc(1);
                }
                Progress::TaskFinish => {
                    let length = pb_guard.length().unwrap_or(0);
                    if pb_guard.position() < length {
                        pb_guard.set_position(length);
                    }
                }
                Progress::Message(msg) => {
                    if pb_guard.is_finished() {
                        pb_guard.set_message(msg);
                    } else {
                        pb_guard.println(format!("  {msg}"));
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn analysis_phase_drives_the_bar() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Analysis" });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Analysis");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 3 });
        callback(Progress::TaskIncrement);
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(3));
            assert_eq!(pb.position(), 1);
        }

        callback(Progress::TaskFinish);
        assert_eq!(handler.pb.lock().unwrap().position(), 3);

        callback(Progress::PhaseFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.message(), "Analysis done");
        }
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Run" });
            callback(Progress::Message("ALF.out started".to_string()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "Run done");
    }
}
