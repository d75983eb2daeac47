use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use sccg::matching::Mode;
use sccg::progress::{ByteNum, ProgressNotifier};

#[derive(Debug)]
struct SccgProgressBarState {
    length: u64,
    initialized: bool,
}

impl SccgProgressBarState {
    fn new() -> Self {
        Self {
            length: 0,
            initialized: false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SccgProgressBar {
    bar: ProgressBar,
    state: Arc<Mutex<SccgProgressBarState>>,
}

impl SccgProgressBar {
    pub fn new() -> SccgProgressBar {
        let init_bar = ProgressBar::hidden();
        init_bar.set_style(ProgressStyle::default_spinner());
        init_bar.enable_steady_tick(Duration::from_millis(50));
        init_bar.set_message("Loading sequences...");

        Self {
            bar: init_bar,
            state: Arc::new(Mutex::new(SccgProgressBarState::new())),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    #[inline]
    fn init(&self) {
        let mut state = self.state.lock().unwrap();
        if state.initialized {
            return;
        }

        self.bar.set_position(0);
        if state.length == 0 {
            self.bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {pos} bases ({per_sec}) {msg}")
                    .expect("Invalid progress bar template"),
            );
        } else {
            self.bar.set_length(state.length);
            self.bar.set_style(
                ProgressStyle::default_bar()
                    .template("{wide_bar} {pos}/{len} bases [ETA {eta}] {msg}")
                    .expect("Invalid progress bar template"),
            );
        }
        state.initialized = true;
    }

    pub fn set_length(&self, length: u64) {
        let mut state = self.state.lock().unwrap();

        state.initialized = false;
        state.length = length;
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl ProgressNotifier for SccgProgressBar {
    fn set_total_bases(&self, total: ByteNum) {
        self.set_length(total.get() as u64);
        self.init();
    }

    fn processed_bases(&self, bases: ByteNum) {
        self.init();
        self.bar.inc(bases.get() as u64);
    }

    fn mode_changed(&self, mode: Mode) {
        self.bar.set_message(format!("({} mode)", mode));
    }
}
