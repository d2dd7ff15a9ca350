use crate::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Two-state frame driver.
///
/// Time is measured from the clock reading at [`start`](Self::start) and is
/// never allowed to decrease, even if the clock does.
pub struct FrameDriver {
    state: RunState,
    clock: Box<dyn Clock>,
    origin: f64,
    time: f64,
    frames: u64,
}

impl std::fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver")
            .field("state", &self.state)
            .field("time", &self.time)
            .field("frames", &self.frames)
            .finish()
    }
}

impl FrameDriver {
    /// A stopped driver reading `clock`.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            state: RunState::Stopped,
            clock,
            origin: 0.0,
            time: 0.0,
            frames: 0,
        }
    }

    /// Enter `Running` and take the current clock reading as time zero.
    pub fn start(&mut self) {
        self.origin = self.clock.elapsed();
        self.time = 0.0;
        self.frames = 0;
        self.state = RunState::Running;
    }

    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Advance one frame. Returns the elapsed time, or `None` when stopped.
    pub fn tick(&mut self) -> Option<f64> {
        if !self.is_running() {
            return None;
        }
        let now = self.clock.elapsed() - self.origin;
        self.time = self.time.max(now);
        self.frames += 1;
        Some(self.time)
    }

    /// Time returned by the last tick.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
