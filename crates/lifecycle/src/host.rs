use showroom_common::Viewport;

/// Capabilities the embedding environment supplies to a stage.
///
/// The desktop app implements this over a winit window; tests and the CLI
/// use [`RecordingHost`].
pub trait Host {
    /// Current logical size and pixel ratio.
    fn viewport(&self) -> Viewport;
    /// Show the drawing surface.
    fn attach_surface(&mut self);
    /// Hide the drawing surface.
    fn detach_surface(&mut self);
    /// Start delivering resize events to the stage.
    fn subscribe_resize(&mut self);
    fn unsubscribe_resize(&mut self);
    /// Ask for one more frame callback at the next display refresh.
    fn request_frame(&mut self);
}

/// One call made on a [`RecordingHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    AttachSurface,
    DetachSurface,
    SubscribeResize,
    UnsubscribeResize,
    RequestFrame,
}

/// Headless host that records every call.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    viewport: Viewport,
    calls: Vec<HostCall>,
    surface_attached: bool,
    resize_subscribed: bool,
    pending_frames: usize,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl RecordingHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            calls: Vec::new(),
            surface_attached: false,
            resize_subscribed: false,
            pending_frames: 0,
        }
    }

    /// Change the reported viewport, as a window resize would.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn count(&self, call: HostCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn surface_attached(&self) -> bool {
        self.surface_attached
    }

    pub fn resize_subscribed(&self) -> bool {
        self.resize_subscribed
    }

    /// Consume one pending frame request, as a display refresh would.
    pub fn take_frame_request(&mut self) -> bool {
        if self.pending_frames == 0 {
            return false;
        }
        self.pending_frames -= 1;
        true
    }

    pub fn pending_frames(&self) -> usize {
        self.pending_frames
    }
}

impl Host for RecordingHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn attach_surface(&mut self) {
        self.calls.push(HostCall::AttachSurface);
        self.surface_attached = true;
    }

    fn detach_surface(&mut self) {
        self.calls.push(HostCall::DetachSurface);
        self.surface_attached = false;
    }

    fn subscribe_resize(&mut self) {
        self.calls.push(HostCall::SubscribeResize);
        self.resize_subscribed = true;
    }

    fn unsubscribe_resize(&mut self) {
        self.calls.push(HostCall::UnsubscribeResize);
        self.resize_subscribed = false;
    }

    fn request_frame(&mut self) {
        self.calls.push(HostCall::RequestFrame);
        self.pending_frames += 1;
    }
}
