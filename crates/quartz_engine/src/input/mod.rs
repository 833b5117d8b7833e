//! Gamepad-style input sampled once per frame
//!
//! Input arrives through the [`InputSource`] trait so the engine never
//! talks to a device API directly. [`InputState`] keeps the previous and
//! current frame's samples per logical slot and derives edge events from
//! the pair. The in-repo [`ScriptedInput`] source replays a prerecorded
//! frame sequence for tests and the demo binary.

/// Number of logical input slots the engine samples
pub const MAX_SLOTS: usize = 5;

/// Digital buttons on a logical pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// D-pad up
    DpadUp,
    /// D-pad down
    DpadDown,
    /// D-pad left
    DpadLeft,
    /// D-pad right
    DpadRight,
    /// Start button
    Start,
    /// Back button
    Back,
    /// Left stick click
    LeftThumb,
    /// Right stick click
    RightThumb,
    /// Left shoulder bumper
    LeftShoulder,
    /// Right shoulder bumper
    RightShoulder,
    /// Face button A
    A,
    /// Face button B
    B,
    /// Face button X
    X,
    /// Face button Y
    Y,
}

impl Button {
    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Analog axes on a logical pad
///
/// Stick axes read in [-1, 1], triggers in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left stick horizontal
    LeftStickX,
    /// Left stick vertical
    LeftStickY,
    /// Right stick horizontal
    RightStickX,
    /// Right stick vertical
    RightStickY,
    /// Left analog trigger
    LeftTrigger,
    /// Right analog trigger
    RightTrigger,
}

/// Number of analog axes per slot
pub const AXIS_COUNT: usize = 6;

/// One slot's raw state for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlotSample {
    /// Whether a pad is attached to this slot
    pub connected: bool,
    buttons: u16,
    axes: [f32; AXIS_COUNT],
}

impl SlotSample {
    /// A connected sample with nothing held
    #[must_use]
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Mark a button held in this sample
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons |= button.bit();
        self
    }

    /// Set an axis value in this sample
    #[must_use]
    pub fn with_axis(mut self, axis: Axis, value: f32) -> Self {
        self.axes[axis as usize] = value;
        self
    }

    /// Whether the button is held in this sample
    #[must_use]
    pub fn is_down(&self, button: Button) -> bool {
        self.buttons & button.bit() != 0
    }

    /// The axis value in this sample
    #[must_use]
    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes[axis as usize]
    }
}

/// Provider of per-frame input samples
///
/// Implemented by platform backends outside this crate and by
/// [`ScriptedInput`] inside it.
pub trait InputSource {
    /// Sample every slot for the coming frame
    fn sample(&mut self) -> [SlotSample; MAX_SLOTS];
}

/// Double-buffered input state over all slots
///
/// Call [`InputState::update`] exactly once per frame before the game
/// update step; edge queries compare the two newest frames.
#[derive(Debug, Default)]
pub struct InputState {
    previous: [SlotSample; MAX_SLOTS],
    current: [SlotSample; MAX_SLOTS],
}

impl InputState {
    /// Fresh state with every slot disconnected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate buffers and pull the next frame from the source
    pub fn update(&mut self, source: &mut dyn InputSource) {
        self.previous = self.current;
        self.current = source.sample();
    }

    /// Whether a pad is attached to the slot
    #[must_use]
    pub fn is_connected(&self, slot: usize) -> bool {
        self.current.get(slot).is_some_and(|sample| sample.connected)
    }

    /// Whether the button is currently held
    #[must_use]
    pub fn is_down(&self, slot: usize, button: Button) -> bool {
        self.current
            .get(slot)
            .is_some_and(|sample| sample.is_down(button))
    }

    /// Whether the button went down this frame
    #[must_use]
    pub fn just_pressed(&self, slot: usize, button: Button) -> bool {
        let was_down = self
            .previous
            .get(slot)
            .is_some_and(|sample| sample.is_down(button));
        self.is_down(slot, button) && !was_down
    }

    /// Whether the button came up this frame
    #[must_use]
    pub fn just_released(&self, slot: usize, button: Button) -> bool {
        let was_down = self
            .previous
            .get(slot)
            .is_some_and(|sample| sample.is_down(button));
        was_down && !self.is_down(slot, button)
    }

    /// Current axis value, zero for out-of-range slots
    #[must_use]
    pub fn axis(&self, slot: usize, axis: Axis) -> f32 {
        self.current
            .get(slot)
            .map_or(0.0, |sample| sample.axis(axis))
    }
}

/// Input source that replays a prerecorded frame sequence
///
/// Once the recording runs out the final frame is held, so a button left
/// down in the last scripted frame stays down without retriggering edge
/// events.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<[SlotSample; MAX_SLOTS]>,
    hold: [SlotSample; MAX_SLOTS],
}

impl ScriptedInput {
    /// A source where every slot stays disconnected forever
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a source from a list of frames
    #[must_use]
    pub fn from_frames(frames: Vec<[SlotSample; MAX_SLOTS]>) -> Self {
        Self {
            frames: frames.into(),
            hold: [SlotSample::default(); MAX_SLOTS],
        }
    }

    /// Append one frame to the recording
    pub fn push_frame(&mut self, frame: [SlotSample; MAX_SLOTS]) {
        self.frames.push_back(frame);
    }

    /// Append a frame where only `slot` differs from disconnected rest
    pub fn push_slot(&mut self, slot: usize, sample: SlotSample) {
        let mut frame = [SlotSample::default(); MAX_SLOTS];
        if let Some(entry) = frame.get_mut(slot) {
            *entry = sample;
        }
        self.frames.push_back(frame);
    }

    /// Frames left in the recording
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> [SlotSample; MAX_SLOTS] {
        if let Some(frame) = self.frames.pop_front() {
            self.hold = frame;
        }
        self.hold
    }
}
