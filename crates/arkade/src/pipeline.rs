//! Per-frame gesture interpretation.
//!
//! [`GesturePipeline`] owns every piece of gesture state. The tracker feeds
//! it with [`GesturePipeline::on_frame`] and the render loop drives the
//! animations with [`GesturePipeline::on_tick`]; both take the current time
//! in milliseconds so timing can be replayed deterministically. Results go
//! out through a [`UiSink`].

use crate::calibration::{Calibration, CalibrationOutcome};
use crate::config::{Config, MenuLossPolicy};
use crate::control::{Channel, ChannelValue, ControlSurface, DistanceRange};
use crate::events::TrackingFrame;
use crate::gesture::{
    DetectedHand, GestureEvent, LongPress, LongPressAction, PinchUpdate, PositioningAdvisory,
    ThumbsUpDetector, TwoHandPinch,
};
use crate::menu::{MenuPhase, MenuVisual, RadialMenu};
use crate::mode::Mode;
use crate::sink::{UiSink, WarningVisual};
use crate::smoothing::{SampleBuffer, Snapshot};
use handmark::Handedness;
use handmark::geometry::pinch_midpoint;
use handmark::landmark::INDEX_TIP;
use handmark::pose::orientation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub events: Vec<GestureEvent>,
    /// The channel that received a measurement this frame, if any.
    pub routed: Option<Channel>,
}

pub struct GesturePipeline<S: UiSink> {
    config: Config,
    sink: S,
    started_at: f64,
    last_detection: Option<f64>,
    buffer: SampleBuffer,
    hands: Vec<DetectedHand>,
    mode: Mode,
    pinch: TwoHandPinch,
    long_press: LongPress,
    thumbs_up: ThumbsUpDetector,
    advisory: PositioningAdvisory,
    menu: RadialMenu,
    /// Pending close of a menu whose hand left the frame.
    grace_deadline: Option<f64>,
    controls: ControlSurface,
    calibration: Calibration,
    calibrated: bool,
    panning_active: bool,
    warning: WarningVisual,
}

impl<S: UiSink> GesturePipeline<S> {
    pub fn new(config: Config, mut sink: S, started_at: f64) -> Self {
        let mode = config.initial_mode;
        let controls = ControlSurface::new(&config);

        sink.set_mode(mode);
        for channel in [Channel::Volume, Channel::Reverb, Channel::Panning] {
            sink.set_channel_value(channel, controls.value(channel));
        }

        Self {
            buffer: SampleBuffer::new(config.tracking.buffer_size, config.tracking.weighting),
            long_press: LongPress::new(
                config.timing.menu_open_delay_ms,
                config.timing.long_press_duration_ms,
            ),
            thumbs_up: ThumbsUpDetector::new(
                config.timing.gesture_cooldown_ms,
                config.thumbs_up.strict,
            ),
            advisory: PositioningAdvisory::new(
                config.advisory.show_delay_ms,
                config.advisory.hide_delay_ms,
            ),
            menu: RadialMenu::new(config.menu.clone()),
            calibration: Calibration::new(config.calibration.clone()),
            controls,
            sink,
            started_at,
            last_detection: None,
            hands: Vec::new(),
            mode,
            pinch: TwoHandPinch::default(),
            grace_deadline: None,
            calibrated: false,
            panning_active: false,
            warning: WarningVisual::default(),
            config,
        }
    }

    /// Interprets one tracking frame.
    pub fn on_frame(&mut self, frame: TrackingFrame, now: f64) -> FrameReport {
        let mut report = FrameReport::default();
        if now - self.started_at < self.config.tracking.warmup_ms {
            return report;
        }

        if frame.is_empty() {
            self.lose_tracking(now, &mut report.events);
            self.publish_warning();
            return report;
        }

        self.last_detection = Some(now);
        if self.grace_deadline.take().is_some() {
            log::debug!("Hand back before the menu grace period ran out");
        }

        self.buffer.push(Snapshot::new(frame.hands, now));
        let threshold = self.config.pinch.threshold;
        self.hands = self
            .buffer
            .stable()
            .into_iter()
            .take(self.config.tracking.max_hands)
            .map(|sample| DetectedHand {
                pinching: threshold.is_pinching(&sample.landmarks),
                sample,
            })
            .collect();

        let left = self.hand(Handedness::Left).cloned();
        let right = self.hand(Handedness::Right).cloned();
        let two_hand_pinch = self.mode.uses_two_hand_pinch()
            && self.hands.len() == 2
            && self.hands.iter().all(|h| h.pinching);

        match &right {
            Some(hand) if !two_hand_pinch => self.drive_menu(hand, now, &mut report.events),
            _ => {
                // only an open menu waits for the hand; a half-done press restarts
                let waiting_for_hand = right.is_none()
                    && self.menu.is_open()
                    && matches!(self.config.menu.loss_policy, MenuLossPolicy::Grace { .. });
                if !waiting_for_hand {
                    self.long_press.reset();
                    self.dismiss_menu(&mut report.events);
                }
            }
        }

        if !self.menu.is_active()
            && let Some(hand) = &left
            && self.thumbs_up.update(&hand.sample.landmarks, now)
        {
            log::info!("Thumbs up");
            report.events.push(GestureEvent::ThumbsUp);
        }

        let tilt = self.config.advisory.tilt_threshold_deg;
        let left_pose = left.as_ref().map(|h| orientation(&h.sample.landmarks, tilt));
        let right_pose = right.as_ref().map(|h| orientation(&h.sample.landmarks, tilt));
        match self.advisory.update(left_pose, right_pose, now) {
            Some(true) => report.events.push(GestureEvent::WarningShown),
            Some(false) => report.events.push(GestureEvent::WarningHidden),
            None => {}
        }

        report.routed = match self.mode {
            Mode::Volume | Mode::Reverb => self.process_two_hand(&mut report.events),
            Mode::Panning => self.process_panning(left.as_ref(), &mut report.events),
            Mode::Equalizer | Mode::Wobble => {
                self.release_pinch(&mut report.events);
                None
            }
        };

        self.publish_warning();
        report
    }

    /// Advances timers and animations by one rendered frame.
    pub fn on_tick(&mut self, now: f64) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        if let Some(last) = self.last_detection
            && now - last > self.config.tracking.timeout_ms
        {
            log::debug!("No hands for {:.0}ms", now - last);
            self.lose_tracking(now, &mut events);
            self.publish_warning();
        }

        if let Some(deadline) = self.grace_deadline
            && now >= deadline
        {
            self.grace_deadline = None;
            self.long_press.reset();
            self.dismiss_menu(&mut events);
        }

        match self.calibration.poll(now) {
            Some(CalibrationOutcome::Range(range)) => {
                log::info!("Calibrated hand distance {:.0}..{:.0}px", range.min, range.max);
                self.controls.set_range(range);
                self.calibrated = true;
                events.push(GestureEvent::CalibrationFinished {
                    min: range.min,
                    max: range.max,
                });
            }
            Some(CalibrationOutcome::NoSamples) => {
                let range = self.controls.range();
                log::warn!(
                    "Calibration saw no two-hand pinch, keeping {:.0}..{:.0}px",
                    range.min,
                    range.max
                );
            }
            None => {}
        }

        let was_active = self.menu.is_active();
        if self.menu.update(now) == Some(MenuPhase::Closed) {
            events.push(GestureEvent::MenuClosed);
        }
        if was_active || self.menu.is_active() {
            self.sink.set_menu_visual(&self.menu.visual());
        }

        for (channel, value) in self.controls.advance(self.pinch.is_active()) {
            self.sink.set_channel_value(channel, value);
        }
        let visuals = self.controls.step_visuals();
        self.sink.set_visuals(&visuals);

        events
    }

    fn hand(&self, handedness: Handedness) -> Option<&DetectedHand> {
        self.hands.iter().find(|h| h.handedness() == handedness)
    }

    fn drive_menu(&mut self, hand: &DetectedHand, now: f64, events: &mut Vec<GestureEvent>) {
        let position = pinch_midpoint(&hand.sample.landmarks, self.config.canvas);
        match self.long_press.update(hand.pinching, position, now) {
            LongPressAction::None => {}
            LongPressAction::Armed => events.push(GestureEvent::LongPressArmed),
            LongPressAction::Started => {
                log::debug!("Long press started");
                events.push(GestureEvent::LongPressStarted);
            }
            LongPressAction::Cancelled => log::debug!("Long press cancelled"),
            LongPressAction::Open(center) => {
                if self.menu.open(center, now) {
                    events.push(GestureEvent::MenuOpened { center });
                }
            }
            LongPressAction::Drag(position) => self.menu.drag_to(position, now),
            LongPressAction::Release => {
                // the selection is applied before the menu starts closing
                let selection = self.menu.selection();
                if let Some(mode) = selection {
                    self.switch_mode(mode, events);
                }
                self.menu.release(now);
                events.push(GestureEvent::MenuReleased { selection });
            }
        }
    }

    fn dismiss_menu(&mut self, events: &mut Vec<GestureEvent>) {
        if self.menu.is_open() {
            self.menu.close();
            events.push(GestureEvent::MenuDismissed);
        }
    }

    fn process_two_hand(&mut self, events: &mut Vec<GestureEvent>) -> Option<Channel> {
        let update = self.pinch.update(&self.hands, self.config.canvas);
        match update {
            PinchUpdate::Started(distance) => events.push(GestureEvent::PinchStarted { distance }),
            PinchUpdate::Released => events.push(GestureEvent::PinchReleased),
            PinchUpdate::Idle | PinchUpdate::Holding(_) => {}
        }

        let distance = update.distance()?;
        if self.calibration.is_active() {
            self.calibration.record(distance);
            return None;
        }

        let channel = Channel::for_mode(self.mode)?;
        let value = self.controls.apply_distance(channel, distance);
        self.sink.set_channel_value(channel, value);
        Some(channel)
    }

    fn process_panning(
        &mut self,
        left: Option<&DetectedHand>,
        events: &mut Vec<GestureEvent>,
    ) -> Option<Channel> {
        self.release_pinch(events);

        let Some(hand) = left else {
            self.panning_active = false;
            return None;
        };

        let fingertip = hand.sample.landmarks[INDEX_TIP];
        let value = self.controls.apply_pan(&fingertip, self.config.canvas);
        self.panning_active = true;
        self.sink.set_channel_value(Channel::Panning, value);
        Some(Channel::Panning)
    }

    fn release_pinch(&mut self, events: &mut Vec<GestureEvent>) {
        if self.pinch.release() {
            events.push(GestureEvent::PinchReleased);
        }
    }

    /// Resets everything tied to the hands currently in view.
    fn lose_tracking(&mut self, now: f64, events: &mut Vec<GestureEvent>) {
        let was_tracking = self.last_detection.take().is_some();

        self.buffer.clear();
        self.hands.clear();
        self.release_pinch(events);
        self.thumbs_up.reset();
        self.advisory.reset();
        self.panning_active = false;

        match self.config.menu.loss_policy {
            MenuLossPolicy::Grace { ms } if self.menu.is_open() => {
                self.grace_deadline.get_or_insert(now + ms);
            }
            _ => {
                self.long_press.reset();
                self.dismiss_menu(events);
            }
        }

        if was_tracking {
            log::debug!("Tracking lost");
            events.push(GestureEvent::TrackingLost);
        }
    }

    fn switch_mode(&mut self, mode: Mode, events: &mut Vec<GestureEvent>) {
        if mode == self.mode {
            return;
        }
        log::info!("Mode changed: {} -> {}", self.mode, mode);
        self.mode = mode;
        self.release_pinch(events);
        self.panning_active = false;
        self.sink.set_mode(mode);
        events.push(GestureEvent::ModeChanged(mode));
    }

    fn publish_warning(&mut self) {
        let warning = self.advisory.warning();
        let visual = WarningVisual {
            visible: warning.active && !self.pinch.is_active() && !self.menu.is_active(),
            severity: warning.severity,
            left_tilted: warning.left_tilted,
            right_tilted: warning.right_tilted,
        };
        self.warning = visual;
        self.sink.set_warning(&visual);
    }

    /// Switches mode from outside the gesture flow, e.g. a keyboard shortcut.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        self.switch_mode(mode, &mut events);
        events
    }

    pub fn start_calibration(&mut self, now: f64) {
        self.calibration.start(now);
    }

    pub fn calibration_progress(&self, now: f64) -> Option<f64> {
        self.calibration.progress(now)
    }

    /// Fill of the long-press progress ring.
    pub fn long_press_progress(&self, now: f64) -> Option<f64> {
        self.long_press.progress(now)
    }

    /// Applies a reloaded configuration. Mode, channel values and a
    /// calibrated range survive.
    pub fn reconfigure(&mut self, config: Config) {
        log::info!("Applying new configuration");
        self.buffer
            .reconfigure(config.tracking.buffer_size, config.tracking.weighting);
        self.long_press.set_timing(
            config.timing.menu_open_delay_ms,
            config.timing.long_press_duration_ms,
        );
        self.thumbs_up
            .configure(config.timing.gesture_cooldown_ms, config.thumbs_up.strict);
        self.advisory
            .set_delays(config.advisory.show_delay_ms, config.advisory.hide_delay_ms);
        self.menu.set_style(config.menu.clone());
        self.calibration.set_config(config.calibration.clone());
        self.controls.reconfigure(&config, self.calibrated);
        self.config = config;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn hands(&self) -> &[DetectedHand] {
        &self.hands
    }

    pub fn is_two_hand_pinching(&self) -> bool {
        self.pinch.is_active()
    }

    /// Hand separation latched when the current two-hand pinch began.
    pub fn pinch_start_distance(&self) -> Option<f64> {
        self.pinch.start_distance()
    }

    /// Hand separation measured on the latest frame of a two-hand pinch.
    pub fn pinch_distance(&self) -> Option<f64> {
        self.pinch.last_distance()
    }

    pub fn is_panning_active(&self) -> bool {
        self.panning_active
    }

    pub fn is_tracking(&self) -> bool {
        self.last_detection.is_some()
    }

    pub fn menu_visual(&self) -> MenuVisual {
        self.menu.visual()
    }

    pub fn warning(&self) -> WarningVisual {
        self.warning
    }

    pub fn channel_value(&self, channel: Channel) -> ChannelValue {
        self.controls.value(channel)
    }

    pub fn distance_range(&self) -> DistanceRange {
        self.controls.range()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
