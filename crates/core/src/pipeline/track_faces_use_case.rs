use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::actuator::domain::actuator_link::ActuatorLink;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::tracking::domain::command::{Command, CommandKind};
use crate::tracking::domain::loss_timer::TrackingState;
use crate::tracking::domain::tracking_controller::TrackingController;
use crate::video::domain::frame_source::FrameSource;

use super::debug_overlay::DebugOverlay;
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};

/// Why the loop stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The abort flag was raised.
    Aborted,
    /// The configured frame limit was reached.
    FrameLimit,
    /// The frame source failed or ran dry.
    CaptureFailed(String),
}

/// Counters for one run of the loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub steer_sent: usize,
    pub center_sent: usize,
    pub failed_writes: usize,
    pub stop_sent: bool,
    pub termination: Option<Termination>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            frames: 0,
            steer_sent: 0,
            center_sent: 0,
            failed_writes: 0,
            stop_sent: false,
            termination: None,
        }
    }
}

/// The capture → detect → decide → transmit loop.
///
/// Owns the frame source and the actuator link for their whole lifetime.
/// However the loop ends (abort, frame limit, capture failure, or a panic
/// unwinding through it) the link gets one best-effort `STOP` and both
/// devices are closed, in that order.
pub struct TrackFacesUseCase {
    source: Box<dyn FrameSource>,
    detector: Box<dyn FaceDetector>,
    link: Box<dyn ActuatorLink>,
    controller: TrackingController,
    overlay: Option<DebugOverlay>,
    logger: Box<dyn PipelineLogger>,
    cancelled: Arc<AtomicBool>,
    max_frames: Option<usize>,
    summary: RunSummary,
    last_state: Option<TrackingState>,
    shut_down: bool,
}

impl TrackFacesUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn FaceDetector>,
        link: Box<dyn ActuatorLink>,
        controller: TrackingController,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            detector,
            link,
            controller,
            overlay: None,
            logger: Box::new(NullPipelineLogger),
            cancelled,
            max_frames: None,
            summary: RunSummary::new(),
            last_state: None,
            shut_down: false,
        }
    }

    pub fn with_overlay(mut self, overlay: DebugOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Runs until aborted, the frame limit, or a capture failure, then
    /// shuts down. Single use: the devices are closed afterwards.
    pub fn execute(&mut self) -> Result<RunSummary, Box<dyn std::error::Error>> {
        if self.shut_down {
            return Err("Tracking loop already finished".into());
        }

        let termination = loop {
            if self.cancelled.load(Ordering::Relaxed) {
                log::info!("Abort requested");
                break Termination::Aborted;
            }
            if self.max_frames.is_some_and(|max| self.summary.frames >= max) {
                break Termination::FrameLimit;
            }

            let started = Instant::now();
            let frame = match self.source.read() {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Camera read failed: {e}");
                    break Termination::CaptureFailed(e.to_string());
                }
            };
            self.logger.timing("capture", elapsed_ms(started));
            self.process(frame);
        };

        self.summary.termination = Some(termination);
        self.shutdown();
        Ok(self.summary.clone())
    }

    fn process(&mut self, mut frame: Frame) {
        let started = Instant::now();
        let regions = self.detector.detect(&frame).unwrap_or_else(|e| {
            log::warn!("Face detection failed on frame {}: {e}", frame.index());
            Vec::new()
        });
        self.logger.timing("detect", elapsed_ms(started));
        self.logger.metric("faces", regions.len() as f64);

        let decision = self.controller.tick(&regions, frame.center_x());
        if self.last_state != Some(decision.state) {
            log::info!("Tracking state: {:?}", decision.state);
            self.last_state = Some(decision.state);
        }

        if let Some(command) = decision.command {
            let started = Instant::now();
            self.transmit(command);
            self.logger.timing("transmit", elapsed_ms(started));
        }

        if let Some(overlay) = self.overlay.as_mut() {
            overlay.render(&mut frame, decision.target.as_ref());
        }

        self.summary.frames += 1;
        self.logger.frame(frame.index());
    }

    /// One attempt, no retry: the next frame re-evaluates anyway.
    fn transmit(&mut self, command: Command) {
        match self.link.send(&command) {
            Ok(()) => {
                log::debug!("Sent {}", command.to_string().trim_end());
                match command.kind() {
                    CommandKind::Steer => self.summary.steer_sent += 1,
                    CommandKind::Center => self.summary.center_sent += 1,
                    CommandKind::Stop => {}
                }
            }
            Err(e) => {
                self.summary.failed_writes += 1;
                log::warn!("Actuator write failed: {e}");
            }
        }
    }

    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        match self.link.send(&Command::Stop) {
            Ok(()) => {
                self.summary.stop_sent = true;
                log::info!("Sent STOP");
            }
            Err(e) => log::warn!("Could not send STOP: {e}"),
        }
        self.link.close();
        self.source.close();
        self.logger.summary();
    }
}

impl Drop for TrackFacesUseCase {
    fn drop(&mut self) {
        if !self.shut_down {
            log::warn!("Tracking loop dropped before shutdown; stopping actuator");
            self.shutdown();
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
