//! Detection pipeline
//!
//! Owns the per-frame chain landmarks -> finger states -> gesture ->
//! debounce -> route on a dedicated worker thread, and the shared
//! [`ControllerState`] the UI thread reads. The UI only ever reads device
//! state; the worker is the sole writer through `DeviceRegistry::toggle`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::camera::{CameraCapture, CameraFrame};
use crate::devices::DeviceRegistry;
use crate::gesture::debounce::GestureDebouncer;
use crate::gesture::{self, Gesture};
use crate::router::{GestureMap, GestureRouter};
use crate::tracking::{HandLandmarks, HandTracker, INPUT_SIZE};

/// Pause between worker iterations when no new frame is available.
const IDLE_POLL: Duration = Duration::from_millis(5);

/// Snapshot of the pipeline's most recent step, for the status line and
/// the preview overlay.
#[derive(Default)]
pub struct PipelineMonitor {
    pub raw_gesture: Option<Gesture>,
    pub confirmed_gesture: Option<Gesture>,
    /// Landmarks of the most recently tracked hand, if any.
    pub hand: Option<HandLandmarks>,
    /// Latest camera frame for the preview panel.
    pub preview: Option<CameraFrame>,
    pub frames_processed: u64,
    pub tracker_ready: bool,
}

impl PipelineMonitor {
    /// Clone the preview frame and hand, but only when the preview has
    /// advanced past `last_seen`. Callers polling at redraw cadence skip
    /// the pixel copy on frames they have already shown.
    pub fn preview_newer_than(
        &self,
        last_seen: u64,
    ) -> Option<(CameraFrame, Option<HandLandmarks>)> {
        match &self.preview {
            Some(frame) if frame.frame_number > last_seen => {
                Some((frame.clone(), self.hand.clone()))
            }
            _ => None,
        }
    }
}

/// Shared state crossing the worker/UI thread boundary.
///
/// The worker writes `devices` and `monitor`; the UI reads them each
/// redraw and may write `gesture_map` (customization) and
/// `debounce_window` (the stability/latency knob).
pub struct ControllerState {
    pub devices: Mutex<DeviceRegistry>,
    pub gesture_map: Mutex<GestureMap>,
    pub monitor: Mutex<PipelineMonitor>,
    pub debounce_window: AtomicUsize,
}

impl ControllerState {
    pub fn new(devices: DeviceRegistry, gesture_map: GestureMap, debounce_window: usize) -> Self {
        Self {
            devices: Mutex::new(devices),
            gesture_map: Mutex::new(gesture_map),
            monitor: Mutex::new(PipelineMonitor::default()),
            debounce_window: AtomicUsize::new(debounce_window),
        }
    }
}

/// Result of one pipeline step, reported into the monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub raw: Option<Gesture>,
    pub confirmed: Option<Gesture>,
    /// True when a device was toggled this step.
    pub fired: bool,
}

/// One synchronous pass of the classification chain for a single frame's
/// hand (or lack of one). Pure with respect to everything but the
/// debouncer, router, and registry handed in, which keeps it testable
/// without camera or model.
pub fn process_hand(
    hand: Option<&HandLandmarks>,
    debouncer: &mut GestureDebouncer,
    router: &mut GestureRouter,
    map: &GestureMap,
    devices: &mut DeviceRegistry,
) -> StepOutcome {
    let raw = hand.and_then(gesture::classify);
    let confirmed = debouncer.push(raw);
    let fired = router.route(confirmed, map, devices);
    StepOutcome {
        raw,
        confirmed,
        fired,
    }
}

/// The detection worker: consumes camera frames, feeds the tracker, and
/// drives [`process_hand`] once per fresh frame.
pub struct DetectionPipeline {
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl DetectionPipeline {
    /// Take ownership of the capture and tracker and start the worker.
    pub fn spawn(
        camera: CameraCapture,
        tracker: HandTracker,
        state: Arc<ControllerState>,
    ) -> Result<Self, String> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let thread_handle = std::thread::Builder::new()
            .name("gesture-detect".to_string())
            .spawn(move || {
                Self::worker(camera, tracker, state, running_clone);
            })
            .map_err(|e| format!("Failed to spawn detection thread: {}", e))?;

        Ok(Self {
            running,
            thread_handle: Some(thread_handle),
        })
    }

    fn worker(
        camera: CameraCapture,
        tracker: HandTracker,
        state: Arc<ControllerState>,
        running: Arc<AtomicBool>,
    ) {
        log::info!("Detection pipeline started");

        let mut debouncer =
            GestureDebouncer::new(state.debounce_window.load(Ordering::Relaxed));
        let mut router = GestureRouter::new();
        let mut last_frame_number = 0u64;
        let mut frames_processed = 0u64;

        while running.load(Ordering::Acquire) {
            let Some(frame) = camera.latest_frame() else {
                std::thread::sleep(IDLE_POLL);
                continue;
            };
            if frame.frame_number == last_frame_number {
                std::thread::sleep(IDLE_POLL);
                continue;
            }
            last_frame_number = frame.frame_number;
            frames_processed += 1;

            // Scale down before the hand-off so the tracker's channel
            // carries model-sized buffers, not full camera frames.
            let scaled = frame.downscale(INPUT_SIZE, INPUT_SIZE);
            tracker.process_frame(&scaled, INPUT_SIZE, INPUT_SIZE, frame.frame_number);

            // The tracker runs asynchronously; classify whatever hand it
            // most recently produced. The debouncer absorbs the lag.
            let tracked = tracker.latest_result();

            debouncer.set_window(state.debounce_window.load(Ordering::Relaxed));

            let outcome = {
                let map = state.gesture_map.lock().clone();
                let mut devices = state.devices.lock();
                process_hand(
                    tracked.hand.as_ref(),
                    &mut debouncer,
                    &mut router,
                    &map,
                    &mut devices,
                )
            };

            {
                let mut monitor = state.monitor.lock();
                monitor.raw_gesture = outcome.raw;
                monitor.confirmed_gesture = outcome.confirmed;
                monitor.hand = tracked.hand;
                monitor.preview = Some(frame);
                monitor.frames_processed = frames_processed;
                monitor.tracker_ready = tracker.is_ready();
            }
        }

        log::info!("Detection pipeline stopped");
        // camera and tracker are dropped here, stopping their threads.
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Signal the worker and wait for it (and the capture and tracking
    /// threads it owns) to finish.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DetectionPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
