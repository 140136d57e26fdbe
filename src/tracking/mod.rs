//! Hand tracking module
//!
//! Runs a MediaPipe-style hand landmark model through ONNX Runtime on a
//! background thread and publishes the latest detected hand (21 landmarks
//! in normalized image coordinates) to the detection pipeline.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use ndarray::Array4;
use parking_lot::Mutex;

/// Landmark indices following the MediaPipe hand landmark numbering.
///
/// Each finger is listed palm-to-tip: MCP, PIP, DIP, TIP (the thumb has
/// CMC, MCP, IP, TIP instead).
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A single hand landmark in normalized image coordinates.
///
/// `x` and `y` are in [0, 1] with y increasing downward; `z` is depth
/// relative to the wrist, same scale as `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One detected hand: exactly 21 landmarks in the fixed anatomical order.
#[derive(Clone, Debug)]
pub struct HandLandmarks {
    pub points: [Landmark; 21],
    /// Model presence/confidence score
    pub confidence: f32,
}

impl Default for HandLandmarks {
    fn default() -> Self {
        Self {
            points: [Landmark::default(); 21],
            confidence: 0.0,
        }
    }
}

/// Tracking result for one processed frame
#[derive(Clone, Default)]
pub struct TrackingResult {
    /// Zero or one hand per frame
    pub hand: Option<HandLandmarks>,
    /// Frame number this result corresponds to
    pub frame_number: u64,
}

/// Frame data to be processed
struct FrameData {
    /// RGBA pixel data
    data: Vec<u8>,
    width: u32,
    height: u32,
    frame_number: u64,
}

/// Minimum presence score for a hand to be reported at all.
const MIN_PRESENCE: f32 = 0.5;

/// Model input resolution (MediaPipe full hand landmark model). Callers
/// downscale frames to this size before handing them over, so the
/// bounded channel carries small buffers instead of full camera frames.
pub const INPUT_SIZE: u32 = 224;

/// Hand landmark inference engine
pub struct HandTracker {
    /// Latest result from the inference thread
    latest_result: Arc<Mutex<TrackingResult>>,
    /// Channel to send frames to the inference thread
    frame_sender: Option<Sender<FrameData>>,
    /// Whether the model loaded and inference is running
    running: Arc<AtomicBool>,
    /// Inference thread handle
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl HandTracker {
    /// Create a new tracker and spawn its inference thread.
    pub fn new() -> Result<Self, String> {
        let latest_result = Arc::new(Mutex::new(TrackingResult::default()));
        let running = Arc::new(AtomicBool::new(false));

        // Keep at most two frames in flight; newer frames are dropped
        // rather than queued when inference falls behind.
        let (frame_sender, frame_receiver) = crossbeam_channel::bounded::<FrameData>(2);

        let latest_result_clone = latest_result.clone();
        let running_clone = running.clone();

        let thread_handle = std::thread::Builder::new()
            .name("hand-tracking".to_string())
            .spawn(move || {
                Self::inference_thread(frame_receiver, latest_result_clone, running_clone);
            })
            .map_err(|e| format!("Failed to spawn tracking thread: {}", e))?;

        Ok(Self {
            latest_result,
            frame_sender: Some(frame_sender),
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Inference thread main loop
    fn inference_thread(
        frame_receiver: Receiver<FrameData>,
        latest_result: Arc<Mutex<TrackingResult>>,
        running: Arc<AtomicBool>,
    ) {
        log::info!("Hand tracking thread started");

        let mut session = match Self::init_ort() {
            Ok(s) => {
                running.store(true, Ordering::Release);
                log::info!("Hand landmark model loaded");
                Some(s)
            }
            Err(e) => {
                log::warn!("Failed to load hand landmark model: {}. Tracking disabled.", e);
                None
            }
        };

        while let Ok(frame) = frame_receiver.recv() {
            if let Some(ref mut session) = session {
                match Self::run_inference(session, &frame) {
                    Ok(result) => {
                        *latest_result.lock() = result;
                    }
                    Err(e) => {
                        log::warn!("Inference error: {}", e);
                    }
                }
            }
        }

        running.store(false, Ordering::Release);
        log::info!("Hand tracking thread stopped");
    }

    /// Initialize ONNX Runtime and load the landmark model
    fn init_ort() -> Result<ort::session::Session, String> {
        let model_dir = Self::find_model_dir()?;
        log::info!("Model directory: {:?}", model_dir);

        let model_path = model_dir.join("hand_landmark_full.onnx");
        if !model_path.exists() {
            return Err(format!("Hand landmark model not found: {:?}", model_path));
        }

        ort::init()
            .with_name("AirToggle")
            .commit()
            .map_err(|e| format!("Failed to initialize ORT: {}", e))?;

        let session = ort::session::Session::builder()
            .map_err(|e| format!("Failed to create session builder: {}", e))?
            .with_intra_threads(2)
            .map_err(|e| format!("Failed to set threads: {}", e))?
            .commit_from_file(&model_path)
            .map_err(|e| format!("Failed to load landmark model: {}", e))?;

        log::info!("Loaded landmark model from {:?}", model_path);
        Ok(session)
    }

    /// Find the models directory, relative to the executable or the cwd.
    fn find_model_dir() -> Result<PathBuf, String> {
        if let Ok(exe_path) = std::env::current_exe() {
            let mut dir = exe_path.parent().map(|p| p.to_path_buf());
            // Walk up a few levels to cover target/debug and target/release.
            for _ in 0..3 {
                if let Some(d) = dir {
                    let model_dir = d.join("models");
                    if model_dir.exists() {
                        return Ok(model_dir);
                    }
                    dir = d.parent().map(|p| p.to_path_buf());
                } else {
                    break;
                }
            }
        }

        let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
        let model_dir = cwd.join("models");
        if model_dir.exists() {
            return Ok(model_dir);
        }

        Err("Models directory not found. Create a 'models' directory with hand_landmark_full.onnx.".to_string())
    }

    /// Run landmark inference on one frame
    fn run_inference(
        session: &mut ort::session::Session,
        frame: &FrameData,
    ) -> Result<TrackingResult, String> {
        if frame.width != INPUT_SIZE || frame.height != INPUT_SIZE {
            return Err(format!(
                "Expected {0}x{0} input frame, got {1}x{2}",
                INPUT_SIZE, frame.width, frame.height
            ));
        }

        let input = rgba_to_nhwc(&frame.data);

        let input_array = Array4::from_shape_vec(
            (1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3),
            input,
        )
        .map_err(|e| format!("Failed to create input array: {}", e))?;

        let input_tensor = ort::value::Tensor::from_array(input_array)
            .map_err(|e| format!("Failed to create tensor: {}", e))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| format!("Inference failed: {}", e))?;

        // First output: 63 floats = 21 landmarks * (x, y, z) in input pixels.
        // Second output: hand presence score.
        let mut iter = outputs.iter();
        let coords_out = iter.next().ok_or("No landmark output from model")?;
        let (_shape, coords) = coords_out
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| format!("Failed to extract landmarks: {}", e))?;

        if coords.len() < 63 {
            return Err(format!("Unexpected landmark output length: {}", coords.len()));
        }

        let confidence = match iter.next() {
            Some(score_out) => score_out
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| format!("Failed to extract presence score: {}", e))?
                .1
                .first()
                .copied()
                .unwrap_or(0.0),
            None => 1.0,
        };

        let hand = if confidence >= MIN_PRESENCE {
            let mut points = [Landmark::default(); 21];
            for (i, point) in points.iter_mut().enumerate() {
                // Model outputs coordinates in input pixels; normalize.
                *point = Landmark {
                    x: coords[i * 3] / INPUT_SIZE as f32,
                    y: coords[i * 3 + 1] / INPUT_SIZE as f32,
                    z: coords[i * 3 + 2] / INPUT_SIZE as f32,
                };
            }
            Some(HandLandmarks { points, confidence })
        } else {
            None
        };

        Ok(TrackingResult {
            hand,
            frame_number: frame.frame_number,
        })
    }

    /// Send a frame for inference (non-blocking; dropped if the queue is
    /// full). The frame must already be scaled to `INPUT_SIZE` square.
    pub fn process_frame(&self, frame: &[u8], width: u32, height: u32, frame_number: u64) {
        if let Some(ref sender) = self.frame_sender {
            enqueue_frame(sender, frame, width, height, frame_number);
        }
    }

    /// Get the latest tracking result
    pub fn latest_result(&self) -> TrackingResult {
        self.latest_result.lock().clone()
    }

    /// Check if the model loaded and inference is running
    pub fn is_ready(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the inference thread
    pub fn stop(&mut self) {
        // Drop sender to signal thread to stop
        self.frame_sender = None;

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Queue a frame for inference, returning false when it was dropped.
/// The full-queue check comes first so the drop path skips the pixel
/// copy entirely.
fn enqueue_frame(
    sender: &Sender<FrameData>,
    frame: &[u8],
    width: u32,
    height: u32,
    frame_number: u64,
) -> bool {
    if sender.is_full() {
        return false;
    }
    sender
        .try_send(FrameData {
            data: frame.to_vec(),
            width,
            height,
            frame_number,
        })
        .is_ok()
}

/// Convert model-sized RGBA bytes to RGB float NHWC in [0, 1].
fn rgba_to_nhwc(data: &[u8]) -> Vec<f32> {
    let mut output = Vec::with_capacity(data.len() / 4 * 3);
    for px in data.chunks_exact(4) {
        output.push(px[0] as f32 / 255.0);
        output.push(px[1] as f32 / 255.0);
        output.push(px[2] as f32 / 255.0);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_indices_cover_all_fingertips() {
        let tips = [
            landmarks::THUMB_TIP,
            landmarks::INDEX_TIP,
            landmarks::MIDDLE_TIP,
            landmarks::RING_TIP,
            landmarks::PINKY_TIP,
        ];
        assert_eq!(tips, [4, 8, 12, 16, 20]);
        assert_eq!(landmarks::WRIST, 0);
    }

    #[test]
    fn test_rgba_to_nhwc_drops_alpha_and_normalizes() {
        // Two pixels: magenta-ish and green, distinct alphas.
        let data = vec![255u8, 0, 128, 7, 0, 255, 64, 9];
        let out = rgba_to_nhwc(&data);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(out[3], 0.0);
        assert_eq!(out[4], 1.0);
    }

    #[test]
    fn test_downscaled_frame_matches_model_input() {
        let frame = crate::camera::CameraFrame {
            data: vec![200u8; 16 * 12 * 4],
            width: 16,
            height: 12,
            frame_number: 1,
            timestamp: std::time::Instant::now(),
        };
        let scaled = frame.downscale(INPUT_SIZE, INPUT_SIZE);
        assert_eq!(scaled.len(), (INPUT_SIZE * INPUT_SIZE * 4) as usize);
        assert_eq!(
            rgba_to_nhwc(&scaled).len(),
            (INPUT_SIZE * INPUT_SIZE * 3) as usize
        );
    }

    #[test]
    fn test_full_queue_drops_frame_without_send() {
        let (sender, receiver) = crossbeam_channel::bounded::<FrameData>(1);
        let pixels = vec![0u8; 4];

        assert!(enqueue_frame(&sender, &pixels, 1, 1, 1));
        // Queue is now full; the next frame is dropped, not queued.
        assert!(!enqueue_frame(&sender, &pixels, 1, 1, 2));

        let queued = receiver.recv().unwrap();
        assert_eq!(queued.frame_number, 1);

        // Draining the queue re-opens it.
        assert!(enqueue_frame(&sender, &pixels, 1, 1, 3));
    }
}
