//! Camera capture module
//!
//! Cross-platform webcam capture via nokhwa. Frames are captured on a
//! background thread, mirrored horizontally (so on-screen movement
//! matches the user's own), and published through a latest-frame slot
//! for the detection pipeline and the preview panel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use parking_lot::Mutex;

/// One captured camera frame, RGBA.
#[derive(Clone)]
pub struct CameraFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub frame_number: u64,
    pub timestamp: Instant,
}

impl CameraFrame {
    /// Nearest-neighbor downscale for the inference input.
    pub fn downscale(&self, target_width: u32, target_height: u32) -> Vec<u8> {
        if self.width == target_width && self.height == target_height {
            return self.data.clone();
        }

        let mut output = vec![0u8; (target_width * target_height * 4) as usize];
        let x_ratio = self.width as f32 / target_width as f32;
        let y_ratio = self.height as f32 / target_height as f32;

        for y in 0..target_height {
            for x in 0..target_width {
                let src_x = (x as f32 * x_ratio) as u32;
                let src_y = (y as f32 * y_ratio) as u32;
                let src_idx = ((src_y * self.width + src_x) * 4) as usize;
                let dst_idx = ((y * target_width + x) * 4) as usize;

                if src_idx + 3 < self.data.len() && dst_idx + 3 < output.len() {
                    output[dst_idx..dst_idx + 4].copy_from_slice(&self.data[src_idx..src_idx + 4]);
                }
            }
        }

        output
    }
}

/// Information about an available camera
#[derive(Clone, Debug)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
}

/// Camera capture interface
pub struct CameraCapture {
    /// Latest complete frame
    latest: Arc<Mutex<Option<CameraFrame>>>,
    /// Whether capture is running
    running: Arc<AtomicBool>,
    /// Capture thread handle
    thread_handle: Option<std::thread::JoinHandle<()>>,
    /// Frame counter
    frame_count: Arc<AtomicU64>,
}

impl CameraCapture {
    /// List available cameras
    pub fn list_cameras() -> Vec<CameraInfo> {
        let mut cameras = Vec::new();

        match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
            Ok(camera_list) => {
                for (idx, info) in camera_list.iter().enumerate() {
                    cameras.push(CameraInfo {
                        index: idx as u32,
                        name: info.human_name().to_string(),
                    });
                }
            }
            Err(e) => {
                log::warn!("Failed to enumerate cameras: {:?}", e);
            }
        }

        cameras
    }

    /// Start capturing from the camera at `camera_index`.
    pub fn new(camera_index: u32) -> Result<Self, String> {
        let latest = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let frame_count = Arc::new(AtomicU64::new(0));

        let latest_clone = latest.clone();
        let running_clone = running.clone();
        let frame_count_clone = frame_count.clone();

        let thread_handle = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_thread(camera_index, latest_clone, running_clone, frame_count_clone);
            })
            .map_err(|e| format!("Failed to spawn capture thread: {}", e))?;

        Ok(Self {
            latest,
            running,
            thread_handle: Some(thread_handle),
            frame_count,
        })
    }

    /// Camera capture thread
    fn capture_thread(
        camera_index: u32,
        latest: Arc<Mutex<Option<CameraFrame>>>,
        running: Arc<AtomicBool>,
        frame_count: Arc<AtomicU64>,
    ) {
        log::info!("Starting camera capture thread (camera {})", camera_index);

        let index = CameraIndex::Index(camera_index);

        // Prefer a modest resolution; landmark inference downsamples
        // anyway and smaller frames keep the mirror pass cheap.
        let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::HighestResolution(
            nokhwa::utils::Resolution::new(640, 480),
        ));

        let mut camera = match Camera::new(index.clone(), requested) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to open camera at 640x480: {:?}", e);
                let fallback = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
                match Camera::new(index, fallback) {
                    Ok(c) => c,
                    Err(e2) => {
                        log::error!("Failed to open camera: {:?}", e2);
                        running.store(false, Ordering::Release);
                        return;
                    }
                }
            }
        };

        if let Err(e) = camera.open_stream() {
            log::error!("Failed to open camera stream: {:?}", e);
            running.store(false, Ordering::Release);
            return;
        }

        log::info!(
            "Camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );

        while running.load(Ordering::Acquire) {
            match camera.frame() {
                Ok(frame) => match frame.decode_image::<RgbAFormat>() {
                    Ok(image) => {
                        let width = frame.resolution().width();
                        let height = frame.resolution().height();
                        let mut rgba = image.into_raw();
                        mirror_horizontal(&mut rgba, width, height);

                        let frame_num = frame_count.fetch_add(1, Ordering::Relaxed) + 1;
                        *latest.lock() = Some(CameraFrame {
                            data: rgba,
                            width,
                            height,
                            frame_number: frame_num,
                            timestamp: Instant::now(),
                        });
                    }
                    Err(e) => {
                        log::warn!("Failed to decode frame: {:?}", e);
                    }
                },
                Err(e) => {
                    // Acquisition failure is skipped, not retried with
                    // backoff; the short sleep just avoids a hot spin.
                    log::warn!("Failed to capture frame: {:?}", e);
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            }
        }

        log::info!("Camera capture thread stopped");
    }

    /// Get the latest captured frame
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest.lock().clone()
    }

    /// Check if capture is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Get frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    /// Stop capturing
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Flip an RGBA buffer left-to-right in place.
fn mirror_horizontal(data: &mut [u8], width: u32, height: u32) {
    let w = width as usize;
    for y in 0..height as usize {
        let row = &mut data[y * w * 4..(y + 1) * w * 4];
        for x in 0..w / 2 {
            let left = x * 4;
            let right = (w - 1 - x) * 4;
            for c in 0..4 {
                row.swap(left + c, right + c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            data,
            width,
            height,
            frame_number: 1,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_mirror_swaps_row_ends() {
        // 2x1 frame: red pixel then blue pixel.
        let mut data = vec![255, 0, 0, 255, 0, 0, 255, 255];
        mirror_horizontal(&mut data, 2, 1);
        assert_eq!(&data[0..4], &[0, 0, 255, 255]);
        assert_eq!(&data[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        let original: Vec<u8> = (0..5 * 3 * 4).map(|v| v as u8).collect();
        let mut data = original.clone();
        mirror_horizontal(&mut data, 5, 3);
        mirror_horizontal(&mut data, 5, 3);
        assert_eq!(data, original);
    }

    #[test]
    fn test_downscale_dimensions() {
        let f = frame(8, 8, vec![128u8; 8 * 8 * 4]);
        let out = f.downscale(4, 4);
        assert_eq!(out.len(), 4 * 4 * 4);
        assert!(out.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_downscale_same_size_is_copy() {
        let f = frame(4, 4, (0..4 * 4 * 4).map(|v| v as u8).collect());
        assert_eq!(f.downscale(4, 4), f.data);
    }
}
