//! Application state holding wgpu graphics context
//!
//! This module contains the core graphics state including the wgpu device,
//! queue, surface, and configuration needed for rendering, plus the egui
//! control panel and device dashboard.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::camera::CameraCapture;
use crate::config;
use crate::devices::{DeviceConfig, DeviceRegistry, DeviceState};
use crate::gesture::Gesture;
use crate::pipeline::{ControllerState, DetectionPipeline};
use crate::router::default_gesture_map;
use crate::tracking::{HandLandmarks, HandTracker};
use crate::ui;

/// Width of the camera preview in the side panel, in points.
const PREVIEW_WIDTH: f32 = 300.0;

/// Main application state
pub struct App {
    /// Reference to the window
    window: Arc<Window>,
    /// The wgpu surface for presenting rendered frames
    surface: wgpu::Surface<'static>,
    /// The wgpu device for creating GPU resources
    device: wgpu::Device,
    /// The command queue for submitting GPU work
    queue: wgpu::Queue,
    /// Surface configuration
    config: wgpu::SurfaceConfiguration,
    /// Current window size in physical pixels
    size: PhysicalSize<u32>,

    // Gesture pipeline
    state: Arc<ControllerState>,
    pipeline: Option<DetectionPipeline>,
    config_path: PathBuf,

    // Camera preview
    preview_texture: Option<egui::TextureHandle>,
    preview_hand: Option<HandLandmarks>,
    last_preview_frame: u64,

    // egui integration
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    // Frame timing
    start_time: Instant,
    fps: f64,
    last_fps_update: Instant,
    frames_since_update: u64,
}

impl App {
    /// Create a new App instance with initialized wgpu context
    pub async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to find suitable GPU adapter");

        log::info!("Using GPU: {}", adapter.get_info().name);
        log::info!("Backend: {:?}", adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Gesture Controller Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };

        surface.configure(&device, &config);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let mut style = (*egui_ctx.style()).clone();
        style.visuals.window_shadow = egui::epaint::Shadow::NONE;
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        // Gesture map: defaults overlaid with the saved config, if any.
        let config_path = PathBuf::from(config::CONFIG_FILE);
        let mut gesture_map = default_gesture_map();
        config::load_gesture_map(&config_path, &mut gesture_map);

        let state = Arc::new(ControllerState::new(
            DeviceRegistry::with_default_devices(),
            gesture_map,
            crate::gesture::debounce::DEFAULT_WINDOW,
        ));

        let now = Instant::now();

        Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            state,
            pipeline: None,
            config_path,
            preview_texture: None,
            preview_hand: None,
            last_preview_frame: 0,
            egui_ctx,
            egui_state,
            egui_renderer,
            start_time: now,
            fps: 60.0,
            last_fps_update: now,
            frames_since_update: 0,
        }
    }

    /// Handle a window event, returning true if egui consumed it
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(&self.window, event);
        response.consumed
    }

    /// Resize the surface
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Get current size
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Start capture, tracking, and detection for the given camera.
    pub fn connect_camera(&mut self, camera_index: u32) {
        if self.pipeline.is_some() {
            log::info!("Pipeline already running, disconnect first");
            return;
        }
        log::info!("Connecting to camera {}", camera_index);

        let camera = match CameraCapture::new(camera_index) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to connect camera: {}", e);
                return;
            }
        };

        let tracker = match HandTracker::new() {
            Ok(t) => t,
            Err(e) => {
                log::error!("Failed to start hand tracker: {}", e);
                return;
            }
        };

        match DetectionPipeline::spawn(camera, tracker, self.state.clone()) {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                self.last_preview_frame = 0;
            }
            Err(e) => {
                log::error!("Failed to start detection pipeline: {}", e);
            }
        }
    }

    /// Stop the detection pipeline and release the camera.
    pub fn disconnect_camera(&mut self) {
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.stop();
        }
        self.preview_texture = None;
        self.preview_hand = None;
        {
            let mut monitor = self.state.monitor.lock();
            monitor.preview = None;
            monitor.hand = None;
            monitor.raw_gesture = None;
            monitor.confirmed_gesture = None;
        }
        log::info!("Camera disconnected");
    }

    /// Persist the current gesture map.
    pub fn save_config(&self) {
        let map = self.state.gesture_map.lock().clone();
        config::save_gesture_map(&self.config_path, &map);
    }

    /// Re-read the config file over the defaults.
    pub fn reload_config(&self) {
        let mut map = default_gesture_map();
        config::load_gesture_map(&self.config_path, &mut map);
        *self.state.gesture_map.lock() = map;
    }

    /// Pull the newest pipeline frame into an egui texture for the
    /// preview panel.
    fn update_preview(&mut self) {
        let (frame, hand) = {
            let monitor = self.state.monitor.lock();
            match monitor.preview_newer_than(self.last_preview_frame) {
                Some(newer) => newer,
                None => return,
            }
        };
        self.last_preview_frame = frame.frame_number;
        self.preview_hand = hand;

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.data,
        );
        match &mut self.preview_texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.preview_texture = Some(self.egui_ctx.load_texture(
                    "camera-preview",
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.update_preview();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Clear to the dashboard background; egui draws everything else.
        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        self.render_ui(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.update_fps();

        Ok(())
    }

    fn render_ui(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let raw_input = self.egui_state.take_egui_input(&self.window);

        // Snapshot shared state before running egui
        let fps = self.fps;
        let pipeline_running = self.pipeline.as_ref().is_some_and(|p| p.is_running());
        let elapsed = self.start_time.elapsed().as_secs_f64();

        let (raw_gesture, confirmed_gesture, frames_processed, tracker_ready) = {
            let monitor = self.state.monitor.lock();
            (
                monitor.raw_gesture,
                monitor.confirmed_gesture,
                monitor.frames_processed,
                monitor.tracker_ready,
            )
        };

        let devices: Vec<(String, DeviceConfig, DeviceState)> = {
            let registry = self.state.devices.lock();
            registry
                .iter()
                .map(|(id, config, state)| (id.to_string(), config.clone(), state))
                .collect()
        };
        let device_ids: Vec<String> = devices.iter().map(|(id, _, _)| id.clone()).collect();

        let mut gesture_map = self.state.gesture_map.lock().clone();
        let map_before = gesture_map.clone();

        let mut debounce_window =
            self.state
                .debounce_window
                .load(std::sync::atomic::Ordering::Relaxed);
        let window_before = debounce_window;

        let available_cameras = if pipeline_running {
            Vec::new()
        } else {
            CameraCapture::list_cameras()
        };

        let preview_texture = self.preview_texture.clone();
        let preview_hand = self.preview_hand.clone();

        // Run egui with a closure that doesn't borrow self
        let mut connect_camera_index: Option<u32> = None;
        let mut disconnect_camera = false;
        let mut save_config = false;
        let mut reload_config = false;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("AirToggle");
                    ui.separator();
                    ui.label(format!("FPS: {:.1}", fps));
                    ui.separator();
                    match confirmed_gesture {
                        Some(g) => {
                            ui.colored_label(
                                egui::Color32::from_rgb(0, 220, 120),
                                format!("Gesture: {}", g.display_name()),
                            );
                        }
                        None => {
                            ui.label("Gesture: none");
                        }
                    }
                });
            });

            egui::SidePanel::left("controls").show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading("Camera");
                    if pipeline_running {
                        ui.label(format!("Frames: {}", frames_processed));
                        ui.label(if tracker_ready {
                            "Tracker: ready"
                        } else {
                            "Tracker: loading..."
                        });
                        if ui.button("Disconnect").clicked() {
                            disconnect_camera = true;
                        }
                    } else if available_cameras.is_empty() {
                        ui.label("No cameras found");
                    } else {
                        for camera in &available_cameras {
                            if ui
                                .button(format!("{}: {}", camera.index, camera.name))
                                .clicked()
                            {
                                connect_camera_index = Some(camera.index);
                            }
                        }
                    }

                    ui.separator();
                    ui.heading("Detection");
                    ui.label(format!(
                        "Raw: {}",
                        raw_gesture.map_or("none", |g| g.display_name())
                    ));
                    ui.add(
                        egui::Slider::new(
                            &mut debounce_window,
                            crate::gesture::debounce::MIN_WINDOW
                                ..=crate::gesture::debounce::MAX_WINDOW,
                        )
                        .text("Debounce frames"),
                    );

                    ui.separator();
                    ui.heading("Mappings");
                    for gesture in Gesture::ALL {
                        let current = gesture_map
                            .get(&gesture)
                            .cloned()
                            .unwrap_or_else(|| "(none)".to_string());
                        egui::ComboBox::from_label(gesture.display_name())
                            .selected_text(current)
                            .show_ui(ui, |ui| {
                                for id in &device_ids {
                                    let selected =
                                        gesture_map.get(&gesture) == Some(id);
                                    if ui.selectable_label(selected, id).clicked() {
                                        gesture_map.insert(gesture, id.clone());
                                    }
                                }
                            });
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            save_config = true;
                        }
                        if ui.button("Reload").clicked() {
                            reload_config = true;
                        }
                    });

                    if let Some(texture) = &preview_texture {
                        ui.separator();
                        ui.heading("Preview");
                        let tex_size = texture.size_vec2();
                        let size = egui::Vec2::new(
                            PREVIEW_WIDTH,
                            PREVIEW_WIDTH * tex_size.y / tex_size.x.max(1.0),
                        );
                        let response = ui.image((texture.id(), size));
                        if let Some(hand) = &preview_hand {
                            ui::draw_hand_overlay(ui.painter(), response.rect, hand);
                        }
                    }
                });
            });

            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Devices");
                ui.add_space(8.0);
                ui.horizontal_wrapped(|ui| {
                    for (id, config, state) in &devices {
                        ui::device_tile(ui, id, config, *state, elapsed);
                    }
                });
            });
        });

        // Apply UI actions
        if let Some(idx) = connect_camera_index {
            self.connect_camera(idx);
        }
        if disconnect_camera {
            self.disconnect_camera();
        }
        if save_config {
            self.save_config();
        }
        if reload_config {
            self.reload_config();
        } else if gesture_map != map_before {
            *self.state.gesture_map.lock() = gesture_map;
        }
        if debounce_window != window_before {
            self.state
                .debounce_window
                .store(debounce_window, std::sync::atomic::Ordering::Relaxed);
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let render_pass_static: &mut wgpu::RenderPass<'static> =
                unsafe { std::mem::transmute(&mut render_pass) };

            self.egui_renderer
                .render(render_pass_static, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn update_fps(&mut self) {
        self.frames_since_update += 1;

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_update).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.frames_since_update as f64 / elapsed;
            self.frames_since_update = 0;
            self.last_fps_update = now;
        }
    }
}
