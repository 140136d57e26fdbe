//! airtoggle - touch-free control of simulated home devices
//!
//! Captures webcam frames, runs hand-landmark inference, classifies the
//! hand pose into a small set of gestures, and drives a registry of
//! simulated devices (LEDs, fan, door lock, TV) shown in a desktop window.

pub mod app;
pub mod camera;
pub mod config;
pub mod devices;
pub mod gesture;
pub mod pipeline;
pub mod router;
pub mod tracking;
pub mod ui;

pub use app::App;
