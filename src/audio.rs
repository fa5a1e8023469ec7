//! Microphone capture for the Vosk recognizer
//!
//! `cpal::Stream` cannot leave the thread that built it, so the stream lives
//! on a dedicated capture thread. Dropping the [`AudioCapture`] handle ends
//! that thread, which drops the stream and releases the device.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, info, warn};

/// Vosk models expect 16 kHz mono
pub const SAMPLE_RATE: u32 = 16000;
const CHUNK_SIZE: u32 = 1024;

/// Running capture; audio stops when this is dropped
pub struct AudioCapture {
    device_name: String,
    shutdown: Option<Sender<()>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl AudioCapture {
    /// Open `device_index` (or the default input) and stream chunks of
    /// 16-bit samples into the returned receiver
    pub fn start(device_index: Option<usize>) -> Result<(Self, Receiver<Vec<i16>>)> {
        let (samples_tx, samples_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<String>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                let stream = match open_stream(device_index, samples_tx) {
                    Ok((stream, name)) => {
                        let _ = ready_tx.send(Ok(name));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Blocks until the handle drops its sender
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Audio capture stopped");
            })?;

        let device_name = ready_rx
            .recv()
            .context("Audio capture thread exited during setup")??;
        info!("🎤 Capturing from: {}", device_name);

        Ok((
            Self {
                device_name,
                shutdown: Some(shutdown_tx),
                thread_handle: Some(thread_handle),
            },
            samples_rx,
        ))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn open_stream(
    device_index: Option<usize>,
    samples: Sender<Vec<i16>>,
) -> Result<(cpal::Stream, String)> {
    let host = cpal::default_host();

    let names: Vec<String> = host
        .input_devices()?
        .map(|d| d.name().unwrap_or_else(|_| "Unknown".to_string()))
        .collect();
    info!("Available audio input devices:");
    for line in device_listing(&names, device_index) {
        info!("{}", line);
    }

    let device = match device_index {
        Some(idx) => host
            .input_devices()?
            .nth(idx)
            .with_context(|| format!("No input device {} ({} available)", idx, names.len()))?,
        None => host
            .default_input_device()
            .context("No default input device")?,
    };
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Fixed(CHUNK_SIZE),
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                // Receiver gone means the recognizer is shutting down
                let _ = samples.send(data.to_vec());
            },
            |err| warn!("⚠️ Audio stream error: {}", err),
            None,
        )
        .with_context(|| format!("Failed to open input stream on {}", device_name))?;
    stream.play().context("Failed to start input stream")?;

    Ok((stream, device_name))
}

/// One log line per device, the selected one marked with `*`
fn device_listing(names: &[String], selected: Option<usize>) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let marker = if selected == Some(i) { "*" } else { " " };
            format!("  {} [{}] {}", marker, i, name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_listing_marks_selection() {
        let names = vec!["HDA Intel".to_string(), "USB Mic".to_string()];
        assert_eq!(
            device_listing(&names, Some(1)),
            vec!["    [0] HDA Intel", "  * [1] USB Mic"]
        );
        assert!(device_listing(&names, None).iter().all(|l| !l.contains('*')));
    }
}
