//! Audio capture implementation using a dedicated thread

use super::CaptureQueue;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Audio capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No input device found")]
    NoInputDevice,

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build audio stream: {0}")]
    StreamError(String),

    #[error("Failed to start stream: {0}")]
    PlayError(String),

    #[error("Thread error: {0}")]
    ThreadError(String),
}

/// Details of an opened capture stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureInfo {
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Commands sent to the audio thread
enum AudioCommand {
    Stop,
}

/// Audio capture handle
///
/// `cpal::Stream` is not `Send`, so the stream lives on its own thread for
/// its whole life. The handle only keeps a command sender and the join
/// handle. Samples reach the consumer through the shared [`CaptureQueue`].
pub struct AudioCaptureHandle {
    /// Command sender to control the audio thread
    command_tx: mpsc::Sender<AudioCommand>,

    /// Handle to the audio thread
    thread_handle: Option<JoinHandle<()>>,

    info: CaptureInfo,
}

impl AudioCaptureHandle {
    /// Open `source_id` and start pushing mono chunks into `queue`.
    ///
    /// Blocks until the stream is running or has failed to open, so a
    /// missing or broken device is reported here rather than later.
    pub fn start(source_id: Option<String>, queue: Arc<CaptureQueue>) -> Result<Self, CaptureError> {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let thread_handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || run_audio_thread(source_id, queue, command_rx, ready_tx))
            .map_err(|e| CaptureError::ThreadError(e.to_string()))?;

        let info = match ready_rx.recv() {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread_handle.join();
                return Err(CaptureError::ThreadError(
                    "audio thread exited before reporting".to_string(),
                ));
            }
        };

        Ok(Self {
            command_tx,
            thread_handle: Some(thread_handle),
            info,
        })
    }

    pub fn info(&self) -> &CaptureInfo {
        &self.info
    }

    /// Stop the audio capture
    pub fn stop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AudioCaptureHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Average interleaved frames down to one channel.
///
/// A trailing partial frame is averaged over the samples it has.
pub fn mix_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    let channels = channels.max(1);
    if channels == 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().sum();
            sum / frame.len() as f32
        })
        .collect()
}

/// Resolve a source id to an input device
fn find_device(host: &cpal::Host, source_id: Option<&str>) -> Result<Device, CaptureError> {
    match source_id {
        Some(id) if id.starts_with("input:") => {
            let device_name = id.trim_start_matches("input:");
            host.input_devices()
                .map_err(|e| CaptureError::ConfigError(e.to_string()))?
                .find(|d| d.name().map(|n| n == device_name).unwrap_or(false))
                .ok_or_else(|| CaptureError::SourceNotFound(device_name.to_string()))
        }
        None | Some("default") => host.default_input_device().ok_or(CaptureError::NoInputDevice),
        Some(other) => Err(CaptureError::SourceNotFound(other.to_string())),
    }
}

/// Run the audio capture in a dedicated thread
fn run_audio_thread(
    source_id: Option<String>,
    queue: Arc<CaptureQueue>,
    command_rx: mpsc::Receiver<AudioCommand>,
    ready_tx: mpsc::SyncSender<Result<CaptureInfo, CaptureError>>,
) {
    let stream = match open_stream(source_id.as_deref(), queue) {
        Ok((stream, info)) => {
            log::info!(
                "Audio capture started: {} ({} Hz, {} channels)",
                info.device_name,
                info.sample_rate,
                info.channels
            );
            let _ = ready_tx.send(Ok(info));
            stream
        }
        Err(e) => {
            log::error!("Audio capture failed to start: {}", e);
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    // Park until told to stop or the handle goes away
    match command_rx.recv() {
        Ok(AudioCommand::Stop) => log::info!("Audio capture stopping"),
        Err(_) => log::info!("Audio capture channel disconnected"),
    }

    drop(stream);
    log::info!("Audio capture stopped");
}

fn open_stream(
    source_id: Option<&str>,
    queue: Arc<CaptureQueue>,
) -> Result<(cpal::Stream, CaptureInfo), CaptureError> {
    let host = cpal::default_host();
    let device = find_device(&host, source_id)?;
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let config = device
        .default_input_config()
        .map_err(|e| CaptureError::ConfigError(e.to_string()))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    let stream = match config.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), queue, channels as usize),
        SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), queue, channels as usize),
        SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), queue, channels as usize),
        other => return Err(CaptureError::UnsupportedFormat(format!("{:?}", other))),
    }
    .map_err(|e| CaptureError::StreamError(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::PlayError(e.to_string()))?;

    Ok((
        stream,
        CaptureInfo {
            device_name,
            sample_rate,
            channels,
        },
    ))
}

/// Build input stream for given sample type
fn build_stream<T: cpal::Sample + cpal::SizedSample>(
    device: &Device,
    config: &StreamConfig,
    queue: Arc<CaptureQueue>,
    channels: usize,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    f32: cpal::FromSample<T>,
{
    let error_queue = queue.clone();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let f32_data: Vec<f32> = data
                .iter()
                .map(|s| cpal::Sample::from_sample(*s))
                .collect();
            queue.push(mix_to_mono(&f32_data, channels));
        },
        move |err| {
            // Driver faults are not fatal; keep the stream running
            let total = error_queue.stats().record_stream_error();
            log::warn!("Audio stream error ({} so far): {}", total, err);
        },
        None,
    )
}
