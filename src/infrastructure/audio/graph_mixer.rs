//! In-process audio mixing graph
//!
//! Buffers per-source PCM and sums everything on drain. The local
//! microphone is just another source, fed by a dedicated cpal thread
//! (cpal::Stream is not Send, so it never leaves that thread).

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex as StdMutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tracing::warn;

use super::flac::TARGET_SAMPLE_RATE;
use crate::application::ports::{AudioMixer, MixerError};
use crate::domain::ParticipantId;

/// Source id under which the local microphone feeds the graph
pub const LOCAL_SOURCE: &str = "local";

/// Per-source buffer cap (30 seconds at 16kHz). A source that is pushed
/// but never drained sheds its oldest samples instead of growing without
/// bound.
const MAX_BUFFERED_SAMPLES: usize = TARGET_SAMPLE_RATE as usize * 30;

type SourceBuffers = HashMap<ParticipantId, VecDeque<i16>>;

/// Mixing graph over any number of participant sources.
///
/// All sources are 16kHz mono i16. Draining sums whatever each source has
/// buffered since the last drain; sources with fewer samples contribute
/// silence for the remainder, so a participant joining or leaving never
/// interrupts the others.
pub struct GraphMixer {
    sources: Arc<StdMutex<SourceBuffers>>,
    released: Arc<AtomicBool>,
}

impl GraphMixer {
    pub fn new() -> Self {
        Self {
            sources: Arc::new(StdMutex::new(HashMap::new())),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach the local microphone as a source.
    ///
    /// Spawns a dedicated thread owning the cpal stream. The thread runs
    /// until the mixer is released. The device must support 16kHz capture;
    /// nothing resamples downstream.
    pub fn attach_local_input(&self) -> Result<(), MixerError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(MixerError::Released);
        }

        let local_id = ParticipantId::new(LOCAL_SOURCE);
        {
            let mut sources = self.sources.lock().unwrap();
            if sources.contains_key(&local_id) {
                return Err(MixerError::SourceAlreadyAttached((&local_id).into()));
            }
            sources.insert(local_id.clone(), VecDeque::new());
        }

        let sources = Arc::clone(&self.sources);
        let released = Arc::clone(&self.released);
        let (startup_tx, startup_rx) = mpsc::channel::<Result<(), MixerError>>();

        std::thread::spawn(move || {
            let stream = match Self::open_input_stream(&sources, &released, &local_id) {
                Ok(stream) => {
                    let _ = startup_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    sources.lock().unwrap().remove(&local_id);
                    let _ = startup_tx.send(Err(e));
                    return;
                }
            };

            while !released.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            drop(stream);
        });

        match startup_rx.recv_timeout(std::time::Duration::from_secs(2)) {
            Ok(result) => result,
            Err(_) => Err(MixerError::InputFailed(
                "Audio input thread did not start".to_string(),
            )),
        }
    }

    fn open_input_stream(
        sources: &Arc<StdMutex<SourceBuffers>>,
        released: &Arc<AtomicBool>,
        local_id: &ParticipantId,
    ) -> Result<cpal::Stream, MixerError> {
        let device = Self::get_input_device()?;
        let (config, sample_format) = Self::get_input_config(&device)?;
        let channels = config.channels;

        let push_sources = Arc::clone(sources);
        let push_released = Arc::clone(released);
        let push_id = local_id.clone();

        let stream = match sample_format {
            SampleFormat::I16 => device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if !push_released.load(Ordering::SeqCst) {
                            let mono = Self::stereo_to_mono(data, channels);
                            Self::buffer_samples(&push_sources, &push_id, &mono);
                        }
                    },
                    |err| warn!("Audio stream error: {}", err),
                    None,
                )
                .map_err(|e| MixerError::InputFailed(e.to_string()))?,

            SampleFormat::F32 => device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if !push_released.load(Ordering::SeqCst) {
                            let i16_data: Vec<i16> =
                                data.iter().map(|&s| (s * 32767.0) as i16).collect();
                            let mono = Self::stereo_to_mono(&i16_data, channels);
                            Self::buffer_samples(&push_sources, &push_id, &mono);
                        }
                    },
                    |err| warn!("Audio stream error: {}", err),
                    None,
                )
                .map_err(|e| MixerError::InputFailed(e.to_string()))?,

            _ => {
                return Err(MixerError::InputFailed(
                    "Unsupported sample format".to_string(),
                ))
            }
        };

        stream
            .play()
            .map_err(|e| MixerError::InputFailed(e.to_string()))?;

        Ok(stream)
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, MixerError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(MixerError::NoAudioDevice)
    }

    /// Get an input configuration at the target sample rate.
    /// Prefer mono; accept stereo (mixed down in the callback).
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), MixerError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| MixerError::InputFailed(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }
            // The graph has no resampler, so the device must span 16kHz
            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;
            if !includes_target {
                continue;
            }

            let is_better = match &best_config {
                None => true,
                Some(current) => config.channels() < current.channels(),
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(MixerError::InputFailed(
            "No input config supports 16kHz capture".to_string(),
        ))?;

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate: SampleRate(TARGET_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Mix stereo to mono
    fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Append samples to one source's buffer, shedding the oldest samples
    /// past the cap. Runs on the audio callback, so lock failures are
    /// swallowed rather than panicking the audio thread.
    fn buffer_samples(sources: &Arc<StdMutex<SourceBuffers>>, id: &ParticipantId, samples: &[i16]) {
        if let Ok(mut sources) = sources.lock() {
            if let Some(queue) = sources.get_mut(id) {
                queue.extend(samples.iter().copied());
                while queue.len() > MAX_BUFFERED_SAMPLES {
                    queue.pop_front();
                }
            }
        }
    }
}

impl Default for GraphMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer for GraphMixer {
    fn add_source(&self, id: ParticipantId) -> Result<(), MixerError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(MixerError::Released);
        }
        let mut sources = self.sources.lock().unwrap();
        if sources.contains_key(&id) {
            return Err(MixerError::SourceAlreadyAttached((&id).into()));
        }
        sources.insert(id, VecDeque::new());
        Ok(())
    }

    fn remove_source(&self, id: &ParticipantId) -> Result<(), MixerError> {
        let mut sources = self.sources.lock().unwrap();
        if sources.remove(id).is_none() {
            return Err(MixerError::UnknownSource(id.into()));
        }
        Ok(())
    }

    fn push_samples(&self, id: &ParticipantId, samples: &[i16]) -> Result<(), MixerError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(MixerError::Released);
        }
        {
            let sources = self.sources.lock().unwrap();
            if !sources.contains_key(id) {
                return Err(MixerError::UnknownSource(id.into()));
            }
        }
        Self::buffer_samples(&self.sources, id, samples);
        Ok(())
    }

    fn track_count(&self) -> usize {
        self.sources.lock().unwrap().len()
    }

    fn drain_mixed(&self) -> Vec<i16> {
        let mut sources = self.sources.lock().unwrap();
        let max_len = sources.values().map(|q| q.len()).max().unwrap_or(0);
        let mut mixed = vec![0i16; max_len];
        for queue in sources.values_mut() {
            for (i, sample) in queue.drain(..).enumerate() {
                mixed[i] = mixed[i].saturating_add(sample);
            }
        }
        mixed
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.sources.lock().unwrap().clear();
    }
}
