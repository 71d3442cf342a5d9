use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use buzzer_core::{ToneError, ToneOutput};
use rodio::{OutputStream, OutputStreamHandle, Source};

const SAMPLE_RATE: u32 = 48_000;
const AMPLITUDE: f32 = 0.15;

// Square wave generator
struct SquareWave {
    frequency: f32,
    sample_rate: u32,
    remaining: usize,
    current_sample: usize,
}

impl SquareWave {
    fn new(frequency: f32, sample_rate: u32, duration: Duration) -> Self {
        Self {
            frequency,
            sample_rate,
            remaining: (duration.as_secs_f64() * f64::from(sample_rate)) as usize,
            current_sample: 0,
        }
    }
}

impl Iterator for SquareWave {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let sample_position = self.current_sample as f32 / self.sample_rate as f32;
        let cycle_position = (sample_position * self.frequency) % 1.0;
        self.current_sample += 1;

        // high for the first half of the cycle, low for the second
        if cycle_position < 0.5 {
            Some(AMPLITUDE)
        } else {
            Some(-AMPLITUDE)
        }
    }
}

impl Source for SquareWave {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.remaining)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            (self.current_sample + self.remaining) as f64 / f64::from(self.sample_rate),
        ))
    }
}

/// Burst length for a millisecond value. Anything that is not a valid
/// duration (negative, NaN, overflowing) plays nothing.
fn burst_duration(duration_ms: f64) -> Duration {
    Duration::try_from_secs_f64(duration_ms / 1000.0).unwrap_or(Duration::ZERO)
}

struct BurstCommand {
    frequency_hz: f64,
    duration: Duration,
    done: Sender<Result<(), ToneError>>,
}

/// Speaker output through rodio.
///
/// The `OutputStream` is not `Send`, so it lives on a dedicated audio thread;
/// `emit` hands the burst over and blocks until that thread has played it.
pub struct DesktopTone {
    command_tx: Sender<BurstCommand>,
}

impl DesktopTone {
    pub fn new() -> Result<Self, ToneError> {
        let (command_tx, command_rx) = channel::<BurstCommand>();
        let (ready_tx, ready_rx) = channel();

        thread::Builder::new()
            .name("buzzer-audio".to_string())
            .spawn(move || audio_thread(command_rx, ready_tx))
            .map_err(|e| ToneError::DeviceUnavailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| ToneError::DeviceUnavailable("audio thread exited".to_string()))??;

        log::info!("Audio output initialized ({}Hz sample rate)", SAMPLE_RATE);
        Ok(Self { command_tx })
    }
}

impl ToneOutput for DesktopTone {
    fn emit(&self, frequency_hz: f64, duration_ms: f64) -> Result<(), ToneError> {
        let (done_tx, done_rx) = channel();
        self.command_tx
            .send(BurstCommand {
                frequency_hz,
                duration: burst_duration(duration_ms),
                done: done_tx,
            })
            .map_err(|_| ToneError::Playback("audio thread has exited".to_string()))?;

        done_rx
            .recv()
            .map_err(|_| ToneError::Playback("audio thread dropped the burst".to_string()))?
    }
}

fn audio_thread(rx: Receiver<BurstCommand>, ready: Sender<Result<(), ToneError>>) {
    // Initialize audio output once for the thread
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(ToneError::DeviceUnavailable(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    while let Ok(cmd) = rx.recv() {
        let result = play_burst(&stream_handle, cmd.frequency_hz, cmd.duration);
        let _ = cmd.done.send(result);
    }
    log::debug!("Audio thread exiting");
}

fn play_burst(
    stream_handle: &OutputStreamHandle,
    frequency_hz: f64,
    duration: Duration,
) -> Result<(), ToneError> {
    if duration.is_zero() {
        return Ok(());
    }

    let source = SquareWave::new(frequency_hz as f32, SAMPLE_RATE, duration);
    stream_handle
        .play_raw(source.convert_samples())
        .map_err(|e| ToneError::Playback(e.to_string()))?;

    // play_raw returns immediately; hold the thread for the length of the burst
    thread::sleep(duration);
    Ok(())
}

/// Silent stand-in for a speaker: takes as long as a burst would, plays nothing.
pub struct MutedTone;

impl ToneOutput for MutedTone {
    fn emit(&self, frequency_hz: f64, duration_ms: f64) -> Result<(), ToneError> {
        log::trace!("Muted burst: {}Hz for {}ms", frequency_hz, duration_ms);
        thread::sleep(burst_duration(duration_ms));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_burst_duration() {
        assert_eq!(burst_duration(5.0), Duration::from_millis(5));
        assert_eq!(burst_duration(0.5), Duration::from_micros(500));
        assert_eq!(burst_duration(0.0), Duration::ZERO);
        assert_eq!(burst_duration(-3.0), Duration::ZERO);
        assert_eq!(burst_duration(f64::NAN), Duration::ZERO);
        assert_eq!(burst_duration(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_square_wave_length() {
        let wave = SquareWave::new(1000.0, SAMPLE_RATE, Duration::from_millis(5));
        assert_eq!(wave.current_frame_len(), Some(240));
        assert_eq!(wave.total_duration().map(|d| d.as_micros()), Some(5000));
        assert_eq!(wave.count(), 240);

        let empty = SquareWave::new(1000.0, SAMPLE_RATE, Duration::ZERO);
        assert_eq!(empty.count(), 0);
    }

    #[test]
    fn test_square_wave_shape() {
        // 1Hz at 8 samples per second: 4 high samples then 4 low
        let samples: Vec<f32> = SquareWave::new(1.0, 8, Duration::from_secs(1)).collect();
        assert_eq!(samples.len(), 8);
        assert!(samples[..4].iter().all(|&s| s == AMPLITUDE));
        assert!(samples[4..].iter().all(|&s| s == -AMPLITUDE));
    }

    #[test]
    fn test_muted_tone_blocks_for_burst() {
        let started = Instant::now();
        MutedTone.emit(440.0, 10.0).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
