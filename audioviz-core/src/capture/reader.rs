//! Device reads and PCM decoding.

use std::ops::ControlFlow;
use std::sync::Arc;

use super::CaptureBuffer;
use crate::error::CaptureError;
use crate::worker::Worker;

const S32_FRAME: usize = 4;
const S32_FULL_SCALE: f64 = 2_147_483_648.0;

/// A blocking capture device delivering one period of raw PCM per read.
pub trait PcmReader: Send + 'static {
    fn read_period(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Decode mono signed 32-bit little-endian PCM into `[-1, 1)`.
pub fn decode_s32le(raw: &[u8]) -> Result<Vec<f64>, CaptureError> {
    if raw.len() % S32_FRAME != 0 {
        return Err(CaptureError::Malformed {
            len: raw.len(),
            frame: S32_FRAME,
        });
    }
    Ok(raw
        .chunks_exact(S32_FRAME)
        .map(|frame| {
            let value = i32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
            f64::from(value) / S32_FULL_SCALE
        })
        .collect())
}

/// Moves decoded periods from a device into a [`CaptureBuffer`].
pub struct CaptureLoop<R> {
    reader: R,
    buffer: Arc<CaptureBuffer>,
}

impl<R: PcmReader> CaptureLoop<R> {
    pub fn new(reader: R, buffer: Arc<CaptureBuffer>) -> Self {
        Self { reader, buffer }
    }

    /// Read, decode and store one period.
    ///
    /// Failures reset the buffer to silence instead of propagating.
    pub fn step(&mut self) {
        let decoded = self
            .reader
            .read_period()
            .and_then(|raw| decode_s32le(&raw));

        match decoded {
            Ok(samples) => self.buffer.extend(&samples),
            Err(err) => {
                tracing::warn!(error = %err, "discarding capture period");
                self.buffer.reset();
            }
        }
    }

    /// Run [`step`](Self::step) on a worker thread until stopped.
    pub fn spawn(mut self) -> std::io::Result<Worker> {
        Worker::spawn("audio-capture", move || {
            self.step();
            ControlFlow::Continue(())
        })
    }
}
