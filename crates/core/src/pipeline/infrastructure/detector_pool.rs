use std::collections::BTreeMap;
use std::thread::JoinHandle;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detector_provider::DetectorProvider;
use crate::shared::frame::Frame;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Per-frame detections grouped by container stream, dense in frame order.
pub type StreamDetections = BTreeMap<usize, Vec<Vec<Detection>>>;

/// Bounded pool of detector workers for the detection pass.
///
/// Each worker owns its own detector instance (model sessions are not
/// shared across threads). The job channel capacity equals the worker
/// count, so `submit` blocks once every worker is busy and one job is
/// queued per worker; the decode loop never runs ahead of inference by
/// more than that.
///
/// Workers complete out of order; `finish` re-sorts the results into
/// dense per-stream lists keyed by frame index.
pub struct DetectorPool {
    job_tx: Option<crossbeam_channel::Sender<Frame>>,
    result_rx: crossbeam_channel::Receiver<Result<((usize, usize), Vec<Detection>), SendError>>,
    handles: Vec<JoinHandle<()>>,
}

impl DetectorPool {
    /// Creates `workers` detectors from the provider and starts one thread
    /// per detector. Detector construction happens up front so model
    /// loading failures surface before any frame is decoded.
    pub fn spawn(
        provider: &dyn DetectorProvider,
        workers: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let workers = workers.max(1);
        let mut detectors = Vec::with_capacity(workers);
        for _ in 0..workers {
            detectors.push(provider.create()?);
        }

        let (job_tx, job_rx) = crossbeam_channel::bounded::<Frame>(workers);
        let (result_tx, result_rx) =
            crossbeam_channel::bounded::<Result<((usize, usize), Vec<Detection>), SendError>>(
                workers,
            );

        let handles = detectors
            .into_iter()
            .map(|mut detector| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                std::thread::spawn(move || {
                    for frame in job_rx {
                        let result = match detector.detect(&frame) {
                            Ok(faces) => Ok((frame.key(), faces)),
                            Err(e) => Err(e.to_string().into()),
                        };
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                    detector.close();
                })
            })
            .collect();

        Ok(Self {
            job_tx: Some(job_tx),
            result_rx,
            handles,
        })
    }

    /// Queues a frame for detection, blocking while all workers are busy.
    /// Drains finished results opportunistically so workers never stall on
    /// a full result channel.
    pub fn submit(
        &self,
        frame: Frame,
        collected: &mut BTreeMap<(usize, usize), Vec<Detection>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut pending = frame;
        loop {
            for result in self.result_rx.try_iter() {
                let (key, faces) = result.map_err(|e| e.to_string())?;
                collected.insert(key, faces);
            }

            let tx = self
                .job_tx
                .as_ref()
                .ok_or("detector pool already finished")?;
            match tx.send_timeout(pending, std::time::Duration::from_millis(50)) {
                Ok(()) => return Ok(()),
                Err(crossbeam_channel::SendTimeoutError::Timeout(frame)) => {
                    pending = frame;
                }
                Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => {
                    return Err("detector worker exited unexpectedly".into());
                }
            }
        }
    }

    /// Stops accepting jobs, waits for in-flight detections, joins the
    /// workers and re-sorts everything collected so far into dense
    /// per-stream frame lists. Frames the reader skipped produce empty
    /// entries so list indices stay aligned with frame indices.
    pub fn finish(
        mut self,
        mut collected: BTreeMap<(usize, usize), Vec<Detection>>,
    ) -> Result<StreamDetections, Box<dyn std::error::Error>> {
        self.job_tx.take();

        let mut first_error: Option<String> = None;
        for result in self.result_rx.iter() {
            match result {
                Ok((key, faces)) => {
                    collected.insert(key, faces);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                }
            }
        }

        for handle in self.handles.drain(..) {
            if handle.join().is_err() && first_error.is_none() {
                first_error = Some("detector worker panicked".to_string());
            }
        }

        if let Some(message) = first_error {
            return Err(message.into());
        }

        let mut streams = StreamDetections::new();
        for ((stream, frame_index), faces) in collected {
            let list = streams.entry(stream).or_default();
            if list.len() <= frame_index {
                list.resize_with(frame_index + 1, Vec::new);
            }
            list[frame_index] = faces;
        }
        Ok(streams)
    }
}
