use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::effects::registry::EffectRegistry;
use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::raster::TransferRaster;
use crate::layers::layer::LayerPayload;
use crate::render::compose::compose_owned;

/// Full-quality composition request sent to the worker thread.
#[derive(Debug)]
pub struct RenderJob {
    pub job_id: u64,
    pub base: TransferRaster,
    pub layers: Vec<LayerPayload>,
}

#[derive(Debug)]
pub enum RenderResponse {
    Done { job_id: u64, pixels: TransferRaster },
    Failed { job_id: u64, error: String },
}

impl RenderResponse {
    pub fn job_id(&self) -> u64 {
        match self {
            Self::Done { job_id, .. } | Self::Failed { job_id, .. } => *job_id,
        }
    }
}

/// One background thread composing [`RenderJob`]s with its own handle on the effect registry.
///
/// The thread only talks through channels. Dropping the handle disconnects the job channel: the
/// thread finishes whatever it is composing, fails to deliver it, and exits. That is how a job is
/// cancelled.
#[derive(Debug)]
pub struct RenderWorker {
    jobs: Sender<RenderJob>,
    results: Receiver<RenderResponse>,
}

impl RenderWorker {
    pub fn spawn(registry: Arc<EffectRegistry>) -> LayerforgeResult<Self> {
        let (jobs, job_rx) = bounded::<RenderJob>(1);
        let (result_tx, results) = bounded::<RenderResponse>(1);
        thread::Builder::new()
            .name("layerforge-render".to_owned())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let response = run_job(&registry, job);
                    if result_tx.send(response).is_err() {
                        break;
                    }
                }
                tracing::debug!("render worker exiting");
            })
            .map_err(|e| LayerforgeError::render_failed(format!("spawn render worker: {e}")))?;
        Ok(Self { jobs, results })
    }

    /// Hand a job to the thread. Fails when the thread is busy or gone; the job comes back so the
    /// caller can compose it elsewhere.
    pub fn submit(&self, job: RenderJob) -> Result<(), RenderJob> {
        match self.jobs.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) | Err(TrySendError::Disconnected(job)) => Err(job),
        }
    }

    pub fn try_recv(&self) -> Option<RenderResponse> {
        self.results.try_recv().ok()
    }

    /// Block until the in-flight job answers. `None` when the thread is gone.
    pub fn recv(&self) -> Option<RenderResponse> {
        self.results.recv().ok()
    }
}

fn run_job(registry: &EffectRegistry, job: RenderJob) -> RenderResponse {
    let RenderJob {
        job_id,
        base,
        layers,
    } = job;
    match compose_owned(base.into_raster(), &layers, registry) {
        Ok(out) => RenderResponse::Done {
            job_id,
            pixels: out.into_transferable(),
        },
        Err(e) => RenderResponse::Failed {
            job_id,
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/worker.rs"]
mod tests;
