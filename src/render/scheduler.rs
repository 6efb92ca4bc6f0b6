use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::effects::registry::EffectRegistry;
use crate::foundation::config::EditorConfig;
use crate::foundation::error::LayerforgeResult;
use crate::foundation::raster::Raster;
use crate::layers::layer::LayerPayload;
use crate::render::base_cache::BaseImageCache;
use crate::render::compose::compose_owned;
use crate::render::worker::{RenderJob, RenderResponse, RenderWorker};

/// The state a render should produce: the base plus the ordered layer payload.
#[derive(Clone, Debug, Default)]
pub struct RenderRequest {
    pub base: Option<Arc<Raster>>,
    pub layers: Vec<LayerPayload>,
}

impl RenderRequest {
    pub fn new(base: Option<Arc<Raster>>, layers: Vec<LayerPayload>) -> Self {
        Self { base, layers }
    }

    pub fn has_renderable_layers(&self) -> bool {
        self.layers.iter().any(LayerPayload::is_renderable)
    }
}

/// Counters exposed to hosts and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    pub previews: u64,
    pub full_renders: u64,
    pub skipped: u64,
    pub dropped_results: u64,
    pub coalesced: u64,
    pub worker_restarts: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub preview_scale: f32,
    pub preview_delay: Duration,
    pub full_quality_delay: Duration,
    pub use_worker: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for SchedulerConfig {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            preview_scale: cfg.preview_scale,
            preview_delay: cfg.preview_delay(),
            full_quality_delay: cfg.full_quality_delay(),
            use_worker: cfg.render_worker,
        }
    }
}

/// Two-tier render scheduler: a debounced low-resolution preview followed by a deferred
/// full-quality pass.
///
/// The scheduler never reads the clock on its own. Callers pass `now` to
/// [`request_render`](Self::request_render) and [`pump`](Self::pump), which makes ticks
/// deterministic under test. Previews compose synchronously inside `pump`, so at most one exists
/// at a time. Full-quality jobs go to the worker thread when one is available: one job in flight,
/// at most one queued behind it, and a newer request replaces the queued one.
///
/// Job ids increase monotonically. A result is applied only if its id is at least
/// `min_accepted` (raised whenever the requested state changes or a job is cancelled) and greater
/// than the last applied id, so display updates always move forward.
#[derive(Debug)]
pub struct RenderScheduler {
    config: SchedulerConfig,
    registry: Arc<EffectRegistry>,
    cache: BaseImageCache,
    latest: Option<RenderRequest>,
    display: Option<Raster>,
    preview_due: Option<Instant>,
    full_due: Option<Instant>,
    worker: Option<RenderWorker>,
    next_job_id: u64,
    in_flight: Option<u64>,
    queued: Option<RenderJob>,
    last_applied: u64,
    min_accepted: u64,
    render_failed: bool,
    stats: RenderStats,
}

impl RenderScheduler {
    pub fn new(config: SchedulerConfig, registry: Arc<EffectRegistry>) -> Self {
        let worker = if config.use_worker {
            spawn_worker(&registry)
        } else {
            None
        };
        Self {
            config,
            registry,
            cache: BaseImageCache::new(),
            latest: None,
            display: None,
            preview_due: None,
            full_due: None,
            worker,
            next_job_id: 0,
            in_flight: None,
            queued: None,
            last_applied: 0,
            min_accepted: 0,
            render_failed: false,
            stats: RenderStats::default(),
        }
    }

    pub fn registry(&self) -> &Arc<EffectRegistry> {
        &self.registry
    }

    pub fn display(&self) -> Option<&Raster> {
        self.display.as_ref()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether a tick is pending or a full-quality job is in flight or queued.
    pub fn is_rendering(&self) -> bool {
        self.preview_due.is_some()
            || self.full_due.is_some()
            || self.in_flight.is_some()
            || self.queued.is_some()
    }

    /// Next instant at which [`pump`](Self::pump) has timed work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.preview_due, self.full_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn render_failed(&self) -> bool {
        self.render_failed
    }

    /// Read and clear the failure flag raised by a failed render since the last call.
    pub fn take_render_failed(&mut self) -> bool {
        std::mem::take(&mut self.render_failed)
    }

    /// Mark the base as changed; the next render rebuilds the cache.
    pub fn invalidate_base(&mut self) {
        self.cache.invalidate();
    }

    pub fn base_cache(&self) -> &BaseImageCache {
        &self.cache
    }

    /// Schedule a render of `request`.
    ///
    /// Pending ticks are dropped and anything already dispatched becomes stale. With no renderable
    /// layer the base is written to the display at once. `immediate` goes straight to full quality;
    /// otherwise a preview tick is armed `preview_delay` from `now`.
    pub fn request_render(&mut self, now: Instant, request: RenderRequest, immediate: bool) {
        self.preview_due = None;
        self.full_due = None;
        self.min_accepted = self.next_job_id + 1;
        if self.queued.take().is_some() {
            self.stats.coalesced += 1;
        }

        let renderable = request.has_renderable_layers();
        self.latest = Some(request);
        if !renderable {
            self.show_base();
            return;
        }
        if immediate {
            self.start_full();
        } else {
            self.preview_due = Some(now + self.config.preview_delay);
        }
    }

    /// Apply worker results and fire due ticks. Returns whether the display changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let mut changed = self.drain_worker();
        if self.preview_due.is_some_and(|due| due <= now) {
            self.preview_due = None;
            changed |= self.run_preview();
            self.full_due = Some(now + self.config.full_quality_delay);
        }
        if self.full_due.is_some_and(|due| due <= now) {
            self.full_due = None;
            changed |= self.start_full();
        }
        changed
    }

    /// Settle everything: a pending preview is superseded by an immediate full-quality pass, and
    /// the worker is waited on until no job is in flight or queued.
    pub fn flush(&mut self) -> bool {
        let mut changed = self.drain_worker();
        loop {
            if self.preview_due.take().is_some() {
                self.full_due = Some(Instant::now());
            }
            if self.full_due.take().is_some() {
                changed |= self.start_full();
                continue;
            }
            if let Some(job_id) = self.in_flight {
                let response = self
                    .worker
                    .as_ref()
                    .and_then(RenderWorker::recv)
                    .unwrap_or_else(|| RenderResponse::Failed {
                        job_id,
                        error: "render worker disconnected".to_owned(),
                    });
                changed |= self.handle_response(response);
                continue;
            }
            if self.queued.is_some() {
                changed |= self.dispatch_queued();
                continue;
            }
            break;
        }
        changed
    }

    /// Drop pending ticks and the queued job; an in-flight job is abandoned by replacing the
    /// worker, so its result can never land.
    pub fn cancel(&mut self) {
        self.preview_due = None;
        self.full_due = None;
        self.queued = None;
        self.min_accepted = self.next_job_id + 1;
        if self.in_flight.is_some() {
            self.restart_worker();
        }
    }

    /// Compose `request` at full quality on the calling thread and show it.
    pub fn render_sync(&mut self, request: RenderRequest) -> LayerforgeResult<Option<&Raster>> {
        self.cancel();
        self.latest = Some(request);
        let job_id = self.alloc_job_id();
        let Some(job) = self.build_job(job_id) else {
            self.display = None;
            return Ok(None);
        };
        let out = compose_owned(job.base.into_raster(), &job.layers, &self.registry)?;
        self.apply_full(job_id, out);
        Ok(self.display.as_ref())
    }

    pub(crate) fn handle_response(&mut self, response: RenderResponse) -> bool {
        if self.in_flight == Some(response.job_id()) {
            self.in_flight = None;
        }
        let mut changed = match response {
            RenderResponse::Done { job_id, pixels } => self.apply_full(job_id, pixels.into_raster()),
            RenderResponse::Failed { job_id, error } => {
                tracing::warn!(job_id, %error, "render worker failed, composing in process");
                self.render_failed = true;
                self.restart_worker();
                match self.accepts(job_id).then(|| self.build_job(job_id)).flatten() {
                    Some(job) => self.compose_in_process(job),
                    None => false,
                }
            }
        };
        changed |= self.dispatch_queued();
        changed
    }

    fn alloc_job_id(&mut self) -> u64 {
        self.next_job_id += 1;
        self.next_job_id
    }

    fn accepts(&self, job_id: u64) -> bool {
        job_id >= self.min_accepted && job_id > self.last_applied
    }

    fn show_base(&mut self) {
        let base = self
            .latest
            .as_ref()
            .and_then(|req| self.cache.ensure(req.base.as_deref()))
            .cloned();
        self.display = base;
        self.stats.skipped += 1;
    }

    fn build_job(&mut self, job_id: u64) -> Option<RenderJob> {
        let req = self.latest.as_ref()?;
        let base = self.cache.ensure(req.base.as_deref())?;
        Some(RenderJob {
            job_id,
            base: base.clone().into_transferable(),
            layers: req.layers.clone(),
        })
    }

    fn run_preview(&mut self) -> bool {
        let scale = self.config.preview_scale;
        let Some(req) = self.latest.as_ref() else {
            return false;
        };
        let Some(base) = self.cache.ensure(req.base.as_deref()) else {
            self.display = None;
            return true;
        };
        let (w, h) = base.dimensions();
        let pw = ((w as f32 * scale).round() as u32).max(1);
        let ph = ((h as f32 * scale).round() as u32).max(1);
        let preview = base
            .scale_to(pw, ph)
            .and_then(|small| compose_owned(small, &req.layers, &self.registry))
            .and_then(|out| out.scale_to(w, h));
        match preview {
            Ok(out) => {
                self.display = Some(out);
                self.stats.previews += 1;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "preview render failed");
                self.render_failed = true;
                false
            }
        }
    }

    fn start_full(&mut self) -> bool {
        let job_id = self.alloc_job_id();
        match self.build_job(job_id) {
            Some(job) => self.dispatch(job),
            None => self.display.take().is_some(),
        }
    }

    fn dispatch(&mut self, job: RenderJob) -> bool {
        if self.worker.is_none() {
            return self.compose_in_process(job);
        }
        if self.in_flight.is_some() {
            if self.queued.replace(job).is_some() {
                self.stats.coalesced += 1;
            }
            return false;
        }
        self.send_to_worker(job)
    }

    fn dispatch_queued(&mut self) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        match self.queued.take() {
            Some(job) => self.send_to_worker(job),
            None => false,
        }
    }

    fn send_to_worker(&mut self, job: RenderJob) -> bool {
        let job_id = job.job_id;
        let Some(worker) = self.worker.as_ref() else {
            return self.compose_in_process(job);
        };
        match worker.submit(job) {
            Ok(()) => {
                self.in_flight = Some(job_id);
                false
            }
            Err(job) => {
                tracing::warn!(job_id, "render worker refused job, composing in process");
                self.restart_worker();
                self.compose_in_process(job)
            }
        }
    }

    fn compose_in_process(&mut self, job: RenderJob) -> bool {
        let job_id = job.job_id;
        match compose_owned(job.base.into_raster(), &job.layers, &self.registry) {
            Ok(out) => self.apply_full(job_id, out),
            Err(e) => {
                tracing::warn!(job_id, error = %e, "full-quality render failed");
                self.render_failed = true;
                false
            }
        }
    }

    fn apply_full(&mut self, job_id: u64, pixels: Raster) -> bool {
        if !self.accepts(job_id) {
            tracing::debug!(job_id, last_applied = self.last_applied, "dropping stale render");
            self.stats.dropped_results += 1;
            return false;
        }
        self.last_applied = job_id;
        self.display = Some(pixels);
        self.stats.full_renders += 1;
        true
    }

    fn drain_worker(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.worker.as_ref().and_then(RenderWorker::try_recv) {
            changed |= self.handle_response(response);
        }
        changed
    }

    fn restart_worker(&mut self) {
        self.worker = None;
        self.in_flight = None;
        self.stats.worker_restarts += 1;
        if self.config.use_worker {
            self.worker = spawn_worker(&self.registry);
        }
    }
}

fn spawn_worker(registry: &Arc<EffectRegistry>) -> Option<RenderWorker> {
    match RenderWorker::spawn(Arc::clone(registry)) {
        Ok(worker) => Some(worker),
        Err(e) => {
            tracing::warn!(error = %e, "render worker unavailable, composing in process");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;
