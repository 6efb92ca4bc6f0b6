use super::*;
use crate::effects::registry::GREYSCALE;
use crate::foundation::raster::Raster;
use crate::layers::params::ParamValues;

fn job(job_id: u64, effect: &str) -> RenderJob {
    RenderJob {
        job_id,
        base: Raster::from_rgba(1, 1, vec![10, 20, 30, 255])
            .unwrap()
            .into_transferable(),
        layers: vec![LayerPayload::effect(effect, 1.0, ParamValues::new())],
    }
}

#[test]
fn worker_composes_and_echoes_job_id() {
    let worker = RenderWorker::spawn(Arc::new(EffectRegistry::builtin())).unwrap();
    worker.submit(job(7, GREYSCALE)).unwrap();
    match worker.recv().unwrap() {
        RenderResponse::Done { job_id, pixels } => {
            assert_eq!(job_id, 7);
            assert_eq!(pixels.into_raster().pixel(0, 0), [20, 20, 20, 255]);
        }
        other => panic!("unexpected response {other:?}"),
    }
}

#[test]
fn effect_panic_comes_back_as_failure() {
    fn boom(_: &mut Raster, _: &ParamValues) {
        panic!("kaput");
    }
    let mut reg = EffectRegistry::builtin();
    reg.register(crate::effects::registry::EffectDef {
        id: "boom",
        label: "Boom",
        apply: boom,
        schema: crate::layers::params::Params::new,
    });
    let worker = RenderWorker::spawn(Arc::new(reg)).unwrap();
    worker.submit(job(3, "boom")).unwrap();
    let resp = worker.recv().unwrap();
    assert_eq!(resp.job_id(), 3);
    assert!(matches!(resp, RenderResponse::Failed { ref error, .. } if error.contains("kaput")));

    // The thread survives a failed job.
    worker.submit(job(4, GREYSCALE)).unwrap();
    assert_eq!(worker.recv().unwrap().job_id(), 4);
}
