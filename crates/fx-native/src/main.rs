//! Headless tour of the reading room: hovers and clicks every bound object in
//! turn, lets each effect play, dismisses it and checks nothing leaked.

use anyhow::{bail, Context};
use fx_core::effects::EffectKind;
use fx_core::scene::{AssetReadiness, Transform, DEFAULT_BINDINGS};
use fx_core::spectrum::SyntheticBackend;
use fx_core::{FxHost, FxParams};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;
const PLAY_FRAMES: usize = 240;
const MAX_TEARDOWN_FRAMES: usize = 600;

fn seed_from_env() -> anyhow::Result<u64> {
    match std::env::var("FX_SEED") {
        Ok(s) => s
            .parse()
            .with_context(|| format!("FX_SEED must be an unsigned integer, got `{s}`")),
        Err(_) => Ok(FxParams::default().seed),
    }
}

/// Lay the bound objects out on a shelf arc facing the camera.
fn shelf() -> Vec<(&'static str, Transform, f32)> {
    let n = DEFAULT_BINDINGS.len();
    DEFAULT_BINDINGS
        .iter()
        .enumerate()
        .map(|(i, &(name, _))| {
            let a = (i as f32 / (n - 1) as f32 - 0.5) * std::f32::consts::FRAC_PI_2;
            let position = Vec3::new(a.sin() * 6.0, 1.0 + (i % 2) as f32 * 0.8, -a.cos() * 2.0);
            (
                name,
                Transform {
                    position,
                    yaw: -a,
                },
                0.45,
            )
        })
        .collect()
}

fn run(host: &mut FxHost, frames: usize) {
    for _ in 0..frames {
        host.frame(DT);
    }
}

fn visit(host: &mut FxHost, name: &str) -> anyhow::Result<()> {
    let item = host
        .registry()
        .get(name)
        .with_context(|| format!("{name} not registered"))?;
    let kind = item.effect();
    let ndc = host
        .camera()
        .project(item.base().position)
        .with_context(|| format!("{name} is behind the camera"))?;

    host.pointer_moved(ndc);
    let stats = host.frame(DT);
    if host.hovered().map(|i| i.id()) != Some(name) {
        bail!("pointer at {ndc} did not hover {name} (hovered {:?})", stats.hovered);
    }

    host.click()?;
    if host.orchestrator().active_kind() != Some(kind) {
        bail!("clicking {name} did not start {kind}");
    }
    run(host, PLAY_FRAMES / 2);
    if kind == EffectKind::Liberation {
        host.click()?;
    }
    run(host, PLAY_FRAMES / 2);

    let (layer_count, particles) = {
        let layers = host.layers();
        (layers.len(), layers.iter().map(|l| l.len()).sum::<usize>())
    };
    log::info!(
        "[tour] {name} -> {kind}: {layer_count} layers, {particles} particles, popup {:?}",
        host.presentation().popup
    );

    host.stop_all();
    let mut frames = 0;
    while !host.orchestrator().is_idle() {
        host.frame(DT);
        frames += 1;
        if frames > MAX_TEARDOWN_FRAMES {
            bail!("{kind} teardown did not finish");
        }
    }
    log::info!("[tour] {kind} torn down in {frames} frames");
    if !host.presentation().is_default() {
        bail!("{kind} left presentation changed");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let seed = seed_from_env()?;
    let mut host = FxHost::new(
        FxParams::with_seed(seed),
        Box::new(SyntheticBackend { bins: 128 }),
    );
    *host.assets_mut() = AssetReadiness::all_ready();
    host.load_scene(shelf());
    run(&mut host, 1);

    for &(name, _) in DEFAULT_BINDINGS {
        visit(&mut host, name)?;
    }

    let buffers = host.buffers();
    log::info!(
        "[tour] done after {} frames; {} buffers allocated, {} live",
        host.time().frame,
        buffers.allocated(),
        buffers.live()
    );
    if buffers.live() != 0 {
        bail!("{} particle buffers leaked", buffers.live());
    }
    Ok(())
}
