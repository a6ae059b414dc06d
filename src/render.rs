//! Bridge to the page's JavaScript renderer. The renderer owns the GPU, the
//! loaded room model and the glyph font; each frame it receives the camera,
//! shared presentation, hover transforms and every live particle layer.

use fx_core::buffer::ParticleBuffer;
use fx_core::presentation::{Sky, Tint};
use fx_core::FxHost;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = fxRenderer, js_name = beginFrame)]
    fn begin_frame(view: &[f32], projection: &[f32], background: &[f32]);

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = setFog)]
    fn set_fog(color: &[f32], near: f32, far: f32);

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = clearFog)]
    fn clear_fog();

    /// `mode` is `"none"`, `"night"` or `"night-vision"`.
    #[wasm_bindgen(js_namespace = fxRenderer, js_name = setTint)]
    fn set_tint(mode: &str, color: &[f32], amount: f32);

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = setSkyTime)]
    fn set_sky_time(time: f32);

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = setObjectTransform)]
    fn set_object_transform(name: &str, x: f32, y: f32, z: f32, yaw: f32);

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = drawPoints)]
    fn draw_points(
        label: &str,
        positions: &[f32],
        colors: &[f32],
        origin: &[f32],
        yaw: f32,
        opacity: f32,
        size: f32,
        additive: bool,
    );

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = drawGlyphs)]
    fn draw_glyphs(text: &str, positions: &[f32], colors: &[f32], opacity: f32, size: f32);

    #[wasm_bindgen(js_namespace = fxRenderer, js_name = endFrame)]
    fn end_frame();
}

fn draw_layer(layer: &ParticleBuffer) {
    let colors = layer.as_flat_colors().unwrap_or(&[]);
    let material = layer.material;
    match layer.glyphs() {
        Some(glyphs) => {
            let text: String = glyphs.iter().collect();
            draw_glyphs(
                &text,
                layer.as_flat_positions(),
                colors,
                material.opacity,
                material.size,
            );
        }
        None => draw_points(
            layer.label(),
            layer.as_flat_positions(),
            colors,
            &layer.transform.origin.to_array(),
            layer.transform.yaw,
            material.opacity,
            material.size,
            material.additive,
        ),
    }
}

pub fn draw(host: &FxHost) {
    let camera = host.camera();
    let presentation = host.presentation();
    begin_frame(
        &camera.view_matrix().to_cols_array(),
        &camera.projection_matrix().to_cols_array(),
        &presentation.background,
    );

    match presentation.fog {
        Some(fog) => set_fog(&fog.color, fog.near, fog.far),
        None => clear_fog(),
    }
    match presentation.tint {
        Some(Tint::Night { color, amount }) => set_tint("night", &color, amount),
        Some(Tint::NightVision { color }) => set_tint("night-vision", &color, 1.0),
        None => set_tint("none", &[1.0, 1.0, 1.0], 0.0),
    }
    if let Sky::TieDye { time } = presentation.sky {
        set_sky_time(time);
    }

    for item in host.registry().iter() {
        let t = item.animated();
        set_object_transform(item.id(), t.position.x, t.position.y, t.position.z, t.yaw);
    }
    for layer in host.layers() {
        draw_layer(layer);
    }
    end_frame();
}
