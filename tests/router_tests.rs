// Pointer picking and hover animation against the default room camera.

use fx_core::effects::EffectKind;
use fx_core::router::{frame_smoothing, intersect_all, Cursor, HoverParams, InteractionRouter};
use fx_core::scene::{ray_sphere, Camera, InteractableRegistry, Transform};
use glam::{Vec2, Vec3};

const DT: f32 = 1.0 / 60.0;

fn at(position: Vec3) -> Transform {
    Transform {
        position,
        yaw: 0.0,
    }
}

fn room() -> (Camera, InteractableRegistry) {
    let mut registry = InteractableRegistry::new();
    registry.register("book2", at(Vec3::new(-2.0, 1.0, 0.0)), 0.5, EffectKind::Heart);
    registry.register("book5", at(Vec3::new(2.0, 1.0, 0.0)), 0.5, EffectKind::Wave);
    (Camera::default(), registry)
}

fn aim(camera: &Camera, registry: &InteractableRegistry, id: &str) -> Vec2 {
    let item = registry.get(id).unwrap();
    camera.project(item.base().position).unwrap()
}

#[test]
fn ray_sphere_hits_front_and_reports_exit_from_inside() {
    let t = ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 5.0), 2.0).unwrap();
    assert!((t - 3.0).abs() < 1e-5);
    let inside = ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::ZERO, 1.0).unwrap();
    assert!((inside - 1.0).abs() < 1e-5);
    assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 5.0, 5.0), 1.0).is_none());
    assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -5.0), 1.0).is_none());
}

#[test]
fn nearest_intersection_wins() {
    let camera = Camera::default();
    let dir = camera.forward();
    let mut registry = InteractableRegistry::new();
    registry.register("far", at(camera.eye + dir * 10.0), 0.5, EffectKind::Globe);
    registry.register("near", at(camera.eye + dir * 5.0), 0.5, EffectKind::Popup);

    let ray = camera.ray_from_ndc(Vec2::ZERO);
    let hits = intersect_all(&ray, &registry);
    assert_eq!(hits.len(), 2);
    assert_eq!(registry.at(hits[0].index).unwrap().id(), "near");
    assert!(hits[0].distance < hits[1].distance);

    let mut router = InteractionRouter::new(HoverParams::default());
    router.pointer_moved(Vec2::ZERO);
    router.update(&camera, &mut registry, DT);
    assert_eq!(router.hovered_id(&registry), Some("near"));
}

#[test]
fn pointer_over_object_hovers_it() {
    let (camera, mut registry) = room();
    let mut router = InteractionRouter::new(HoverParams::default());
    assert_eq!(router.cursor(), Cursor::Default);

    router.pointer_moved(aim(&camera, &registry, "book5"));
    let hovered = router.update(&camera, &mut registry, DT);
    assert_eq!(hovered, registry.index_of("book5"));
    assert_eq!(router.cursor(), Cursor::Pointer);

    router.pointer_moved(Vec2::new(0.99, 0.99));
    assert_eq!(router.update(&camera, &mut registry, DT), None);
    assert_eq!(router.cursor(), Cursor::Default);
}

#[test]
fn hover_raise_is_relative_to_base_and_never_accumulates() {
    let (camera, mut registry) = room();
    let base = registry.get("book2").unwrap().base();
    let target = aim(&camera, &registry, "book2");
    let mut router = InteractionRouter::new(HoverParams::default());

    for _ in 0..5 {
        router.pointer_moved(target);
        for _ in 0..600 {
            router.update(&camera, &mut registry, DT);
        }
        let item = registry.get("book2").unwrap();
        assert!((item.hover_offset() - 0.3).abs() < 1e-3);
        assert_eq!(item.base(), base);

        router.pointer_left();
        for _ in 0..600 {
            router.update(&camera, &mut registry, DT);
        }
        let item = registry.get("book2").unwrap();
        assert!(item.hover_offset().abs() < 1e-3);
    }
}

#[test]
fn hover_offset_never_overshoots() {
    let (camera, mut registry) = room();
    let target = aim(&camera, &registry, "book2");
    let mut router = InteractionRouter::new(HoverParams::default());
    router.pointer_moved(target);
    let mut last = 0.0;
    for _ in 0..300 {
        router.update(&camera, &mut registry, DT);
        let offset = registry.get("book2").unwrap().hover_offset();
        assert!(offset >= last - 1e-6);
        assert!(offset <= 0.3 + 1e-5);
        last = offset;
    }
}

#[test]
fn click_target_respects_active_effect() {
    let (camera, mut registry) = room();
    let mut router = InteractionRouter::new(HoverParams::default());
    assert_eq!(router.click_target(false), None);

    router.pointer_moved(aim(&camera, &registry, "book2"));
    router.update(&camera, &mut registry, DT);
    assert_eq!(router.click_target(false), registry.index_of("book2"));
    assert_eq!(router.click_target(true), None);
}

#[test]
fn non_finite_pointer_is_ignored() {
    let mut router = InteractionRouter::new(HoverParams::default());
    router.pointer_moved(Vec2::new(0.1, 0.2));
    router.pointer_moved(Vec2::new(f32::NAN, 0.0));
    assert_eq!(router.pointer(), Some(Vec2::new(0.1, 0.2)));
}

#[test]
fn smoothing_matches_reference_rate() {
    assert!((frame_smoothing(0.1, DT) - 0.1).abs() < 1e-5);
    let two = frame_smoothing(0.1, 2.0 * DT);
    assert!((two - 0.19).abs() < 1e-4);
    assert_eq!(frame_smoothing(0.1, 0.0), 0.0);
}

#[test]
fn registering_same_id_replaces() {
    let mut registry = InteractableRegistry::new();
    registry.register("globe", at(Vec3::ZERO), 0.5, EffectKind::Globe);
    registry.register("globe", at(Vec3::ONE), 0.0, EffectKind::Globe);
    assert_eq!(registry.len(), 1);
    let item = registry.get("globe").unwrap();
    assert_eq!(item.base().position, Vec3::ONE);
    assert!(item.pick_radius() > 0.0);
}

#[test]
fn pixels_map_to_ndc() {
    use fx_core::router::pixel_to_ndc;
    let size = Vec2::new(800.0, 600.0);
    assert_eq!(pixel_to_ndc(Vec2::ZERO, size), Some(Vec2::new(-1.0, 1.0)));
    assert_eq!(pixel_to_ndc(size, size), Some(Vec2::new(1.0, -1.0)));
    assert_eq!(pixel_to_ndc(size * 0.5, size), Some(Vec2::ZERO));
    assert_eq!(pixel_to_ndc(Vec2::ONE, Vec2::new(0.0, 600.0)), None);
}
