//! The built-in demo scene: a diffuse sphere behind a glass sphere over a
//! checkered floor, lit by two point lights.

use whit_tracer::{
    Albedo, Color, GeometryResult, Light, Material, Sphere, TriangleMesh, Vec2, Vec3, World, WorldConfig,
};

pub fn demo_world(config: WorldConfig) -> GeometryResult<World> {
    let mut world = World::new(config);

    world.add_surface(Sphere::new(
        Vec3::new(-1.0, 0.0, -12.0),
        2.0,
        Material::diffuse(Color::new(0.6, 0.7, 0.8)),
    ));
    world.add_surface(Sphere::new(Vec3::new(0.5, -0.5, -8.0), 1.5, Material::glass(1.5)));
    world.add_surface(floor()?);

    world.add_light(Light::point(Vec3::new(-20.0, 70.0, 20.0), Color::splat(0.5)));
    world.add_light(Light::point(Vec3::new(30.0, 50.0, -12.0), Color::splat(0.5)));

    log::info!(
        "Demo scene: {} surfaces, {} lights",
        world.surfaces().len(),
        world.lights().len()
    );

    world.finalize_acceleration();
    Ok(world)
}

fn floor() -> GeometryResult<TriangleMesh> {
    let vertices = vec![
        Vec3::new(-5.0, -3.0, -6.0),
        Vec3::new(5.0, -3.0, -6.0),
        Vec3::new(5.0, -3.0, -16.0),
        Vec3::new(-5.0, -3.0, -16.0),
    ];
    let texture_coords = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    TriangleMesh::with_attributes(
        vertices,
        vec![0, 1, 3, 1, 2, 3],
        None,
        Some(texture_coords),
        Material::textured(Albedo::floor_checker()),
    )
}
