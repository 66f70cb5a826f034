//! Resource Resolver Tests
//!
//! Tests for:
//! - Provider-label dispatch to entity components
//! - Omission of bindings a provider cannot supply
//! - Environment resolution against the shared environment

use myth_variants::render::{
    ResourceProvider, ResourceResolver, SharedEnvironment, HeadlessBackend, resolve_environment,
};
use myth_variants::shader::ShaderComposer;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Handle {
    Texture(&'static str),
    Sampler(&'static str),
}

struct MaterialComponent {
    textures: Vec<&'static str>,
}

impl ResourceProvider<Handle> for MaterialComponent {
    fn resource(&self, name: &str) -> Option<Handle> {
        let name = self.textures.iter().copied().find(|t| *t == name)?;
        Some(if name.ends_with("Sampler") {
            Handle::Sampler(name)
        } else {
            Handle::Texture(name)
        })
    }
}

struct WeatherComponent {
    mask: &'static str,
}

#[derive(Default)]
struct Entity {
    material: Option<MaterialComponent>,
    weather: Option<WeatherComponent>,
}

fn resolver() -> ResourceResolver<Entity, Handle> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut resolver = ResourceResolver::new();
    resolver.register_provider("material", |e: &Entity| e.material.as_ref());
    resolver.register("weather", |e: &Entity, name: &str| {
        let weather = e.weather.as_ref()?;
        match name {
            "wetnessMaskTexture" => Some(Handle::Texture(weather.mask)),
            "wetnessMaskSampler" => Some(Handle::Sampler("linear")),
            _ => None,
        }
    });
    resolver
}

#[test]
fn bindings_resolve_from_their_declared_providers() {
    let shader = ShaderComposer::default()
        .compose(&["textured", "wetness"])
        .unwrap();
    let entity = Entity {
        material: Some(MaterialComponent {
            textures: vec!["baseColorTexture", "baseColorSampler"],
        }),
        weather: Some(WeatherComponent { mask: "puddles" }),
    };

    let resolved = resolver().resolve(&entity, &shader.binding_layout);
    let got: Vec<(u32, Handle)> = resolved.into_iter().map(|r| (r.binding, r.resource)).collect();
    assert_eq!(
        got,
        [
            (0, Handle::Texture("baseColorTexture")),
            (1, Handle::Sampler("baseColorSampler")),
            (10, Handle::Texture("puddles")),
            (11, Handle::Sampler("linear")),
        ]
    );
}

#[test]
fn absent_components_are_omitted_silently() {
    let shader = ShaderComposer::default()
        .compose(&["textured", "wetness"])
        .unwrap();
    let entity = Entity {
        weather: Some(WeatherComponent { mask: "puddles" }),
        ..Default::default()
    };

    let resolved = resolver().resolve(&entity, &shader.binding_layout);
    assert_eq!(resolved.len(), 2);
    assert!(resolved.iter().all(|r| r.name.starts_with("wetnessMask")));
}

#[test]
fn environment_bindings_resolve_against_the_shared_environment() {
    let shader = ShaderComposer::default().compose(&["ibl"]).unwrap();
    let mut env = SharedEnvironment::<HeadlessBackend, Handle>::new();
    env.set_resource("diffuseCubemap", Handle::Texture("irradiance"));
    env.set_resource("cubemapSampler", Handle::Sampler("trilinear"));

    let resolved = resolve_environment(&env, &shader.environment_layout);
    let got: Vec<(u32, &str)> = resolved.iter().map(|r| (r.binding, &*r.name)).collect();
    assert_eq!(got, [(4, "diffuseCubemap"), (7, "cubemapSampler")]);
}
