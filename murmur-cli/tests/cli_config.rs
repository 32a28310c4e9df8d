use std::fs;
use std::path::PathBuf;

use murmur_cli::{
    build_flock, resolve_settings, run, write_frames, ConfigFile, Overrides,
};
use murmur_core::{AgentFrame, FormationSource, ShapeKind};
use murmur_shared::{PresetLibrary, SimulationParams};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("murmur-cli-{}-{}", std::process::id(), name))
}

#[test]
fn defaults_without_config_or_overrides() {
    let settings =
        resolve_settings(ConfigFile::default(), &Overrides::default(), &PresetLibrary::new())
            .unwrap();
    assert_eq!(settings.params, SimulationParams::default());
    assert_eq!(settings.text_params.text, "MURMURATION");
    assert!(!settings.text_mode);
    assert_eq!(settings.source, FormationSource::Text);
}

#[test]
fn config_file_is_partial_and_camel_case() {
    let path = scratch_path("partial.json");
    fs::write(
        &path,
        r#"{
            "simulation": { "birdCount": 64, "windFactor": 0.4 },
            "text": { "text": "HI", "fontSize": 8 },
            "textMode": true,
            "formation": "star"
        }"#,
    )
    .unwrap();

    let config = ConfigFile::load(&path).unwrap();
    fs::remove_file(&path).ok();

    let settings = resolve_settings(config, &Overrides::default(), &PresetLibrary::new()).unwrap();
    assert_eq!(settings.params.bird_count, 64);
    assert_eq!(settings.params.wind_factor, 0.4);
    assert_eq!(settings.params.max_speed, 3.0);
    assert_eq!(settings.text_params.text, "HI");
    assert_eq!(settings.text_params.font_size, 8.0);
    assert!(settings.text_mode);
    assert_eq!(settings.source, FormationSource::Shape(ShapeKind::Star));
}

#[test]
fn preset_replaces_config_simulation_and_overrides_win() {
    let config = ConfigFile {
        simulation: Some(SimulationParams {
            bird_count: 64,
            ..SimulationParams::default()
        }),
        ..ConfigFile::default()
    };
    let overrides = Overrides {
        preset: Some("Windy Day".to_string()),
        birds: Some(90),
        text: Some("FLOCK".to_string()),
        formation: Some("heart".to_string()),
        trails: true,
        ..Overrides::default()
    };

    let settings = resolve_settings(config, &overrides, &PresetLibrary::new()).unwrap();
    assert_eq!(settings.params.wind_factor, 0.3);
    assert_eq!(settings.params.bird_count, 90);
    assert!(settings.params.show_trails);
    assert_eq!(settings.text_params.text, "FLOCK");
    assert_eq!(settings.source, FormationSource::Shape(ShapeKind::Heart));
}

#[test]
fn unknown_preset_is_an_error() {
    let overrides = Overrides {
        preset: Some("Hurricane".to_string()),
        ..Overrides::default()
    };
    let err = resolve_settings(ConfigFile::default(), &overrides, &PresetLibrary::new())
        .unwrap_err()
        .to_string();
    assert!(err.contains("Hurricane"));
    assert!(err.contains("Calm"));
}

#[test]
fn missing_or_invalid_config_reports_path() {
    let missing = scratch_path("missing.json");
    let err = format!("{:#}", ConfigFile::load(&missing).unwrap_err());
    assert!(err.contains("missing.json"));

    let bad = scratch_path("bad.json");
    fs::write(&bad, "{ nope").unwrap();
    let err = format!("{:#}", ConfigFile::load(&bad).unwrap_err());
    fs::remove_file(&bad).ok();
    assert!(err.contains("Invalid config JSON"));
}

#[test]
fn shape_run_settles_and_dumps_frames() {
    let overrides = Overrides {
        birds: Some(60),
        formation: Some("circle".to_string()),
        text_mode: true,
        trails: true,
        ..Overrides::default()
    };
    let settings =
        resolve_settings(ConfigFile::default(), &overrides, &PresetLibrary::new()).unwrap();
    let mut flock = build_flock(&settings, 7);

    let stats = run(&mut flock, 120, 40);
    assert_eq!(stats.count, 60);
    assert_eq!(stats.targeted, 60);
    assert!(stats.mean_formation_weight > 0.9);

    let path = scratch_path("frames.json");
    write_frames(&path, &flock.frames()).unwrap();
    let json = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).ok();

    let frames: Vec<AgentFrame> = serde_json::from_str(&json).unwrap();
    assert_eq!(frames.len(), 60);
    assert!(frames.iter().all(|f| !f.trail.is_empty()));
    assert!(json.contains("formationWeight"));
}

#[test]
fn text_run_uses_bitmap_font_targets() {
    let overrides = Overrides {
        birds: Some(200),
        text: Some("OK".to_string()),
        text_mode: true,
        ..Overrides::default()
    };
    let settings =
        resolve_settings(ConfigFile::default(), &overrides, &PresetLibrary::new()).unwrap();
    let flock = build_flock(&settings, 2);
    assert!(flock.stats().targeted > 0);
}
