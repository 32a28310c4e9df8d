use murmur_core::{
    regenerate_population, tick, Bird, Murmuration, Raster, RasterError, SimulationParams,
    TextModeParams, TextRasterizer, TextStyle, Vector3D,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fills a centered rectangle sized by the text length.
struct StubRasterizer;

impl TextRasterizer for StubRasterizer {
    fn rasterize(
        &self,
        text: &str,
        _style: &TextStyle,
        width: usize,
        height: usize,
    ) -> Result<Raster, RasterError> {
        let mut raster = Raster::new(width, height);
        let half = (text.len() * 15).min(width / 2 - 1);
        for y in height / 2 - 30..height / 2 + 30 {
            for x in width / 2 - half..width / 2 + half {
                raster.set(x, y, 255);
            }
        }
        Ok(raster)
    }
}

fn params_with(count: usize) -> SimulationParams {
    SimulationParams {
        bird_count: count,
        ..SimulationParams::default()
    }
}

#[test]
fn resize_keeps_low_ids_and_clears_trails() {
    let mut rng = StdRng::seed_from_u64(5);
    let params = SimulationParams {
        show_trails: true,
        ..params_with(50)
    };
    let text = TextModeParams::default();

    let mut birds = regenerate_population(Vec::new(), 50, 160.0, 0.6, &mut rng);
    for _ in 0..10 {
        tick(&mut birds, &params, false, &text);
    }
    assert!(birds.iter().all(|b| !b.trail.is_empty()));
    let original: Vec<Vector3D> = birds.iter().map(|b| b.position).collect();

    let birds = regenerate_population(birds, 70, 160.0, 0.6, &mut rng);
    let ids: Vec<usize> = birds.iter().map(|b| b.id).collect();
    assert_eq!(ids, (0..70).collect::<Vec<_>>());
    for (bird, position) in birds.iter().zip(&original) {
        assert_eq!(bird.position, *position);
    }
    assert!(birds.iter().all(|b| b.trail.is_empty()));

    let birds = regenerate_population(birds, 30, 160.0, 0.6, &mut rng);
    let ids: Vec<usize> = birds.iter().map(|b| b.id).collect();
    assert_eq!(ids, (0..30).collect::<Vec<_>>());
    assert!(birds.iter().all(|b| b.trail.is_empty()));
}

#[test]
fn driver_resize_through_params() {
    let mut flock = Murmuration::new(
        params_with(50),
        TextModeParams::default(),
        Box::new(StubRasterizer),
        9,
    );
    flock.set_params(params_with(70));
    assert_eq!(flock.birds().len(), 70);
    assert_eq!(flock.birds()[69].id, 69);

    flock.set_params(params_with(30));
    let ids: Vec<usize> = flock.birds().iter().map(|b| b.id).collect();
    assert_eq!(ids, (0..30).collect::<Vec<_>>());
}

#[test]
fn trail_never_exceeds_length() {
    let params = SimulationParams {
        show_trails: true,
        trail_length: 5,
        ..params_with(40)
    };
    let mut flock = Murmuration::new(params, TextModeParams::default(), Box::new(StubRasterizer), 3);

    for _ in 0..60 {
        flock.tick();
        assert!(flock.birds().iter().all(|b| b.trail.len() <= 5));
    }
    assert!(flock.birds().iter().all(|b| b.trail.len() == 5));
}

#[test]
fn formation_weight_stays_in_unit_range() {
    let text = TextModeParams {
        transition_speed: 0.15,
        ..TextModeParams::default()
    };
    let mut flock = Murmuration::new(params_with(60), text.clone(), Box::new(StubRasterizer), 1);
    flock.set_text_mode(true);

    for step in 0..40 {
        if step == 20 {
            flock.set_text_params(TextModeParams {
                maintain_formation: false,
                ..text.clone()
            });
        }
        flock.tick();
        for bird in flock.birds() {
            assert!((0.0..=1.0).contains(&bird.formation_weight));
        }
    }
}

#[test]
fn formation_pulls_flock_toward_targets() {
    let text = TextModeParams {
        transition_speed: 0.05,
        ..TextModeParams::default()
    };
    let params = SimulationParams {
        speed: 1.0,
        ..params_with(80)
    };
    let mut flock = Murmuration::new(params, text, Box::new(StubRasterizer), 21);
    flock.set_text_mode(true);

    let start = flock.stats().mean_target_distance.unwrap();
    for _ in 0..300 {
        flock.tick();
    }
    let end = flock.stats().mean_target_distance.unwrap();
    assert!(end < start * 0.5, "start {} end {}", start, end);
    assert!(flock.stats().mean_formation_weight > 0.99);
}

// Releasing the formation decays the weight to zero, but the target stays
// assigned until text mode itself is left.
#[test]
fn released_formation_keeps_stale_targets() {
    let text = TextModeParams {
        transition_speed: 0.25,
        ..TextModeParams::default()
    };
    let mut flock = Murmuration::new(params_with(20), text.clone(), Box::new(StubRasterizer), 4);
    flock.set_text_mode(true);
    for _ in 0..8 {
        flock.tick();
    }

    flock.set_text_params(TextModeParams {
        maintain_formation: false,
        ..text
    });
    for _ in 0..8 {
        flock.tick();
    }

    for bird in flock.birds() {
        assert_eq!(bird.formation_weight, 0.0);
        assert!(bird.target_point.is_some());
    }

    flock.set_text_mode(false);
    assert!(flock.birds().iter().all(|b| b.target_point.is_none()));
}

#[test]
fn leaving_text_mode_decays_weight_to_zero() {
    let text = TextModeParams {
        transition_speed: 0.1,
        ..TextModeParams::default()
    };
    let mut flock = Murmuration::new(params_with(25), text, Box::new(StubRasterizer), 6);
    flock.set_text_mode(true);
    for _ in 0..5 {
        flock.tick();
    }
    let held: Vec<f32> = flock.birds().iter().map(|b| b.formation_weight).collect();
    assert!(held.iter().all(|&w| (w - 0.5).abs() < 1e-5));

    flock.set_text_mode(false);
    // Leaving does not snap the weight; it steps down each tick.
    for (bird, before) in flock.birds().iter().zip(&held) {
        assert_eq!(bird.formation_weight, *before);
    }

    flock.tick();
    for (bird, before) in flock.birds().iter().zip(&held) {
        assert!(bird.target_point.is_none());
        assert!((bird.formation_weight - (before - 0.1)).abs() < 1e-5);
    }

    for _ in 0..10 {
        flock.tick();
    }
    assert!(flock.birds().iter().all(|b| b.formation_weight == 0.0));
    flock.tick();
    assert!(flock.birds().iter().all(|b| b.formation_weight == 0.0));
}

#[test]
fn same_seed_same_flight() {
    let run = || {
        let mut flock = Murmuration::new(
            params_with(60),
            TextModeParams::default(),
            Box::new(StubRasterizer),
            77,
        );
        flock.set_text_mode(true);
        for _ in 0..50 {
            flock.tick();
        }
        flock.birds().iter().map(|b| b.position).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn neighbors_are_read_from_tick_start() {
    let params = SimulationParams::default();
    let text = TextModeParams::default();
    let a = Bird::new(0, Vector3D::new(0.0, 50.0, 0.0), Vector3D::new(1.0, 0.0, 0.0), 1.0);
    let b = Bird::new(1, Vector3D::new(0.0, 54.0, 0.0), Vector3D::new(-1.0, 0.0, 0.0), 1.0);

    let mut forward = vec![a.clone(), b.clone()];
    let mut backward = vec![b, a];
    tick(&mut forward, &params, false, &text);
    tick(&mut backward, &params, false, &text);

    // The update order must not matter for a symmetric pair.
    assert!(forward[0].position.distance(&backward[1].position) < 1e-5);
    assert!(forward[1].position.distance(&backward[0].position) < 1e-5);
    assert!((forward[0].position.y + forward[1].position.y - 104.0).abs() < 1e-4);
}

#[test]
fn empty_text_means_no_targets() {
    let text = TextModeParams {
        text: String::new(),
        ..TextModeParams::default()
    };
    let mut flock = Murmuration::new(params_with(15), text, Box::new(StubRasterizer), 2);
    flock.set_text_mode(true);
    assert!(flock.birds().iter().all(|b| b.target_point.is_none()));
    assert!(flock.tick());
}

#[test]
fn boundary_change_in_text_mode_reassigns() {
    let mut flock = Murmuration::new(
        params_with(40),
        TextModeParams::default(),
        Box::new(StubRasterizer),
        8,
    );
    flock.set_text_mode(true);
    let before: Vec<_> = flock.birds().iter().map(|b| b.target_point).collect();

    let mut params = flock.params().clone();
    params.boundary_radius = 200.0;
    flock.set_params(params);

    let after: Vec<_> = flock.birds().iter().map(|b| b.target_point).collect();
    assert!(after.iter().all(Option::is_some));
    // Same point set, reshuffled.
    assert_ne!(before, after);
}
