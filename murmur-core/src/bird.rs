use std::collections::VecDeque;

use murmur_shared::{AgentFrame, SimulationParams, TextModeParams};
use rand::Rng;

use crate::vector::Vector3D;

/// Parameters whose change invalidates a drawn trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSnapshot {
    pub speed: f32,
    pub cohesion_factor: f32,
    pub alignment_factor: f32,
    pub separation_factor: f32,
    pub perception_radius: f32,
    pub boundary_radius: f32,
    pub wind_factor: f32,
    pub trail_length: usize,
    pub horizon_height: f32,
    pub min_camera_distance: f32,
    pub bird_size: f32,
}

impl From<&SimulationParams> for TrailSnapshot {
    fn from(params: &SimulationParams) -> Self {
        Self {
            speed: params.speed,
            cohesion_factor: params.cohesion_factor,
            alignment_factor: params.alignment_factor,
            separation_factor: params.separation_factor,
            perception_radius: params.perception_radius,
            boundary_radius: params.boundary_radius,
            wind_factor: params.wind_factor,
            trail_length: params.trail_length,
            horizon_height: params.horizon_height,
            min_camera_distance: params.min_camera_distance,
            bird_size: params.bird_size,
        }
    }
}

/// Ticks between two recorded trail points.
const TRAIL_FRAME_SKIP: u32 = 2;

/// A single bird of the murmuration
#[derive(Debug, Clone)]
pub struct Bird {
    pub id: usize,
    pub position: Vector3D,
    pub velocity: Vector3D,
    pub acceleration: Vector3D,
    pub size: f32,
    /// Past positions, oldest first.
    pub trail: VecDeque<Vector3D>,
    pub target_point: Option<Vector3D>,
    /// Blend between free flocking (0) and formation seeking (1).
    pub formation_weight: f32,
    last_params: Option<TrailSnapshot>,
    trail_update_counter: u32,
}

impl Bird {
    pub fn new(id: usize, position: Vector3D, velocity: Vector3D, size: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: Vector3D::zero(),
            size,
            trail: VecDeque::new(),
            target_point: None,
            formation_weight: 0.0,
            last_params: None,
            trail_update_counter: 0,
        }
    }

    /// Spawns inside `0.8 * boundary_radius` with a random unit velocity.
    pub fn random<R: Rng + ?Sized>(id: usize, boundary_radius: f32, size: f32, rng: &mut R) -> Self {
        let position = Vector3D::random_in_sphere(boundary_radius * 0.8, rng);
        let velocity = Vector3D::random_unit(rng);
        Self::new(id, position, velocity, size)
    }

    pub fn apply_force(&mut self, force: Vector3D) {
        self.acceleration += force;
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
        self.trail_update_counter = 0;
    }

    /// True on the first tick and whenever a trail-relevant parameter moved.
    pub fn params_changed(&self, snapshot: &TrailSnapshot) -> bool {
        match &self.last_params {
            None => true,
            // Bird size is part of the snapshot, so size changes always clear.
            Some(last) => last != snapshot,
        }
    }

    /// Steps the formation weight by `transition_speed` toward its goal.
    pub fn update_formation_weight(&mut self, is_text_mode: bool, text_params: &TextModeParams) {
        let step = text_params.transition_speed;
        if is_text_mode && self.target_point.is_some() {
            if text_params.maintain_formation && self.formation_weight < 1.0 {
                self.formation_weight += step;
            } else if !text_params.maintain_formation && self.formation_weight > 0.0 {
                self.formation_weight -= step;
            }
        } else if self.formation_weight > 0.0 {
            self.formation_weight -= step;
        }
        self.formation_weight = self.formation_weight.clamp(0.0, 1.0);
    }

    /// Applies one tick worth of `flocking` force plus the formation pull,
    /// integrates, and maintains the trail.
    pub fn advance(
        &mut self,
        flocking: Vector3D,
        params: &SimulationParams,
        is_text_mode: bool,
        text_params: &TextModeParams,
    ) {
        let snapshot = TrailSnapshot::from(params);
        let params_changed = self.params_changed(&snapshot);

        self.apply_force(flocking);

        self.update_formation_weight(is_text_mode, text_params);
        if is_text_mode && self.target_point.is_some() {
            let formation = behavior::formation_seek(self, params);
            self.apply_force(formation);
        }

        self.integrate(params.max_speed * params.speed);
        self.update_trail(params, params_changed);

        self.last_params = Some(snapshot);
    }

    pub fn integrate(&mut self, speed_limit: f32) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limit(speed_limit);
        self.position += self.velocity;
        self.acceleration = Vector3D::zero();
    }

    fn update_trail(&mut self, params: &SimulationParams, params_changed: bool) {
        if !params.show_trails {
            self.trail.clear();
            return;
        }

        if params_changed {
            self.clear_trail();
        }

        self.trail_update_counter += 1;
        if self.trail_update_counter >= TRAIL_FRAME_SKIP {
            self.trail.push_back(self.position);
            self.trail_update_counter = 0;
        }
        while self.trail.len() > params.trail_length {
            self.trail.pop_front();
        }
    }

    pub fn to_frame(&self) -> AgentFrame {
        AgentFrame {
            id: self.id,
            position: self.position.to_array(),
            velocity: self.velocity.to_array(),
            size: self.size,
            formation_weight: self.formation_weight,
            trail: self.trail.iter().map(|p| p.to_array()).collect(),
        }
    }
}

/// Steering forces. Each returns a force already scaled by its factor.
pub mod behavior {
    use super::*;

    /// Below this distance seeking slows down proportionally.
    const ARRIVAL_RADIUS: f32 = 10.0;
    /// Depth below the horizon at which the lift force saturates.
    const HORIZON_RAMP: f32 = 20.0;

    /// Reynolds steering toward `heading` at `max_speed`.
    fn steer_towards(bird: &Bird, heading: Vector3D, params: &SimulationParams) -> Vector3D {
        let desired = heading.normalize() * params.max_speed;
        (desired - bird.velocity).limit(params.max_force)
    }

    pub fn separation<'a, I>(bird: &Bird, others: I, params: &SimulationParams) -> Vector3D
    where
        I: Iterator<Item = &'a Bird>,
    {
        let desired_separation = params.perception_radius * 0.5;
        let mut steering = Vector3D::zero();
        let mut count = 0;

        for other in others {
            let distance = bird.position.distance(&other.position);
            if distance > 0.0 && distance < desired_separation {
                // Closer neighbors push harder.
                steering += (bird.position - other.position).normalize() / distance;
                count += 1;
            }
        }

        if count > 0 {
            steering = steering / count as f32;
        }

        if steering.magnitude() > 0.0 {
            steering = steer_towards(bird, steering, params);
        }

        steering * params.separation_factor
    }

    pub fn alignment<'a, I>(bird: &Bird, others: I, params: &SimulationParams) -> Vector3D
    where
        I: Iterator<Item = &'a Bird>,
    {
        let mut sum = Vector3D::zero();
        let mut count = 0;

        for other in others {
            let distance = bird.position.distance(&other.position);
            if distance > 0.0 && distance < params.perception_radius {
                sum += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            steer_towards(bird, sum / count as f32, params) * params.alignment_factor
        } else {
            Vector3D::zero()
        }
    }

    pub fn cohesion<'a, I>(bird: &Bird, others: I, params: &SimulationParams) -> Vector3D
    where
        I: Iterator<Item = &'a Bird>,
    {
        let mut sum = Vector3D::zero();
        let mut count = 0;

        for other in others {
            let distance = bird.position.distance(&other.position);
            if distance > 0.0 && distance < params.perception_radius {
                sum += other.position;
                count += 1;
            }
        }

        if count > 0 {
            seek(bird, sum / count as f32, params) * params.cohesion_factor
        } else {
            Vector3D::zero()
        }
    }

    /// Seek with arrival slow-down inside `ARRIVAL_RADIUS`.
    pub fn seek(bird: &Bird, target: Vector3D, params: &SimulationParams) -> Vector3D {
        let desired = target - bird.position;
        let distance = desired.magnitude();
        let speed = if distance < ARRIVAL_RADIUS {
            distance / ARRIVAL_RADIUS * params.max_speed
        } else {
            params.max_speed
        };
        (desired.normalize() * speed - bird.velocity).limit(params.max_force)
    }

    /// Soft spherical containment past 80% of the boundary radius.
    pub fn boundary(bird: &Bird, params: &SimulationParams) -> Vector3D {
        let radius = params.boundary_radius;
        let distance = bird.position.magnitude();
        let threshold = radius * 0.8;

        if distance > threshold {
            let desired = bird.position.normalize() * -params.max_speed;
            let steer = (desired - bird.velocity).limit(params.max_force);
            let scale = ((distance - threshold) / (radius * 0.2)).min(1.0);
            steer * (scale * 2.0)
        } else {
            Vector3D::zero()
        }
    }

    pub fn horizon(bird: &Bird, params: &SimulationParams) -> Vector3D {
        if bird.position.y < params.horizon_height {
            let depth = params.horizon_height - bird.position.y;
            let strength = (depth / HORIZON_RAMP).min(1.0) * params.max_force * 2.0;
            Vector3D::new(0.0, strength, 0.0)
        } else {
            Vector3D::zero()
        }
    }

    /// Pushes birds away from the camera at the origin. Birds deep in
    /// formation resist the push.
    pub fn camera_distance(bird: &Bird, params: &SimulationParams) -> Vector3D {
        let distance = bird.position.magnitude();
        if distance < params.min_camera_distance {
            let depth = (params.min_camera_distance - distance) / params.min_camera_distance;
            let formation_reduction = (1.0 - bird.formation_weight * 0.8).max(0.0);
            let strength = depth.min(1.0) * params.max_force * 2.0 * formation_reduction;
            bird.position.normalize() * strength
        } else {
            Vector3D::zero()
        }
    }

    pub fn wind(params: &SimulationParams) -> Vector3D {
        if params.wind_factor == 0.0 {
            return Vector3D::zero();
        }
        Vector3D::from(params.wind_direction) * params.wind_factor
    }

    /// Pull toward the assigned target point, weighted by formation weight.
    pub fn formation_seek(bird: &Bird, params: &SimulationParams) -> Vector3D {
        let Some(target) = bird.target_point else {
            return Vector3D::zero();
        };

        let desired = target - bird.position;
        let distance = desired.magnitude();
        let speed = if distance > 10.0 {
            params.max_speed * 1.5
        } else if distance < 5.0 {
            distance / 5.0 * params.max_speed
        } else {
            params.max_speed
        };

        // Targets near the camera need extra grip to hold against the crowd.
        let center_factor = if target.magnitude() < 30.0 { 1.5 } else { 1.0 };

        let steer = (desired.normalize() * speed - bird.velocity)
            .limit(params.max_force * 2.0 * center_factor);
        steer * bird.formation_weight
    }

    /// Sum of the seven free-flight forces acting on `bird`.
    pub fn flocking_force(bird: &Bird, flock: &[Bird], params: &SimulationParams) -> Vector3D {
        separation(bird, flock.iter(), params)
            + alignment(bird, flock.iter(), params)
            + cohesion(bird, flock.iter(), params)
            + boundary(bird, params)
            + horizon(bird, params)
            + wind(params)
            + camera_distance(bird, params)
    }
}
