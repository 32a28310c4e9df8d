use std::f32::consts::TAU;
use std::str::FromStr;

use crate::vector::Vector3D;

const CIRCLE_RADIUS: f32 = 80.0;
const HEART_SCALE: f32 = 8.0;
const STAR_OUTER_RADIUS: f32 = 80.0;
const STAR_INNER_RADIUS: f32 = 40.0;
const STAR_SPIKES: usize = 5;

/// Procedural formation outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    #[default]
    Circle,
    Heart,
    Star,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Heart => "heart",
            ShapeKind::Star => "star",
        }
    }

    /// Up to `count` points along the outline, in the z = 0 plane.
    pub fn points(self, count: usize) -> Vec<Vector3D> {
        match self {
            ShapeKind::Circle => circle_points(count),
            ShapeKind::Heart => heart_points(count),
            ShapeKind::Star => star_points(count),
        }
    }
}

/// Unknown names fall back to a circle.
impl FromStr for ShapeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "heart" => ShapeKind::Heart,
            "star" => ShapeKind::Star,
            _ => ShapeKind::Circle,
        })
    }
}

fn circle_points(count: usize) -> Vec<Vector3D> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            Vector3D::new(angle.cos() * CIRCLE_RADIUS, angle.sin() * CIRCLE_RADIUS, 0.0)
        })
        .collect()
}

fn heart_points(count: usize) -> Vec<Vector3D> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32 * TAU;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
            Vector3D::new(x * HEART_SCALE, y * HEART_SCALE, 0.0)
        })
        .collect()
}

fn star_vertex(index: usize) -> Vector3D {
    let corners = STAR_SPIKES * 2;
    let radius = if index % 2 == 0 {
        STAR_OUTER_RADIUS
    } else {
        STAR_INNER_RADIUS
    };
    let angle = (index % corners) as f32 / corners as f32 * TAU;
    Vector3D::new(angle.cos() * radius, angle.sin() * radius, 0.0)
}

/// Points spread evenly along the ten edges; `count / 10` per edge.
fn star_points(count: usize) -> Vec<Vector3D> {
    let corners = STAR_SPIKES * 2;
    let per_edge = count / corners;
    let mut points = Vec::with_capacity(per_edge * corners);

    for i in 0..corners {
        let start = star_vertex(i + corners - 1);
        let end = star_vertex(i);
        for j in 0..per_edge {
            points.push(start.lerp(&end, j as f32 / per_edge as f32));
        }
    }
    points
}
