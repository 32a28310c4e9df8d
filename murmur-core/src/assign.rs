use rand::seq::SliceRandom;
use rand::Rng;

use crate::bird::Bird;
use crate::vector::Vector3D;

/// Hands a shuffled copy of `points` to the birds in list order.
///
/// The first `min(birds, points)` birds each receive a distinct point; the
/// rest lose any target they had. Returns the number of assigned birds.
pub fn assign_targets<R: Rng + ?Sized>(
    birds: &mut [Bird],
    points: &[Vector3D],
    rng: &mut R,
) -> usize {
    let assigned = birds.len().min(points.len());

    let mut shuffled = points.to_vec();
    shuffled.shuffle(rng);

    for (bird, point) in birds.iter_mut().zip(shuffled) {
        bird.target_point = Some(point);
    }
    for bird in birds.iter_mut().skip(assigned) {
        bird.target_point = None;
    }

    log::debug!(
        "Assigned {} of {} target points to {} birds",
        assigned,
        points.len(),
        birds.len()
    );
    assigned
}

/// Drops every bird's target, leaving formation weights to decay.
pub fn clear_targets(birds: &mut [Bird]) {
    for bird in birds.iter_mut() {
        bird.target_point = None;
    }
}
