//! Circle overlap tests and pair enumeration
//!
//! Every entity is treated as a circle of radius `width / 2`. That is close
//! enough for rocks, ships and round pickups, and keeps the test to one
//! squared-distance comparison.
//!
//! Only the category pairs in [`INTERACTING_PAIRS`] are ever tested. The
//! table is the whole collision matrix: pairs not listed (asteroid against
//! asteroid, bullet against ship, ...) never interact. Black holes act on
//! every collidable category and are handled by the interaction resolver
//! after the table.

use super::entity::{Body, Category, Entity};

/// Category pairs checked each tick, in resolution order.
/// The first category drives the outer loop.
pub const INTERACTING_PAIRS: [(Category, Category); 7] = [
    (Category::Asteroid, Category::Bullet),
    (Category::Asteroid, Category::Missile),
    (Category::Asteroid, Category::Station),
    (Category::Ship, Category::Asteroid),
    (Category::Ship, Category::Beacon),
    (Category::Station, Category::Ship),
    (Category::Ship, Category::SupplyPackage),
];

/// True iff the centers are strictly closer than the sum of radii
#[inline]
pub fn collides(a: &Body, b: &Body) -> bool {
    let reach = a.radius() + b.radius();
    a.pos.distance_squared(b.pos) < reach * reach
}

/// Centers within `radius` of each other (inclusive)
#[inline]
pub fn within_radius(a: &Body, b: &Body, radius: f32) -> bool {
    a.pos.distance_squared(b.pos) <= radius * radius
}

/// Indices of live entities of one category, in registry order
pub fn live_indices(entities: &[Entity], category: Category) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.category() == category && !e.is_destroyed())
        .map(|(i, _)| i)
        .collect()
}

/// Borrow two distinct entities mutably, in the order asked
pub fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (left, right) = entities.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = entities.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Call `hit(outer, inner)` for every overlapping live pair of the two
/// categories. Candidates are filtered before pairing, and both sides are
/// re-checked before each test so an entity destroyed by an earlier hit in
/// the same sweep takes no further part.
pub fn sweep<F>(entities: &mut [Entity], outer: Category, inner: Category, mut hit: F)
where
    F: FnMut(&mut Entity, &mut Entity),
{
    let outers = live_indices(entities, outer);
    let inners = live_indices(entities, inner);

    for &i in &outers {
        for &j in &inners {
            if i == j {
                continue;
            }
            if entities[i].is_destroyed() {
                break;
            }
            if entities[j].is_destroyed() {
                continue;
            }
            if collides(&entities[i].body, &entities[j].body) {
                let (a, b) = pair_mut(entities, i, j);
                hit(a, b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::BoundaryPolicy;
    use glam::Vec2;
    use proptest::prelude::*;

    fn disc(x: f32, y: f32, radius: f32) -> Body {
        Body::round(Vec2::new(x, y), radius, BoundaryPolicy::WrapAround)
    }

    #[test]
    fn test_touching_is_not_collision() {
        // Distance 20 == 10 + 10
        assert!(!collides(&disc(0.0, 0.0, 10.0), &disc(20.0, 0.0, 10.0)));
        assert!(collides(&disc(0.0, 0.0, 10.0), &disc(19.9, 0.0, 10.0)));
    }

    #[test]
    fn test_within_radius_inclusive() {
        assert!(within_radius(&disc(0.0, 0.0, 60.0), &disc(30.0, 0.0, 1.0), 30.0));
        assert!(!within_radius(&disc(0.0, 0.0, 60.0), &disc(30.1, 0.0, 1.0), 30.0));
    }

    #[test]
    fn test_pair_mut_order() {
        let mut entities = vec![
            Entity::asteroid(Vec2::ZERO, 0.0, 10.0, 0.0, 0.0),
            Entity::asteroid(Vec2::ZERO, 0.0, 20.0, 0.0, 0.0),
        ];
        let (a, b) = pair_mut(&mut entities, 1, 0);
        assert_eq!(a.body.radius(), 20.0);
        assert_eq!(b.body.radius(), 10.0);
    }

    #[test]
    fn test_sweep_skips_destroyed() {
        let tuning = crate::Tuning::default();
        let mut entities = vec![
            Entity::asteroid(Vec2::new(100.0, 100.0), 0.0, 30.0, 0.0, 0.0),
            Entity::bullet(Vec2::new(100.0, 100.0), 0.0, &tuning),
            Entity::bullet(Vec2::new(105.0, 100.0), 0.0, &tuning),
        ];
        let mut hits = 0;
        sweep(&mut entities, Category::Asteroid, Category::Bullet, |rock, bullet| {
            hits += 1;
            bullet.body.destroy();
            rock.body.destroy();
        });
        // The rock is gone after the first bullet
        assert_eq!(hits, 1);
        assert!(!entities[2].is_destroyed());
    }

    #[test]
    fn test_unlisted_pairs_never_meet() {
        assert!(
            !INTERACTING_PAIRS
                .iter()
                .any(|&(a, b)| (a, b) == (Category::Asteroid, Category::Asteroid))
        );
        assert!(
            INTERACTING_PAIRS
                .iter()
                .all(|&(a, b)| a != Category::Effect && b != Category::Effect)
        );
    }

    proptest! {
        #[test]
        fn collision_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.5f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, br in 0.5f32..100.0,
        ) {
            let a = disc(ax, ay, ar);
            let b = disc(bx, by, br);
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }
    }
}
