//! k-d tree and range tree against a linear scan.

use impulse2d::{KdTree, RangeQuery, RangeTree2D, Rect, SimError, Vec2};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scan(points: &[Vec2], values: &[usize], range: &Rect) -> Vec<usize> {
    let mut v: Vec<usize> = values.iter().copied().filter(|&i| range.contains(points[i])).collect();
    v.sort_unstable();
    v
}

fn query<T: RangeQuery<usize>>(tree: &T, range: &Rect) -> Vec<usize> {
    let mut v = tree.range_query(range);
    v.sort_unstable();
    v
}

fn random_rect(rng: &mut StdRng, bounds: f32) -> Rect {
    Rect::new(
        rng.gen_range(-bounds..bounds),
        rng.gen_range(-bounds..bounds),
        rng.gen_range(-bounds..bounds),
        rng.gen_range(-bounds..bounds),
    )
}

fn run_trials(trials: usize, points_per_trial: usize, queries: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..trials {
        let points: Vec<Vec2> = (0..points_per_trial)
            .map(|_| Vec2::new(rng.gen_range(-400.0..400.0), rng.gen_range(-400.0..400.0)))
            .collect();
        let values: Vec<usize> = (0..points.len()).collect();
        let kd = KdTree::new(&points, &values).unwrap();
        let rt = RangeTree2D::new(&points, &values).unwrap();
        for _ in 0..queries {
            let range = random_rect(&mut rng, 450.0);
            let want = scan(&points, &values, &range);
            assert_eq!(query(&kd, &range), want);
            assert_eq!(query(&rt, &range), want);
        }
    }
}

#[test]
fn empty_input() {
    let range = Rect::new(-30.0, 30.0, -20.0, 20.0);
    let kd = KdTree::<usize>::new(&[], &[]).unwrap();
    let rt = RangeTree2D::<usize>::new(&[], &[]).unwrap();
    assert!(query(&kd, &range).is_empty());
    assert!(query(&rt, &range).is_empty());
}

#[test]
fn cross_pattern() {
    let points = [
        Vec2::new(0.0, 0.0),
        Vec2::new(-20.0, -20.0),
        Vec2::new(-20.0, 20.0),
        Vec2::new(20.0, 20.0),
        Vec2::new(20.0, -20.0),
    ];
    let values: Vec<usize> = (0..5).collect();
    let range = Rect::new(-30.0, 10.0, -30.0, 10.0);
    let kd = <KdTree<usize> as RangeQuery<usize>>::build(&points, &values).unwrap();
    let rt = <RangeTree2D<usize> as RangeQuery<usize>>::build(&points, &values).unwrap();
    assert_eq!(query(&kd, &range), vec![0, 1]);
    assert_eq!(query(&rt, &range), vec![0, 1]);
}

#[test]
fn length_mismatch_rejected() {
    let points = [Vec2::ZERO, Vec2::ONE];
    let err = RangeTree2D::new(&points, &[0usize]).unwrap_err();
    assert_eq!(err, SimError::LengthMismatch { points: 2, values: 1 });
    assert!(KdTree::new(&points, &[0usize, 1, 2]).is_err());
}

#[test]
fn random_trials() {
    run_trials(10, 1000, 200, 42);
}

#[test]
#[ignore = "long-running: 1000 trials x 1000 points x 1000 rectangles"]
fn random_trials_full() {
    run_trials(1000, 1000, 1000, 4242);
}

fn arb_point() -> impl Strategy<Value = Vec2> {
    // small integer grid so duplicates and edge hits are common
    (-8i32..8, -8i32..8).prop_map(|(x, y)| Vec2::new(x as f32, y as f32))
}

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-9i32..9, -9i32..9, -9i32..9, -9i32..9)
        .prop_map(|(a, b, c, d)| Rect::new(a as f32, b as f32, c as f32, d as f32))
}

proptest! {
    #[test]
    fn trees_agree_with_scan(points in prop::collection::vec(arb_point(), 0..64), range in arb_rect()) {
        let values: Vec<usize> = (0..points.len()).collect();
        let want = scan(&points, &values, &range);
        let kd = KdTree::new(&points, &values).unwrap();
        let rt = RangeTree2D::new(&points, &values).unwrap();
        prop_assert_eq!(query(&kd, &range), want.clone());
        prop_assert_eq!(query(&rt, &range), want);
    }
}
