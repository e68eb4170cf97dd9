use std::time::Instant;

use impulse2d::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn coord(seed: &mut u32, bounds: f32) -> f32 {
    unit(seed) * 2.0 * bounds - bounds
}

fn random_rect(seed: &mut u32, bounds: f32) -> Rect {
    Rect::new(coord(seed, bounds), coord(seed, bounds), coord(seed, bounds), coord(seed, bounds))
}

/// Build time and total query time in ms, plus the number of reported hits.
fn time_tree<T: RangeQuery<usize>>(points: &[Vec2], values: &[usize], queries: &[Rect]) -> SimResult<(f64, f64, usize)> {
    let t0 = Instant::now();
    let tree = T::build(points, values)?;
    let build_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let t1 = Instant::now();
    let hits: usize = queries.iter().map(|q| tree.range_query(q).len()).sum();
    Ok((build_ms, t1.elapsed().as_secs_f64() * 1000.0, hits))
}

fn time_scan(points: &[Vec2], queries: &[Rect]) -> (f64, usize) {
    let t0 = Instant::now();
    let hits = queries.iter().map(|q| points.iter().filter(|&&p| q.contains(p)).count()).sum();
    (t0.elapsed().as_secs_f64() * 1000.0, hits)
}

fn main() -> SimResult<()> {
    let bounds = 400.0;
    let n_vals = [1_000usize, 10_000, 100_000];
    let n_queries = 1_000;
    println!("n,structure,build_ms,query_ms,hits");
    for &n in &n_vals {
        let mut seed = 7u32;
        let points: Vec<Vec2> = (0..n).map(|_| Vec2::new(coord(&mut seed, bounds), coord(&mut seed, bounds))).collect();
        let values: Vec<usize> = (0..n).collect();
        let queries: Vec<Rect> = (0..n_queries).map(|_| random_rect(&mut seed, bounds * 1.1)).collect();

        let (build_ms, query_ms, hits) = time_tree::<KdTree<usize>>(&points, &values, &queries)?;
        println!("{},KdTree,{:.3},{:.3},{}", n, build_ms, query_ms, hits);
        let (build_ms, query_ms, hits) = time_tree::<RangeTree2D<usize>>(&points, &values, &queries)?;
        println!("{},RangeTree2D,{:.3},{:.3},{}", n, build_ms, query_ms, hits);
        let (query_ms, hits) = time_scan(&points, &queries);
        println!("{},LinearScan,0.000,{:.3},{}", n, query_ms, hits);
    }
    Ok(())
}
