use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;
use quaternions::find_best_quaternion;
use quaternions::tle::{StaticFetcher, TleSource};
use quaternions::Scene;

const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

fn bench_find_best_quaternion(c: &mut Criterion) {
    let b1 = Vector3::new(0.0, 0.0, 1.0);
    let b2 = Vector3::new(0.0, 1.0, 0.0);
    let t1 = Vector3::new(0.3, -0.8, 0.52);
    let t2 = Vector3::new(0.1, 0.4, 0.9);

    c.bench_function("find_best_quaternion", |b| {
        b.iter(|| find_best_quaternion(black_box(&b1), black_box(&b2), black_box(&t1), black_box(&t2)))
    });
}

fn bench_scene_update(c: &mut Criterion) {
    let epoch = Utc
        .with_ymd_and_hms(2008, 9, 20, 12, 25, 40)
        .single()
        .expect("valid epoch");
    let mut scene = Scene::new().expect("default scene");
    scene.clock_mut().set_time(epoch);

    let fetcher = StaticFetcher::new();
    let source = TleSource::Tle {
        tle: ISS_TLE.to_string(),
    };
    for i in 0..10 {
        scene
            .add_satellite(&format!("sat{}", i), &source, None, None, &fetcher)
            .expect("satellite");
    }

    let mut group = c.benchmark_group("scene_update");
    group.bench_function("10_satellites", |b| {
        let mut minute = 0;
        b.iter(|| {
            minute = (minute + 1) % 1440;
            let failures = scene.update(black_box(&(epoch + Duration::minutes(minute))));
            black_box(failures)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_find_best_quaternion, bench_scene_update);
criterion_main!(benches);
