//! End-to-end scenarios across the solver, coordinates, propagation and the
//! scene registry.

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use nalgebra::Vector3;
use rstest::rstest;
use std::io::Write;

use quaternions::commands::{load_script, run_script, CommandOutput};
use quaternions::constants::EARTH_RADIUS_KM;
use quaternions::coordinates::{geo2xyz, sph2xyz, xyz2geo, xyz2sph};
use quaternions::targets::{resolve_vector, VectorArg};
use quaternions::tle::{StaticFetcher, TleSource};
use quaternions::{find_best_quaternion, OrientationMode, Quaternion, QuaternionsError, Scene};

const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

fn iss_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
}

#[test]
fn solver_aligns_z_to_x_with_y_towards_z() {
    let q = find_best_quaternion(
        &Vector3::new(0.0, 0.0, 1.0),
        &Vector3::new(0.0, 1.0, 0.0),
        &Vector3::new(1.0, 0.0, 0.0),
        &Vector3::new(0.0, 0.0, 1.0),
    )
    .unwrap();

    assert_relative_eq!(q.rotate_vector(&Vector3::z()), Vector3::x(), epsilon = 1e-12);

    // Secondary lies in the plane orthogonal to +X, so it is matched exactly
    assert_relative_eq!(q.rotate_vector(&Vector3::y()), Vector3::z(), epsilon = 1e-12);
}

#[test]
fn geographic_origin_is_on_the_x_axis() {
    let p = geo2xyz(0.0, 0.0, 0.0);
    assert_relative_eq!(p, Vector3::new(EARTH_RADIUS_KM, 0.0, 0.0), epsilon = 1e-12);

    let g = xyz2geo(&Vector3::new(EARTH_RADIUS_KM, 0.0, 0.0)).unwrap();
    assert_relative_eq!(g.lat, 0.0, epsilon = 1e-12);
    assert_relative_eq!(g.lon, 0.0, epsilon = 1e-12);
    assert_relative_eq!(g.alt, 0.0, epsilon = 1e-9);
}

#[rstest]
#[case(45.0, 10.0, 7000.0)]
#[case(-89.5, -179.0, 6371.0)]
#[case(12.25, 179.5, 42164.0)]
fn spherical_conversions_invert(#[case] lat: f64, #[case] lon: f64, #[case] radius: f64) {
    let s = xyz2sph(&sph2xyz(lat, lon, radius)).unwrap();
    assert_relative_eq!(s.lat, lat, epsilon = 1e-9);
    assert_relative_eq!(s.lon, lon, epsilon = 1e-9);
    assert_relative_eq!(s.radius, radius, epsilon = 1e-6);

    assert!(xyz2sph(&Vector3::zeros()).is_err());
}

#[test]
fn fixed_satellite_moves_but_keeps_attitude() {
    let mut scene = Scene::empty();
    scene.clock_mut().set_time(iss_epoch());
    scene
        .add_satellite(
            "iss",
            &TleSource::Tle {
                tle: ISS_TLE.to_string(),
            },
            Some(OrientationMode::fixed(Quaternion::identity())),
            None,
            &StaticFetcher::new(),
        )
        .unwrap();

    let first = scene.get_point("iss").unwrap().clone();
    assert!(scene.update(&(iss_epoch() + Duration::minutes(20))).is_empty());
    let second = scene.get_point("iss").unwrap();

    assert!((first.position - second.position).norm() > 1000.0);
    assert_eq!(first.orientation, Quaternion::identity());
    assert_eq!(second.orientation, Quaternion::identity());
}

#[test]
fn satellite_update_is_idempotent() {
    let mut scene = Scene::new().unwrap();
    scene.clock_mut().set_time(iss_epoch());
    scene
        .add_satellite(
            "iss",
            &TleSource::Tle {
                tle: ISS_TLE.to_string(),
            },
            None,
            None,
            &StaticFetcher::new(),
        )
        .unwrap();

    let timestamp = iss_epoch() + Duration::seconds(3600);
    scene.update(&timestamp);
    let first = scene.get_point("iss").unwrap().clone();
    scene.update(&timestamp);
    let second = scene.get_point("iss").unwrap();

    assert_eq!(first.position, second.position);
    assert_eq!(first.orientation, second.orientation);
}

#[rstest]
#[case("sat")]
#[case("nadir")]
#[case("Sun")]
#[case("Moon")]
#[case("bad name")]
fn rejected_names_leave_registry_untouched(#[case] name: &str) {
    let mut scene = Scene::new().unwrap();
    let points = scene.list_points(None);
    let lines: Vec<String> = scene.lines().map(|(n, _)| n.clone()).collect();

    assert!(scene.add_point(name, [1.0, 2.0, 3.0], None, None).is_err());
    assert!(scene
        .create_line(name, [0.0, 0.0, 0.0].into(), [1.0, 0.0, 0.0].into())
        .is_err());

    assert_eq!(scene.list_points(None), points);
    assert_eq!(
        scene.lines().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
        lines
    );
    assert_eq!(scene.get_point("sat").unwrap().orientation, Quaternion::identity());
}

#[test]
fn arrow_from_unknown_point_is_reported() {
    let mut scene = Scene::empty();
    scene.add_point("B", [1.0, 0.0, 0.0], None, None).unwrap();

    match resolve_vector(&scene, &VectorArg::from("A->B")) {
        Err(QuaternionsError::UnknownPoint(name)) => assert_eq!(name, "A"),
        other => panic!("expected unknown point error, got {:?}", other),
    }
}

#[test]
fn script_file_runs_to_completion() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"type": "set_time", "time": "2008-09-20T12:25:40Z"}},
            {{"type": "add_satellite", "name": "iss", "source": {{"type": "norad", "id": "25544"}}}},
            {{"type": "add_point", "name": "KS", "coordinates": [45.0, 10.0, 0.0], "use_geo": true}},
            {{"type": "create_line", "name": "los", "start": "iss", "end": "KS"}},
            {{"type": "angle", "a": "los", "b": "A->KS"}},
            {{"type": "find_best_quaternion", "primary_body_vector": "z",
              "secondary_body_vector": "y", "primary_target_vector": "los",
              "secondary_target_vector": [0, 0, 1]}},
            {{"type": "list_points", "filter": "Satellite"}}
        ]"#
    )
    .unwrap();

    let commands = load_script(file.path()).unwrap();
    let mut scene = Scene::new().unwrap();
    let fetcher = StaticFetcher::new().with("25544", ISS_TLE);
    let results = run_script(&mut scene, &commands, &fetcher);

    assert_eq!(results.len(), 7);
    assert!(results[0..4].iter().all(|step| step.result.is_ok()));
    assert!(matches!(
        results[4].result,
        Err(QuaternionsError::UnknownPoint(_))
    ));

    match &results[5].result {
        Ok(CommandOutput::Quaternion(q)) => {
            let los = resolve_vector(&scene, &VectorArg::from("los")).unwrap().normalize();
            assert_relative_eq!(q.rotate_vector(&Vector3::z()), los, epsilon = 1e-9);
        }
        other => panic!("unexpected result {:?}", other),
    }
    match &results[6].result {
        Ok(CommandOutput::Names(names)) => assert_eq!(names, &vec!["iss".to_string()]),
        other => panic!("unexpected result {:?}", other),
    }
}
