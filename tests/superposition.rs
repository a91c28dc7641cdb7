use approx::assert_relative_eq;
use esterpk::prelude::*;

const ESTERS: [&str; 5] = ["valerate", "enanthate", "cypionate", "benzoate", "undecylate"];

/// A mixed history of `n` doses with varied amounts, times and esters
fn mixed_history(n: usize) -> (Vec<f64>, Vec<f64>, Vec<&'static str>) {
    let amounts = (0..n).map(|i| 1.0 + (i % 4) as f64 * 1.5).collect();
    let times = (0..n).map(|i| i as f64 * 3.5 - 2.0).collect();
    let ids = (0..n).map(|i| ESTERS[(i * 3) % ESTERS.len()]).collect();
    (amounts, times, ids)
}

#[test]
fn valerate_reference_regression() {
    let c = total_concentration(
        2.0,
        &[1.0],
        &[0.0],
        &["valerate"],
        &SuperpositionOptions::default(),
    )
    .unwrap();
    assert_eq!(c.trunc() as i64, 61);
}

#[test]
fn total_is_sum_of_single_doses() {
    let options = SuperpositionOptions::default();
    for n in 0..12 {
        let (amounts, times, ids) = mixed_history(n);
        for t in [-5.0, 0.0, 4.2, 17.0, 60.0] {
            let total = total_concentration(t, &amounts, &times, &ids, &options).unwrap();
            let expected: f64 = (0..n)
                .map(|i| {
                    evaluate_single_dose(
                        t - times[i],
                        amounts[i],
                        lookup_formulation(ids[i]).unwrap(),
                        &CurveOptions::default(),
                    )
                    .unwrap()
                })
                .sum();
            assert_relative_eq!(total, expected, max_relative = 1e-12, epsilon = 1e-12);
        }
    }
}

#[test]
fn weekly_valerate_accumulates() {
    let history = DoseHistory::builder()
        .dose(0.0, 5.0, "valerate")
        .repeat(7, 7.0)
        .build();
    let options = SuperpositionOptions::default();

    // troughs just before each new dose grow towards a plateau
    let troughs: Vec<f64> = (1..8)
        .map(|week| history.concentration(week as f64 * 7.0 - 0.01, &options).unwrap())
        .collect();
    for w in troughs.windows(2) {
        assert!(w[1] > w[0]);
    }
    let first_gain = troughs[1] - troughs[0];
    let last_gain = troughs[6] - troughs[5];
    assert!(last_gain < first_gain);
}

#[test]
fn unsupported_and_invalid_queries() {
    let (amounts, times, ids) = mixed_history(3);

    let random = SuperpositionOptions::default().with_random(true);
    assert!(matches!(
        total_concentration(10.0, &amounts, &times, &ids, &random),
        Err(EsterError::UnsupportedMode(Mode::Random))
    ));
    assert!(matches!(
        concentration_curve(&[1.0, 2.0], &amounts, &times, &ids, &random),
        Err(EsterError::UnsupportedMode(Mode::Random))
    ));

    let options = SuperpositionOptions::default();
    assert!(matches!(
        total_concentration(10.0, &amounts[..2], &times[..1], &ids[..2], &options),
        Err(EsterError::LengthMismatch { .. })
    ));
    assert!(matches!(
        total_concentration(10.0, &[1.0], &[0.0], &["patch tw"], &options),
        Err(EsterError::UnknownFormulation(_))
    ));

    let steady = CurveOptions::default().with_steady_state(7.0);
    assert!(matches!(
        evaluate_single_dose(1.0, 1.0, lookup_formulation("valerate").unwrap(), &steady),
        Err(EsterError::UnsupportedMode(Mode::SteadyState))
    ));
}

#[test]
fn csv_history_with_json_registry() {
    let dir = std::env::temp_dir().join(format!("esterpk-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let doses_path = dir.join("doses.csv");
    std::fs::write(
        &doses_path,
        "time,amount,formulation\n0,2,depot\n10,2,depot\n",
    )
    .unwrap();
    let registry_path = dir.join("registry.json");
    std::fs::write(
        &registry_path,
        r#"{ "depot": { "d": 100.0, "k1": 0.1, "k2": 2.0, "k3": 0.5 } }"#,
    )
    .unwrap();

    let history = read_doses(&doses_path).unwrap();
    let registry = FormulationRegistry::from_json_file(&registry_path).unwrap();
    let options = SuperpositionOptions::default();

    let times = [0.0, 5.0, 12.0, 30.0];
    let curve = history.curve_with(&registry, &times, &options).unwrap();
    for (&t, &c) in times.iter().zip(curve.iter()) {
        assert_eq!(c, history.concentration_with(&registry, t, &options).unwrap());
    }
    // the builtin registry knows nothing about "depot"
    assert!(matches!(
        history.concentration(5.0, &options),
        Err(EsterError::UnknownFormulation(_))
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn root_reexports_cover_dose_types() {
    let csv = "time,amount,formulation\n0,5,valerate\n7,5,valerate\n";
    let parsed: esterpk::DoseHistory = esterpk::read_doses_from(csv.as_bytes()).unwrap();
    let builder: esterpk::DoseHistoryBuilder = esterpk::DoseHistory::builder();
    let built: esterpk::DoseHistory = builder
        .dose(0.0, 5.0, "valerate")
        .dose(7.0, 5.0, "valerate")
        .build();
    assert_eq!(parsed, built);
}
