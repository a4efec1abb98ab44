use super::*;
use crate::models::{ClassifierArtifact, LinearModel};

/// Model that ignores its input and always returns softmax(intercepts)
fn constant_model(classes: &[&str], intercepts: Vec<f64>, n_features: usize) -> LinearModel {
    LinearModel::new(
        classes.iter().map(|s| s.to_string()).collect(),
        vec![vec![0.0; n_features]; classes.len()],
        intercepts,
    )
    .unwrap()
}

fn features() -> FeatureVector {
    FeatureVector::new([0.1; 17])
}

fn one_hot(band: usize) -> BandPowers {
    let mut values = [0.0; 5];
    values[band] = 1.0;
    BandPowers::from_array(values)
}

fn classifier_with(entries: Vec<(ModelKind, LinearModel)>) -> EmotionClassifier {
    let registry = entries
        .into_iter()
        .fold(ModelRegistry::empty(), |reg, (kind, model)| {
            reg.with_artifact(kind, ClassifierArtifact::plain(model))
        });
    EmotionClassifier::new(Arc::new(registry))
}

#[test]
fn test_strategy_parse_aliases() {
    assert_eq!(Strategy::parse("svm"), Strategy::Single(ModelKind::Svm));
    assert_eq!(Strategy::parse("RandomForest"), Strategy::Single(ModelKind::RandomForest));
    assert_eq!(Strategy::parse("cnn"), Strategy::Single(ModelKind::RandomForest));
    assert_eq!(Strategy::parse("LSTM"), Strategy::Single(ModelKind::RandomForest));
    assert_eq!(Strategy::parse("XGBoost"), Strategy::Single(ModelKind::GradientBoosting));
    assert_eq!(Strategy::parse("lightgbm"), Strategy::Single(ModelKind::LeafwiseBoosting));
    assert_eq!(Strategy::parse("auto"), Strategy::Ensemble);
    assert_eq!(Strategy::parse(" Ensemble "), Strategy::Ensemble);
}

#[test]
fn test_unknown_strategy_defaults_to_svm() {
    assert_eq!(Strategy::parse("quantum"), Strategy::Single(ModelKind::Svm));
    assert_eq!(Strategy::parse(""), Strategy::Single(ModelKind::Svm));
}

#[test]
fn test_calibration_constants_and_cap() {
    let svm = Strategy::parse("SVM").calibration();
    assert!((svm.apply(0.5) - (0.85 * 0.5 + 0.10)).abs() < 1e-12);

    let ensemble = Strategy::Ensemble.calibration();
    assert!((ensemble.apply(1.0) - 0.97).abs() < 1e-12);

    let steep = Calibration {
        scale: 1.0,
        shift: 0.5,
    };
    assert_eq!(steep.apply(1.0), MAX_CONFIDENCE);
}

#[test]
fn test_interpretation_lookup() {
    assert!(interpretation_for("Happy").contains("alpha"));
    assert_eq!(interpretation_for("Bored"), "");
    assert_eq!(interpretation_for("happy"), "");
    assert_eq!(Emotion::from_label("Stress"), Some(Emotion::Stress));
}

#[test]
fn test_heuristic_scores_sum_to_one() {
    for band in 0..5 {
        let scores = heuristic_scores(&one_hot(band));
        let sum: f64 = scores.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum {} for band {}", sum, band);
        assert_eq!(scores.len(), 5);
    }

    let scores = heuristic_scores(&BandPowers::default());
    assert!((scores.values().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn test_heuristic_follows_dominant_band() {
    let classifier = EmotionClassifier::heuristic_only();
    let cases = [(1, "Sad"), (2, "Calm"), (3, "Angry"), (4, "Stress")];

    for (band, expected) in cases {
        let result = classifier.predict(&features(), &one_hot(band), Strategy::default());
        assert_eq!(result.emotion, expected, "dominant band {}", band);
    }
}

#[test]
fn test_missing_artifact_falls_back_with_strategy_calibration() {
    let classifier = EmotionClassifier::heuristic_only();
    let relative = one_hot(2);
    let strategy = Strategy::parse("XGB");

    let result = classifier.predict(&features(), &relative, strategy);

    assert_eq!(result.source, ScoreSource::Heuristic);
    assert_eq!(result.strategy, "XGB");
    assert!(Emotion::from_label(&result.emotion).is_some());
    assert!((result.scores.values().sum::<f64>() - 1.0).abs() < 1e-9);

    let raw = result.scores[&result.emotion];
    assert!((result.confidence - (0.90 * raw + 0.07)).abs() < 1e-12);
    assert!(!result.interpretation.is_empty());
}

#[test]
fn test_single_model_path() {
    // softmax([ln 4, 0]) = [0.8, 0.2]
    let model = constant_model(&["Happy", "Sad"], vec![4f64.ln(), 0.0], 17);
    let classifier = classifier_with(vec![(ModelKind::Svm, model)]);

    let result = classifier.predict(&features(), &one_hot(2), Strategy::parse("svm"));

    assert_eq!(result.source, ScoreSource::Model);
    assert_eq!(result.emotion, "Happy");
    assert!((result.scores["Happy"] - 0.8).abs() < 1e-12);
    assert!((result.confidence - (0.85 * 0.8 + 0.10)).abs() < 1e-12);
}

#[test]
fn test_failing_artifact_falls_back() {
    // Expects 3 features; the dispatcher always passes 17
    let model = constant_model(&["Happy", "Sad"], vec![0.0, 0.0], 3);
    let classifier = classifier_with(vec![(ModelKind::RandomForest, model)]);

    let result = classifier.predict(&features(), &one_hot(1), Strategy::parse("RF"));

    assert_eq!(result.source, ScoreSource::Heuristic);
    assert_eq!(result.emotion, "Sad");
}

#[test]
fn test_unknown_model_label_has_empty_interpretation() {
    let model = constant_model(&["Bored", "Calm"], vec![3.0, 0.0], 17);
    let classifier = classifier_with(vec![(ModelKind::Svm, model)]);

    let result = classifier.predict(&features(), &one_hot(2), Strategy::default());

    assert_eq!(result.emotion, "Bored");
    assert_eq!(result.interpretation, "");
}

#[test]
fn test_ensemble_blends_union_of_labels() {
    // SVM: Calm 0.5, Happy 0.5. XGB: Happy 0.75, Sad 0.25. LGBM votes heuristically.
    let svm = constant_model(&["Calm", "Happy"], vec![0.0, 0.0], 17);
    let xgb = constant_model(&["Happy", "Sad"], vec![3f64.ln(), 0.0], 17);
    let classifier = classifier_with(vec![
        (ModelKind::Svm, svm),
        (ModelKind::GradientBoosting, xgb),
    ]);
    let relative = one_hot(0);
    let heuristic = heuristic_scores(&relative);

    let result = classifier.predict(&features(), &relative, Strategy::Ensemble);

    // Weights 0.30 / 0.35 / 0.35 already sum to 1
    assert_eq!(result.source, ScoreSource::Ensemble);
    assert_eq!(result.emotion, "Happy");
    assert_eq!(result.scores.len(), 5);
    assert!((result.scores.values().sum::<f64>() - 1.0).abs() < 1e-4);

    let happy = 0.30 * 0.5 + 0.35 * 0.75 + 0.35 * heuristic["Happy"];
    let sad = 0.35 * 0.25 + 0.35 * heuristic["Sad"];
    assert!((result.scores["Happy"] - happy).abs() < 1e-9);
    assert!((result.scores["Sad"] - sad).abs() < 1e-9);
    assert!((result.confidence - (0.94 * happy + 0.03)).abs() < 1e-9);
    assert!(result.confidence <= MAX_CONFIDENCE);
}

#[test]
fn test_ensemble_missing_members_vote_heuristically() {
    // Only SVM is loaded and it is certain of Happy; theta dominates the bands
    let svm = constant_model(&["Happy"], vec![0.0], 17);
    let classifier = classifier_with(vec![(ModelKind::Svm, svm)]);
    let relative = one_hot(1);
    let heuristic = heuristic_scores(&relative);

    let result = classifier.predict(&features(), &relative, Strategy::Ensemble);

    assert_eq!(result.source, ScoreSource::Ensemble);
    assert_eq!(result.emotion, "Sad");
    assert_eq!(result.scores.len(), 5);
    assert!((result.scores.values().sum::<f64>() - 1.0).abs() < 1e-4);

    for (label, h) in &heuristic {
        let svm_vote = if label == "Happy" { 0.30 } else { 0.0 };
        let expected = svm_vote + 0.70 * h;
        assert!(
            (result.scores[label] - expected).abs() < 1e-9,
            "{}: {} vs {}",
            label,
            result.scores[label],
            expected
        );
    }
    assert!((result.scores["Sad"] - 0.327).abs() < 1e-3);
    assert!((result.scores["Happy"] - 0.300).abs() < 1e-3);
}

#[test]
fn test_ensemble_ignores_forest_model() {
    let rf = constant_model(&["Angry", "Calm"], vec![5.0, 0.0], 17);
    let classifier = classifier_with(vec![(ModelKind::RandomForest, rf)]);

    let result = classifier.predict(&features(), &one_hot(2), Strategy::Ensemble);

    assert_eq!(result.source, ScoreSource::Heuristic);
    assert_eq!(result.strategy, "ENSEMBLE");
    assert_eq!(result.emotion, "Calm");
}

#[test]
fn test_ensemble_zero_weight_model_has_no_influence() {
    let svm = constant_model(&["Happy", "Sad"], vec![0.0, 0.0], 17);
    let registry = ModelRegistry::empty()
        .with_artifact(ModelKind::Svm, ClassifierArtifact::plain(svm))
        .with_weights(EnsembleWeights {
            svm: 0.0,
            xgb: 1.0,
            lgbm: 1.0,
        });
    let classifier = EmotionClassifier::new(Arc::new(registry));
    let relative = one_hot(3);

    let result = classifier.predict(&features(), &relative, Strategy::Ensemble);

    assert_eq!(result.source, ScoreSource::Ensemble);
    assert_eq!(result.emotion, "Angry");
    for (label, h) in heuristic_scores(&relative) {
        assert!((result.scores[&label] - h).abs() < 1e-9, "{}", label);
    }
}

#[test]
fn test_confidence_never_exceeds_cap() {
    let model = constant_model(&["Calm", "Sad"], vec![50.0, 0.0], 17);
    for kind in ModelKind::ALL {
        let classifier = classifier_with(vec![(kind, model.clone())]);
        let result = classifier.predict(&features(), &one_hot(2), Strategy::Single(kind));
        assert!(result.confidence <= MAX_CONFIDENCE, "{:?}", kind);
    }
}

#[test]
fn test_classifier_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EmotionClassifier>();
}

#[test]
fn test_model_used_echoes_requested_name() {
    let classifier = EmotionClassifier::heuristic_only();
    let relative = one_hot(2);

    let cnn = classifier.predict_named(&features(), &relative, "CNN");
    assert_eq!(cnn.strategy, "RF");
    assert_eq!(cnn.model_used, "CNN");

    let unknown = classifier.predict_named(&features(), &relative, " quantum ");
    assert_eq!(unknown.strategy, "SVM");
    assert_eq!(unknown.model_used, "quantum");

    let blank = classifier.predict_named(&features(), &relative, "");
    assert_eq!(blank.model_used, "SVM");

    let resolved = classifier.predict(&features(), &relative, Strategy::Ensemble);
    assert_eq!(resolved.model_used, "ENSEMBLE");
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_missing_artifact_is_not_logged_as_warning() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let classifier = EmotionClassifier::heuristic_only();
    tracing::subscriber::with_default(subscriber, || {
        classifier.predict(&features(), &one_hot(2), Strategy::default());
        classifier.predict(&features(), &one_hot(2), Strategy::Ensemble);
    });

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("using heuristic scores"), "{}", text);
    assert!(!text.contains("WARN"), "{}", text);
}
