//! Tests for pre/post pairing and the case/control split

#[cfg(test)]
mod tests {
    use histoquant::PipelineError;
    use histoquant::cohort::{Arm, FeatureRow, GroupKey, PatientId, pair, split};

    fn feature(patient: &str, arm: &str, treatment: &str, malignant: usize) -> FeatureRow {
        FeatureRow {
            key: GroupKey {
                patient_id: PatientId::new(patient),
                arm: arm.to_string(),
                treatment: treatment.to_string(),
            },
            total_cells: 10,
            malignant_cells: malignant,
            normal_cells: 10 - malignant,
            malignant_ratio: malignant as f64 / 10.0,
        }
    }

    // Tests change is pre minus post
    // Verified by subtracting in the other order
    #[test]
    fn test_pair_change_in_ratio() {
        let features = vec![feature("1", "case", "pre", 6), feature("1", "case", "post", 2)];

        let pairs = pair(&features);

        assert_eq!(pairs.len(), 1);
        let row = &pairs[0];
        assert_eq!(row.pre.malignant_cells, 6);
        assert_eq!(row.post.malignant_cells, 2);
        assert!((row.change_in_malignant_ratio - 0.4).abs() < 1e-12);
    }

    // Tests patients with only one phase are dropped
    // Verified by keeping rows with a missing phase
    #[test]
    fn test_pre_only_patient_dropped() {
        let features = vec![
            feature("1", "case", "pre", 5),
            feature("2", "case", "pre", 5),
            feature("2", "case", "post", 1),
            feature("3", "control", "post", 1),
        ];

        let pairs = pair(&features);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].patient_id, PatientId::new("2"));
    }

    // Tests a repeated phase keeps the first row
    // Verified by letting the later row overwrite the earlier one
    #[test]
    fn test_repeated_phase_keeps_first() {
        let features = vec![
            feature("1", "case", "pre", 6),
            feature("1", "case", "pre", 9),
            feature("1", "case", "post", 2),
            feature("1", "case", "post", 4),
        ];

        let pairs = pair(&features);

        assert_eq!(pairs.len(), 1);
        let row = &pairs[0];
        assert_eq!(row.pre.malignant_cells, 6);
        assert_eq!(row.post.malignant_cells, 2);
        assert!((row.change_in_malignant_ratio - 0.4).abs() < 1e-12);
    }

    // Tests unknown treatment phases are ignored
    // Verified by treating any non-pre phase as post
    #[test]
    fn test_other_phase_ignored() {
        let features = vec![
            feature("1", "case", "pre", 5),
            feature("1", "case", "followup", 1),
        ];

        assert!(pair(&features).is_empty());
    }

    // Tests pairs are ordered by numeric patient id
    // Verified by ordering patient ids as strings
    #[test]
    fn test_pair_order() {
        let mut features = Vec::new();
        for patient in ["10", "9"] {
            features.push(feature(patient, "control", "post", 1));
            features.push(feature(patient, "control", "pre", 2));
        }

        let ids: Vec<String> = pair(&features)
            .iter()
            .map(|row| row.patient_id.to_string())
            .collect();
        assert_eq!(ids, vec!["9", "10"]);
    }

    // Tests split routes changes by arm in patient order
    // Verified by swapping case and control
    #[test]
    fn test_split_by_arm() {
        let features = vec![
            feature("1", "case", "pre", 8),
            feature("1", "case", "post", 2),
            feature("2", "control", "pre", 4),
            feature("2", "control", "post", 5),
            feature("3", "case", "pre", 3),
            feature("3", "case", "post", 3),
        ];

        let samples = split(&pair(&features)).unwrap();

        assert_eq!(samples.case.len(), 2);
        assert!((samples.case[0] - 0.6).abs() < 1e-12);
        assert!(samples.case[1].abs() < 1e-12);
        assert_eq!(samples.control.len(), 1);
        assert!((samples.control[0] + 0.1).abs() < 1e-12);
    }

    // Tests arm outside case/control is rejected
    // Verified by silently dropping unknown arms
    #[test]
    fn test_split_unknown_arm() {
        let features = vec![
            feature("4", "treatment_x", "pre", 3),
            feature("4", "treatment_x", "post", 1),
        ];

        let result = split(&pair(&features));

        match result {
            Err(PipelineError::UnknownArm { patient_id, arm }) => {
                assert_eq!(patient_id, "4");
                assert_eq!(arm, "treatment_x");
            }
            _ => unreachable!("Expected UnknownArm error type"),
        }
    }

    // Tests arm parsing is exact
    // Verified by lowercasing before parsing
    #[test]
    fn test_arm_from_str() {
        assert_eq!("case".parse::<Arm>(), Ok(Arm::Case));
        assert_eq!("control".parse::<Arm>(), Ok(Arm::Control));
        assert_eq!("Case".parse::<Arm>(), Err("Case".to_string()));
        assert_eq!(Arm::Control.to_string(), "control");
    }
}
