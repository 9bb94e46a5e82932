//! Tests for pipeline defaults and file conventions

#[cfg(test)]
mod tests {
    use histoquant::io::configuration::{
        DEFAULT_PATCH_SIZE, DEFAULT_SEED, FEATURES_FILE, METRICS_FILE, PATCH_SPACING_FACTOR,
        PRE_POST_FILE, SIMILARITY_THRESHOLD, SLIDE_EXTENSIONS, TABLE_EXTENSION,
        TISSUE_INTENSITY_THRESHOLD,
    };

    // Tests tissue threshold sits on the 8-bit scale below white
    // Verified by raising threshold above 255
    #[test]
    fn test_tissue_threshold_value() {
        assert!((TISSUE_INTENSITY_THRESHOLD - 220.0).abs() < f64::EPSILON);
    }

    // Tests grid step leaves a gap between patches
    // Verified by setting spacing factor to 1.0
    #[test]
    fn test_spacing_factor_exceeds_one() {
        assert!(PATCH_SPACING_FACTOR > 1.0);
        let step = (f64::from(DEFAULT_PATCH_SIZE) * PATCH_SPACING_FACTOR).floor() as u32;
        assert_eq!(step, 563);
    }

    // Tests default seed is fixed
    // Verified by changing seed value
    #[test]
    fn test_default_seed_is_reproducible() {
        assert_eq!(DEFAULT_SEED, 42);
    }

    // Tests similarity threshold value
    // Verified by lowering threshold
    #[test]
    fn test_similarity_threshold_value() {
        assert!((SIMILARITY_THRESHOLD - 0.5).abs() < f64::EPSILON);
    }

    // Tests output tables all carry the table extension
    // Verified by renaming a table to .tsv
    #[test]
    fn test_output_tables_use_table_extension() {
        for name in [FEATURES_FILE, PRE_POST_FILE, METRICS_FILE] {
            assert!(name.ends_with(&format!(".{TABLE_EXTENSION}")), "{name}");
        }
    }

    // Tests slide extensions are lowercase
    // Verified by adding an uppercase extension
    #[test]
    fn test_slide_extensions_lowercase() {
        for ext in SLIDE_EXTENSIONS {
            assert_eq!(ext, ext.to_lowercase());
            assert!(!ext.starts_with('.'));
        }
    }
}
