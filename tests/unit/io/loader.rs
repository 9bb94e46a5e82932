//! Tests for loading metadata and per-sample cell tables

#[cfg(test)]
mod tests {
    use histoquant::cohort::{CellLabel, PatientId};
    use histoquant::io::loader::{list_files, load_cell_table, load_cell_tables, load_metadata};
    use std::fs;

    // Tests metadata columns are read, trimmed and extra columns ignored
    // Verified by disabling whitespace trimming
    #[test]
    fn test_load_metadata_reads_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(
            &path,
            "name,patient_id,arm,treatment,site\nP1_pre, 1 ,case,pre,lung\nP1_post,1,case,post,lung\n",
        )
        .unwrap();

        let records = load_metadata(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "P1_pre");
        assert_eq!(records[0].patient_id, PatientId::new("1"));
        assert_eq!(records[1].treatment, "post");
    }

    // Tests missing column is reported with the table path
    // Verified by defaulting absent columns to empty strings
    #[test]
    fn test_load_metadata_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "name,patient_id,arm\nP1_pre,1,case\n").unwrap();

        let error = load_metadata(&path).unwrap_err();
        assert!(error.to_string().contains("metadata.csv"));
    }

    // Tests rows are named after the file stem
    // Verified by naming rows after the full file name
    #[test]
    fn test_load_cell_table_names_rows_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P1-pre.csv");
        fs::write(&path, "label,area\nmalignant,12\nnormal,9\nstroma,4\n").unwrap();

        let rows = load_cell_table(&path).unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.name == "P1-pre"));
        assert_eq!(rows[0].label, CellLabel::Malignant);
        assert_eq!(rows[2].label, CellLabel::Other("stroma".to_string()));
    }

    // Tests only matching extensions are listed, in path order
    // Verified by returning directory order
    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.CSV", "notes.txt"] {
            fs::write(dir.path().join(name), "label\n").unwrap();
        }
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = list_files(dir.path(), &["csv"]).unwrap();
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();

        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    // Tests every table of a directory is concatenated
    // Verified by loading only the first table
    #[test]
    fn test_load_cell_tables_concatenates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("S1.csv"), "label\nmalignant\n").unwrap();
        fs::write(dir.path().join("S2.csv"), "label\nnormal\nnormal\n").unwrap();

        let rows = load_cell_tables(dir.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().filter(|row| row.name == "S2").count(), 2);
    }
}
