//! Checks that the unit test tree mirrors `src` and is wired into its binary

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";

    /// Crate roots and module lists, which carry no logic of their own
    fn is_module_list(path: &Path) -> bool {
        matches!(
            path.file_name().and_then(|name| name.to_str()),
            Some("main.rs" | "lib.rs" | "mod.rs")
        )
    }

    fn is_rust_leaf(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "rs") && !is_module_list(path)
    }

    /// `.rs` files below `root` as `<area>/<file>.rs`, module lists excluded
    fn leaf_files(root: &Path) -> io::Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if is_rust_leaf(&path) {
                    let relative = path.strip_prefix(root).map_err(io::Error::other)?;
                    files.insert(relative.to_path_buf());
                }
            }
        }
        Ok(files)
    }

    fn listing(paths: &BTreeSet<&PathBuf>, prefix: &str) -> String {
        paths
            .iter()
            .map(|path| format!("  - {prefix}/{}", path.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Tests every source file has a unit test file at the same relative path
    // Verified by comparing the two leaf sets in both directions
    #[test]
    fn test_unit_tree_mirrors_src() {
        let sources = leaf_files(Path::new(SRC_DIR)).unwrap();
        let unit_tests = leaf_files(Path::new(UNIT_DIR)).unwrap();

        let untested: BTreeSet<_> = sources.difference(&unit_tests).collect();
        let orphaned: BTreeSet<_> = unit_tests.difference(&sources).collect();

        assert!(
            untested.is_empty(),
            "Source files without unit tests:\n{}",
            listing(&untested, SRC_DIR)
        );
        assert!(
            orphaned.is_empty(),
            "Unit test files without a source file:\n{}",
            listing(&orphaned, UNIT_DIR)
        );
    }

    // Tests every unit test file is declared in its area's mod.rs and every
    // area in the binary root
    // Verified by reading the `mod` declarations of each list
    #[test]
    fn test_unit_files_are_declared() {
        let unit_dir = Path::new(UNIT_DIR);
        let root = fs::read_to_string(unit_dir.join("main.rs")).unwrap();

        let mut undeclared = Vec::new();
        for file in leaf_files(unit_dir).unwrap() {
            let (Some(area), Some(stem)) = (
                file.parent().and_then(|p| p.to_str()),
                file.file_stem().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            if !root.lines().any(|line| line.trim() == format!("mod {area};")) {
                undeclared.push(format!("  - mod {area}; in {UNIT_DIR}/main.rs"));
            }
            let list_path = unit_dir.join(area).join("mod.rs");
            let list = fs::read_to_string(list_path).unwrap_or_default();
            if !list.lines().any(|line| line.trim() == format!("pub mod {stem};")) {
                undeclared.push(format!("  - pub mod {stem}; in {UNIT_DIR}/{area}/mod.rs"));
            }
        }
        undeclared.dedup();

        assert!(
            undeclared.is_empty(),
            "Unit test files that never compile:\n{}",
            undeclared.join("\n")
        );
    }

    // Tests each unit test file is documented and holds a test module
    // Verified by requiring a module doc, `#[cfg(test)]` and at least one test
    #[test]
    fn test_unit_files_have_documented_test_modules() {
        let unit_dir = Path::new(UNIT_DIR);

        let mut malformed = Vec::new();
        for file in leaf_files(unit_dir).unwrap() {
            let content = fs::read_to_string(unit_dir.join(&file)).unwrap();
            let checks = [
                ("module doc", content.starts_with("//!")),
                ("#[cfg(test)]", content.contains("#[cfg(test)]")),
                ("#[test]", content.contains("#[test]")),
            ];
            let missing: Vec<&str> = checks
                .into_iter()
                .filter(|(_, present)| !present)
                .map(|(what, _)| what)
                .collect();
            if !missing.is_empty() {
                malformed.push(format!("  - {}: {}", file.display(), missing.join(", ")));
            }
        }

        assert!(
            malformed.is_empty(),
            "Unit test files missing required parts:\n{}",
            malformed.join("\n")
        );
    }

    // Tests end-to-end test files at the top of tests/ contain tests
    // Verified by scanning only files that form their own binary
    #[test]
    fn test_integration_files_contain_tests() {
        let mut empty = Vec::new();
        for entry in fs::read_dir("tests").unwrap() {
            let path = entry.unwrap().path();
            if path.extension().is_some_and(|ext| ext == "rs")
                && !fs::read_to_string(&path).unwrap().contains("#[test]")
            {
                empty.push(path.display().to_string());
            }
        }

        assert!(empty.is_empty(), "Test binaries without tests: {empty:?}");
    }
}
