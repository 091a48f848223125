//! CK process invocation

use super::{ExtractError, Extractor, FallbackPolicy, ModeFailure, ScopeMode};
use crate::acquire::remove_dir_quietly;
use crate::config::ExtractionConfig;
use crate::external::run_external_tool;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Duration;
use tracing::{debug, info, warn};

/// CK's output directory for one invocation. Deleted on drop.
#[derive(Debug)]
pub struct CkOutput {
    dir: PathBuf,
    mode: ScopeMode,
}

impl CkOutput {
    /// Create a fresh `ck_output_<uuid>` directory under `scratch_root`
    pub fn create(scratch_root: &Path, mode: ScopeMode) -> Result<Self, ExtractError> {
        let dir = scratch_root.join(format!("ck_output_{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).map_err(|source| ExtractError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, mode })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The mode that produced this output
    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub fn class_csv(&self) -> PathBuf {
        self.dir.join("class.csv")
    }

    pub fn field_csv(&self) -> PathBuf {
        self.dir.join("field.csv")
    }

    pub fn method_csv(&self) -> PathBuf {
        self.dir.join("method.csv")
    }

    pub fn variable_csv(&self) -> PathBuf {
        self.dir.join("variable.csv")
    }

    /// `class.csv` exists and is not empty
    pub fn has_class_table(&self) -> bool {
        std::fs::metadata(self.class_csv())
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }
}

impl Drop for CkOutput {
    fn drop(&mut self) {
        remove_dir_quietly(&self.dir);
    }
}

/// Runs `java -jar <ck.jar> <source> <use-jars> 0 false <out>/`
#[derive(Debug, Clone)]
pub struct CkRunner {
    pub java: String,
    pub jar: PathBuf,
    pub timeout: Duration,
}

impl CkRunner {
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self::from_config(&ExtractionConfig {
            jar: jar.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            java: config.java.clone(),
            jar: config.jar.clone(),
            timeout: config.timeout(),
        }
    }

    fn command(&self, source: &Path, mode: ScopeMode, out_dir: &Path) -> Vec<String> {
        vec![
            self.java.clone(),
            "-jar".to_string(),
            self.jar.to_string_lossy().to_string(),
            source.to_string_lossy().to_string(),
            mode.as_arg().to_string(),
            // Max files per partition; 0 lets CK decide
            "0".to_string(),
            // Skip variable and field metrics
            "false".to_string(),
            format!("{}{}", out_dir.display(), MAIN_SEPARATOR),
        ]
    }

    /// One invocation in one mode. The output is dropped (and deleted) on failure.
    fn attempt(
        &self,
        source: &Path,
        scratch_root: &Path,
        mode: ScopeMode,
    ) -> Result<Result<CkOutput, String>, ExtractError> {
        let output = CkOutput::create(scratch_root, mode)?;
        let cmd = self.command(source, mode, output.dir());
        debug!("CK output directory: {}", output.dir().display());

        let result = run_external_tool(&cmd, "java", Some(self.timeout), None);
        if !result.exited_ok() {
            return Ok(Err(result.describe_failure()));
        }
        if !output.has_class_table() {
            return Ok(Err(format!("class.csv not found in {}", output.dir().display())));
        }
        Ok(Ok(output))
    }
}

impl Extractor for CkRunner {
    fn extract(&self, source: &Path, scratch_root: &Path) -> Result<CkOutput, ExtractError> {
        info!("Running CK on {}", source.display());
        let mut failures = Vec::new();

        for mode in FallbackPolicy::new() {
            match self.attempt(source, scratch_root, mode)? {
                Ok(output) => {
                    if !failures.is_empty() {
                        info!("CK succeeded {} after fallback", mode);
                    }
                    return Ok(output);
                }
                Err(reason) => {
                    warn!("CK failed ({}): {}", mode, reason);
                    failures.push(ModeFailure { mode, reason });
                }
            }
        }

        Err(ExtractError::AllModesFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_has_trailing_separator() {
        let runner = CkRunner::new("ck/ck.jar");
        let cmd = runner.command(Path::new("/src/repo"), ScopeMode::SourceOnly, Path::new("/tmp/out"));
        assert_eq!(cmd[0], "java");
        assert_eq!(cmd[1..3], ["-jar".to_string(), "ck/ck.jar".to_string()]);
        assert_eq!(cmd[3], "/src/repo");
        assert_eq!(cmd[4], "false");
        assert_eq!(cmd[5], "0");
        assert_eq!(cmd[6], "false");
        assert_eq!(cmd[7], format!("/tmp/out{}", MAIN_SEPARATOR));
    }

    #[test]
    fn test_output_paths_and_cleanup() {
        let scratch = tempfile::tempdir().unwrap();
        let output = CkOutput::create(scratch.path(), ScopeMode::IncludeJars).unwrap();
        let dir = output.dir().to_path_buf();
        assert!(dir.file_name().unwrap().to_string_lossy().starts_with("ck_output_"));
        assert_eq!(output.method_csv(), dir.join("method.csv"));
        assert!(!output.has_class_table());

        std::fs::write(output.class_csv(), "").unwrap();
        assert!(!output.has_class_table());
        std::fs::write(output.class_csv(), "file,class\n").unwrap();
        assert!(output.has_class_table());

        drop(output);
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_java_fails_every_mode() {
        let scratch = tempfile::tempdir().unwrap();
        let runner = CkRunner {
            java: "definitely-not-java-ck-harvest".into(),
            jar: "ck.jar".into(),
            timeout: Duration::from_secs(5),
        };
        match runner.extract(Path::new("."), scratch.path()) {
            Err(ExtractError::AllModesFailed(failures)) => assert_eq!(failures.len(), 2),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    mod fake_java {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Shell stand-in for `java`. `$4` is the use-jars flag, `$7` the output dir.
        fn fake_java(dir: &Path, body: &str) -> String {
            let path = dir.join("fake-java");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        fn runner(java: String) -> CkRunner {
            CkRunner {
                java,
                jar: "ck.jar".into(),
                timeout: Duration::from_secs(30),
            }
        }

        fn ck_dirs(scratch: &Path) -> usize {
            std::fs::read_dir(scratch)
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("ck_output_"))
                .count()
        }

        const WRITE_CLASS_CSV: &str = "printf 'file,class,type,cbo,dit,lcom\\nA.java,A,class,1,1,0\\n' > \"$7class.csv\"";

        #[test]
        fn test_primary_mode_success() {
            let tools = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let java = fake_java(tools.path(), WRITE_CLASS_CSV);

            let output = runner(java).extract(Path::new("/src"), scratch.path()).unwrap();
            assert_eq!(output.mode(), ScopeMode::IncludeJars);
            assert!(output.has_class_table());
            assert_eq!(ck_dirs(scratch.path()), 1);
        }

        #[test]
        fn test_falls_back_to_source_only() {
            let tools = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let body = format!("if [ \"$4\" = \"true\" ]; then echo 'jar resolution failed' >&2; exit 1; fi\n{}", WRITE_CLASS_CSV);
            let java = fake_java(tools.path(), &body);

            let output = runner(java).extract(Path::new("/src"), scratch.path()).unwrap();
            assert_eq!(output.mode(), ScopeMode::SourceOnly);
            // The failed attempt's directory is gone
            assert_eq!(ck_dirs(scratch.path()), 1);
        }

        #[test]
        fn test_timeout_falls_back_to_source_only() {
            let tools = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let body = format!("if [ \"$4\" = \"true\" ]; then exec sleep 30; fi\n{}", WRITE_CLASS_CSV);
            let java = fake_java(tools.path(), &body);
            let runner = CkRunner {
                timeout: Duration::from_secs(1),
                ..runner(java)
            };

            let output = runner.extract(Path::new("/src"), scratch.path()).unwrap();
            assert_eq!(output.mode(), ScopeMode::SourceOnly);
            assert!(output.has_class_table());
            assert_eq!(ck_dirs(scratch.path()), 1);
        }

        #[test]
        fn test_exit_zero_without_class_csv_is_failure() {
            let tools = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let java = fake_java(tools.path(), "exit 0");

            match runner(java).extract(Path::new("/src"), scratch.path()) {
                Err(ExtractError::AllModesFailed(failures)) => {
                    assert_eq!(failures[0].mode, ScopeMode::IncludeJars);
                    assert_eq!(failures[1].mode, ScopeMode::SourceOnly);
                    assert!(failures[1].reason.contains("class.csv"));
                }
                other => panic!("expected failure, got {:?}", other),
            }
            assert_eq!(ck_dirs(scratch.path()), 0);
        }

        #[test]
        fn test_both_modes_failing() {
            let tools = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let java = fake_java(tools.path(), "echo 'OutOfMemoryError' >&2; exit 3");

            let err = runner(java).extract(Path::new("/src"), scratch.path()).unwrap_err();
            assert!(err.to_string().contains("exit code 3: OutOfMemoryError"));
            assert_eq!(ck_dirs(scratch.path()), 0);
        }
    }
}
