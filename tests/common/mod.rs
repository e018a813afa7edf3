// Shared test helpers for integration tests
//
// The helpers build a throwaway project directory with a fake toolchain made
// of `sh` scripts, so the matrix can run end to end without CMake or a
// compiler. The scripts are invoked as `sh <script>` and therefore never need
// the executable bit.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use build_matrix::config::MatrixConfig;

/// Output the fake test binary prints on stdout.
pub const FAKE_TEST_STDOUT: &str = "[doctest] test cases: 3 | 3 passed | 0 failed";
/// Output the fake test binary prints on stderr.
pub const FAKE_TEST_STDERR: &str = "[doctest] stderr diagnostics";

/// Fake generator: echoes its arguments and creates the `-B` directory.
pub const FAKE_CMAKE: &str = r#"#!/bin/sh
echo "fake-cmake $*"
while [ $# -gt 0 ]; do
  if [ "$1" = "-B" ]; then
    mkdir -p "$2"
  fi
  shift
done
"#;

/// Fake generator that "succeeds" without creating the build directory.
pub const FAKE_CMAKE_NO_BUILD_DIR: &str = r#"#!/bin/sh
echo "fake-cmake $*"
"#;

/// Fake build tool: touches the sample target and writes an executable test
/// script for the tests target.
pub const FAKE_MAKE: &str = r#"#!/bin/sh
echo "fake-make $1"
if [ "$1" = "countly-tests" ]; then
  printf '#!/bin/sh\necho "[doctest] test cases: 3 | 3 passed | 0 failed"\necho "[doctest] stderr diagnostics" 1>&2\n' > "$1"
  chmod +x "$1"
else
  touch "$1"
fi
"#;

/// Fake build tool that fails on the sample target and builds the tests normally.
pub const FAKE_MAKE_SAMPLE_FAILS: &str = r#"#!/bin/sh
echo "fake-make $1"
if [ "$1" = "countly-sample" ]; then
  echo "sample.cpp:1: error: deliberate failure" 1>&2
  exit 2
fi
printf '#!/bin/sh\necho "[doctest] test cases: 3 | 3 passed | 0 failed"\n' > "$1"
chmod +x "$1"
"#;

/// Fake build tool whose test binary reports a failing test case.
pub const FAKE_MAKE_TESTS_FAIL: &str = r#"#!/bin/sh
echo "fake-make $1"
if [ "$1" = "countly-tests" ]; then
  printf '#!/bin/sh\necho "[doctest] test cases: 3 | 2 passed | 1 failed"\nexit 1\n' > "$1"
  chmod +x "$1"
else
  touch "$1"
fi
"#;

/// Fake build tool whose test binary prints a line and then hangs.
pub const FAKE_MAKE_TESTS_HANG: &str = r#"#!/bin/sh
echo "fake-make $1"
if [ "$1" = "countly-tests" ]; then
  printf '#!/bin/sh\necho "[doctest] running slow suite"\nexec sleep 30\n' > "$1"
  chmod +x "$1"
else
  touch "$1"
fi
"#;

/// A project directory containing a fake toolchain under `tools/`.
pub struct FakeProject {
    pub dir: TempDir,
}

impl FakeProject {
    pub fn root(&self) -> PathBuf {
        fs::canonicalize(self.dir.path()).expect("Failed to canonicalize project root")
    }

    pub fn tool(&self, name: &str) -> PathBuf {
        self.root().join("tools").join(name)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root().join("test_results.log")
    }

    pub fn read_log(&self) -> String {
        fs::read_to_string(self.log_path()).expect("Failed to read run log")
    }

    /// A configuration pointing `tools.configure` and `tools.build` at the fake scripts.
    pub fn config(&self) -> MatrixConfig {
        let mut config = MatrixConfig::default();
        config.tools.configure = format!("sh {}", self.tool("cmake.sh").display());
        config.tools.build = format!("sh {}", self.tool("make.sh").display());
        config
    }

    /// Writes `BuildMatrix.toml` into the project root and returns its path.
    /// `top_level` holds root keys only, since it is placed before the `[tools]` table.
    pub fn write_config(&self, top_level: &str) -> PathBuf {
        let path = self.root().join("BuildMatrix.toml");
        let content = format!(
            "{}\n[tools]\nconfigure = \"sh {}\"\nbuild = \"sh {}\"\n",
            top_level,
            self.tool("cmake.sh").display(),
            self.tool("make.sh").display()
        );
        fs::write(&path, content).expect("Failed to write BuildMatrix.toml");
        path
    }
}

/// Creates a project with the given generator and build tool scripts.
pub fn setup_fake_project(cmake: &str, make: &str) -> FakeProject {
    let dir = tempdir().expect("Failed to create temporary directory");
    let tools = dir.path().join("tools");
    fs::create_dir_all(&tools).expect("Failed to create tools directory");
    fs::write(tools.join("cmake.sh"), cmake).expect("Failed to write cmake.sh");
    fs::write(tools.join("make.sh"), make).expect("Failed to write make.sh");
    fs::write(dir.path().join("CMakeLists.txt"), "project(fake)\n")
        .expect("Failed to write CMakeLists.txt");
    FakeProject { dir }
}

/// The default working fake toolchain.
pub fn setup_test_environment() -> FakeProject {
    setup_fake_project(FAKE_CMAKE, FAKE_MAKE)
}

/// Helper function to create an invalid TOML configuration
pub fn create_invalid_toml(dir: &Path) -> PathBuf {
    let path = dir.join("invalid.toml");
    let content = r#"
strict = true
# Invalid TOML - missing closing bracket
[tools
configure = "cmake"
"#;
    fs::write(&path, content).unwrap();
    path
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
