//! # Configuration Module / 配置模块
//!
//! Loads a test suite definition from its XML configuration file.
//! The file is deserialized with `quick-xml` into loosely typed raw structs
//! and then validated into immutable [`TestDefinition`]s, so every problem
//! is reported with the file and test it belongs to.
//!
//! 从 XML 配置文件加载测试套件定义。
//! 文件先通过 `quick-xml` 反序列化为宽松类型的原始结构体，
//! 然后校验为不可变的 [`TestDefinition`]，从而每个问题都会附带其所属的文件和测试。
//!
//! ```xml
//! <testSuite name="suite">
//!   <test name="t1" description="..." testType="localProcess" maxTestTime_s="2">
//!     <testOptions>
//!       <executable>/path/to/app --flag</executable>
//!     </testOptions>
//!   </test>
//! </testSuite>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

const ROOT_ELEMENT: &str = "testSuite";
const ATTR_NAME: &str = "name";
const ATTR_DESCRIPTION: &str = "description";
const ATTR_TEST_TYPE: &str = "testType";
const ATTR_MAX_TEST_TIME: &str = "maxTestTime_s";
const NODE_TEST_OPTIONS: &str = "testOptions";
const NODE_EXECUTABLE: &str = "executable";
const UNKNOWN_TEST: &str = "<unknownTest>";

/// Errors raised while loading a suite configuration. All of them are fatal:
/// no test runs when the configuration is invalid.
///
/// 加载套件配置时产生的错误。它们都是致命的：配置无效时不会运行任何测试。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("while parsing '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("while parsing '{file}': {message}")]
    Suite { file: String, message: String },
    #[error("in '{file}::{test}': {message}")]
    Test {
        file: String,
        test: String,
        message: String,
    },
}

/// The kinds of tests mputf knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    /// Runs a separate local executable and judges its exit code and stderr.
    /// 运行一个独立的本地可执行文件，并根据其退出码和 stderr 进行判断。
    LocalProcess,
}

impl TestType {
    pub const LOCAL_PROCESS: &'static str = "localProcess";

    fn parse(value: &str) -> Option<Self> {
        match value {
            Self::LOCAL_PROCESS => Some(TestType::LocalProcess),
            _ => None,
        }
    }
}

/// Represents a single test defined in the suite configuration.
/// Immutable once parsed.
///
/// 代表套件配置中定义的单个测试。解析后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    /// The unique name of the test, used in reports and logs.
    /// 测试的唯一名称，用于报告和日志。
    pub name: String,
    /// A user-friendly description / 用户友好的描述
    pub description: String,
    /// The kind of test / 测试类型
    pub test_type: TestType,
    /// Maximum run time in whole seconds; `None` means unlimited.
    /// 最长运行时间（整秒）；`None` 表示不限制。
    pub max_test_time_s: Option<u64>,
    /// The full command line: program path followed by its arguments.
    /// 完整的命令行：程序路径及其参数。
    pub command_line: String,
}

impl TestDefinition {
    /// Creates a local process test definition.
    pub fn local_process(
        name: impl Into<String>,
        description: impl Into<String>,
        max_test_time_s: Option<u64>,
        command_line: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            test_type: TestType::LocalProcess,
            max_test_time_s,
            command_line: command_line.into(),
        }
    }

    /// The configured deadline as a `Duration`.
    pub fn deadline(&self) -> Option<Duration> {
        self.max_test_time_s.map(Duration::from_secs)
    }
}

/// The entire suite configuration.
/// 整个套件配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Suite name from the root element / 根元素中的套件名称
    pub name: String,
    /// Tests in document order / 按文档顺序排列的测试
    pub tests: Vec<TestDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawSuite {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "test", default)]
    tests: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
struct RawTest {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@description")]
    description: Option<String>,
    #[serde(rename = "@testType")]
    test_type: Option<String>,
    #[serde(rename = "@maxTestTime_s")]
    max_test_time_s: Option<String>,
    #[serde(rename = "testOptions", default)]
    options: Vec<RawOptions>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOptions {
    #[serde(default)]
    executable: Option<String>,
}

/// Loads and validates a suite configuration file.
///
/// # Arguments
/// * `path` - Path to the XML configuration file
///
/// # Returns
/// The validated `SuiteConfig`, or the first `ConfigError` found.
pub fn load_suite_config(path: &Path) -> Result<SuiteConfig, ConfigError> {
    let file = file_label(path);
    trace!(path = %path.display(), "reading suite configuration");

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        file: file.clone(),
        source,
    })?;

    parse_suite_config(&content, &file)
}

/// Parses a suite configuration from XML text. `file` is only used to label
/// errors.
pub fn parse_suite_config(xml: &str, file: &str) -> Result<SuiteConfig, ConfigError> {
    let suite_error = |message: String| ConfigError::Suite {
        file: file.to_string(),
        message,
    };

    match root_element(xml).map_err(suite_error)? {
        Some(root) if root == ROOT_ELEMENT => {}
        Some(root) => {
            return Err(suite_error(format!(
                "expected root element '{ROOT_ELEMENT}', found '{root}'"
            )));
        }
        None => return Err(suite_error("no test suite definition found".to_string())),
    }

    let raw: RawSuite = quick_xml::de::from_str(xml).map_err(|e| suite_error(e.to_string()))?;

    let name = raw
        .name
        .ok_or_else(|| suite_error(format!("missing test suite attribute '{ATTR_NAME}'")))?;
    debug!(suite = %name, "parsing tests");

    let tests = raw
        .tests
        .into_iter()
        .map(|test| validate_test(test, file))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(suite = %name, count = tests.len(), "all tests parsed successfully");
    Ok(SuiteConfig { name, tests })
}

/// Returns the name of the document element, if any.
fn root_element(xml: &str) -> Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(Some(String::from_utf8_lossy(e.name().as_ref()).into_owned()));
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }
}

fn validate_test(raw: RawTest, file: &str) -> Result<TestDefinition, ConfigError> {
    let test_label = raw.name.clone().unwrap_or_else(|| UNKNOWN_TEST.to_string());
    let test_error = |message: String| ConfigError::Test {
        file: file.to_string(),
        test: test_label.clone(),
        message,
    };

    let name = raw
        .name
        .ok_or_else(|| test_error(format!("missing attribute '{ATTR_NAME}'")))?;
    let description = raw
        .description
        .ok_or_else(|| test_error(format!("missing attribute '{ATTR_DESCRIPTION}'")))?;
    let test_type = raw
        .test_type
        .ok_or_else(|| test_error(format!("missing attribute '{ATTR_TEST_TYPE}'")))?;

    let max_test_time_s = match raw.max_test_time_s.as_deref() {
        None => None,
        Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
            test_error(format!(
                "error parsing attribute '{ATTR_MAX_TEST_TIME}'::'{value}'"
            ))
        })?),
    };

    let test_type = TestType::parse(&test_type)
        .ok_or_else(|| test_error(format!("unknown test type '{test_type}'")))?;

    let mut options = raw.options.into_iter();
    let opts = match (options.next(), options.next()) {
        (None, _) => return Err(test_error("no test options specified".to_string())),
        (Some(_), Some(_)) => {
            return Err(test_error(format!(
                "multiple '{NODE_TEST_OPTIONS}' nodes detected"
            )));
        }
        (Some(opts), None) => opts,
    };

    let command_line = opts
        .executable
        .map(|exe| exe.trim().to_string())
        .filter(|exe| !exe.is_empty())
        .ok_or_else(|| test_error(format!("missing node '{NODE_EXECUTABLE}'")))?;

    trace!(
        test = %name,
        test_type = TestType::LOCAL_PROCESS,
        max_test_time_s = ?max_test_time_s,
        executable = %command_line,
        "parsed test"
    );

    Ok(TestDefinition {
        name,
        description,
        test_type,
        max_test_time_s,
        command_line,
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
