use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::{Difficulty, QuestionType};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 上传文件大小上限（字节）
    pub max_upload_bytes: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 题目生成默认参数 ---
    pub default_question_count: u32,
    pub default_difficulty: Difficulty,
    pub default_question_type: QuestionType,
    // --- 导出 ---
    /// 导出目录
    pub output_dir: PathBuf,
    /// 导出文件名
    pub export_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 4096,
            default_question_count: 5,
            default_difficulty: Difficulty::Medium,
            default_question_type: QuestionType::SingleChoice,
            output_dir: PathBuf::from("."),
            export_file_name: crate::workflow::export::DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 文本解析配置，缺失的字段使用默认值
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// 读取 TOML 配置文件
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &display)
    }

    /// 加载完整配置：`LECTURE_QUIZ_CONFIG` 指向的 TOML 文件（可选），再叠加环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("LECTURE_QUIZ_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.apply_env()
    }

    /// 用环境变量覆盖配置项
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Ok(v) = std::env::var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        self.max_upload_bytes = env_or("MAX_UPLOAD_BYTES", self.max_upload_bytes, "u64")?;
        self.default_question_count =
            env_or("QUESTION_COUNT", self.default_question_count, "u32")?;
        self.default_difficulty =
            env_or("QUESTION_DIFFICULTY", self.default_difficulty, "easy|medium|hard")?;
        self.default_question_type = env_or(
            "QUESTION_TYPE",
            self.default_question_type,
            "fill-in-the-blank|single-choice|multiple-choice",
        )?;
        self.verbose_logging = env_or("VERBOSE_LOGGING", self.verbose_logging, "bool")?;
        Ok(self)
    }
}

fn env_or<T: FromStr>(var_name: &str, default: T, expected_type: &str) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(default),
    }
}
