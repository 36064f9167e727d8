use thiserror::Error;

/// 应用程序错误类型
///
/// 每个流程阶段都有自己的错误枚举，编排层负责把它们归档到对应阶段的错误字段。
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件读取/提取错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 内容分析错误
    #[error("分析错误: {0}")]
    Analysis(#[from] AnalysisError),
    /// 题目生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 题目编辑错误
    #[error("编辑错误: {0}")]
    Edit(#[from] EditError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 流程状态错误
    #[error("流程错误: {0}")]
    Pipeline(#[from] PipelineError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// IO 错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 文件相关错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件超过大小上限，未进行任何解码
    #[error("文件 {file_name} 大小为 {size} 字节，超过上限 {limit} 字节")]
    SizeExceeded {
        file_name: String,
        size: u64,
        limit: u64,
    },
    /// 不支持的文件格式
    #[error("不支持的文件格式: {file_name} ({mime_type})")]
    UnsupportedFormat { file_name: String, mime_type: String },
    /// 文件内容提取失败
    #[error("无法提取文件内容 ({file_name}): {reason}")]
    ExtractionFailed { file_name: String, reason: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 内容分析错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 没有可分析的内容
    #[error("没有可分析的内容")]
    EmptyInput,
    /// 请求内容不合法（在调用模型之前检查）
    #[error("内容项 '{file_name}' 不合法: {reason}")]
    InvalidInput { file_name: String, reason: String },
    /// 模型调用或结果解析失败
    #[error("无法分析内容: {0}")]
    AnalysisFailed(String),
}

/// 题目生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 题目数量超出允许范围
    #[error("题目数量必须在 {min} 到 {max} 之间，当前为 {requested}")]
    QuestionCountOutOfRange { requested: u32, min: u32, max: u32 },
    /// 讲义内容为空
    #[error("讲义内容为空，无法生成题目")]
    EmptyContent,
    /// 模型调用或结果解析失败
    #[error("无法生成题目: {0}")]
    GenerationFailed(String),
}

/// 题目编辑错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("题目不存在: {id}")]
    QuestionNotFound { id: String },
    #[error("题目 {question_id} 中不存在选项 {option_id}")]
    OptionNotFound {
        question_id: String,
        option_id: String,
    },
    /// 该题型不支持此编辑操作
    #[error("题型 {question_type} 不支持操作: {edit}")]
    UnsupportedEdit {
        question_type: String,
        edit: &'static str,
    },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 没有选中任何题目
    #[error("没有选中任何题目，请先选择要保存的题目")]
    NothingSelected,
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    SerializeFailed(#[from] serde_json::Error),
    /// 写入导出文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 流程状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// 当前已有阶段在进行中
    #[error("阶段 {stage} 正在进行中，请稍候")]
    StageBusy { stage: String },
    /// 还没有分析结果，无法生成题目
    #[error("尚未完成内容分析，无法生成题目")]
    AnalysisMissing,
    /// 本批次没有成功处理的文件
    #[error("没有成功处理的文件，无法进行分析")]
    NoUsableFile,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl FileError {
    pub fn extraction_failed(file_name: impl Into<String>, reason: impl ToString) -> Self {
        FileError::ExtractionFailed {
            file_name: file_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        FileError::UnsupportedFormat {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

impl AnalysisError {
    pub fn invalid_input(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_errors_convert_into_app_error() {
        let err: AppError = FileError::unsupported("lecture.doc", "application/msword").into();
        assert!(matches!(
            err,
            AppError::File(FileError::UnsupportedFormat { .. })
        ));
        assert!(err.to_string().contains("lecture.doc"));

        let err: AppError = ExportError::NothingSelected.into();
        assert!(matches!(err, AppError::Export(ExportError::NothingSelected)));
    }

    #[test]
    fn test_count_error_message_names_bounds() {
        let err = GenerationError::QuestionCountOutOfRange {
            requested: 25,
            min: 1,
            max: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("25"));
        assert!(msg.contains("20"));
    }
}
