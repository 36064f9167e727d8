//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把各项能力串成完整流程，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline_state` - 流程状态
//! - 上传 / 分析 / 生成三个阶段的全部状态
//! - 只能通过事件修改，旧 epoch 的事件被丢弃
//! - 同一时间只允许一个阶段进行
//!
//! ### `lecture_pipeline` - 讲义处理流程
//! - 批量提取文件，自动进入分析
//! - 生成题目并交给编辑器
//! - 导出选中的题目
//!
//! ### `app` - 应用入口
//! - 创建模型客户端
//! - 从磁盘加载文件并驱动流程
//! - 输出运行统计
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<PathBuf>)
//!     ↓
//! lecture_pipeline (维护 PipelineState)
//!     ↓
//! workflow::QuestionEditor (编辑 / 导出)
//!     ↓
//! services (能力层：extractor / analysis / generation)
//!     ↓
//! infrastructure (基础设施：ChatModel)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一写者**：只有编排层修改 `PipelineState`
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和状态记录，不做具体业务判断

pub mod app;
pub mod lecture_pipeline;
pub mod pipeline_state;

// 重新导出主要类型
pub use app::{App, RunStats};
pub use lecture_pipeline::LecturePipeline;
pub use pipeline_state::{Epoch, PipelineEvent, PipelineState, Stage};
