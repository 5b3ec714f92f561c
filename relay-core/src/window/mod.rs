//! The context-window manager (§4.11-4.18, C13-C20): token budgeting,
//! tool-pair analysis, truncation, trimming, summarization, checkpointing,
//! and the Auto-Manager orchestrator tying them together.

pub mod auto_manager;
pub mod budget;
pub mod checkpoint;
pub mod image_tokens;
pub mod summarize;
pub mod tool_pairs;
pub mod trim;
pub mod truncate;

pub use auto_manager::AutoManager;
pub use auto_manager::FeatureFlags;
pub use auto_manager::ManageResult;
pub use budget::derive_state;
pub use budget::resolve_budget;
pub use budget::ModelBudgetOverride;
pub use checkpoint::CheckpointStore;
pub use image_tokens::image_tokens;
pub use image_tokens::ImageProvider;
pub use summarize::requires_chain_of_thought_preamble;
pub use summarize::summarize;
pub use summarize::AttemptRecord;
pub use summarize::FallbackEntry;
pub use summarize::SummarizeRequest;
pub use summarize::SummarizeResult;
pub use tool_pairs::analyze;
pub use tool_pairs::ToolPairAnalysis;
pub use trim::trim_tool_outputs;
pub use trim::TrimPolicy;
pub use truncate::assign_priorities;
pub use truncate::truncate;
