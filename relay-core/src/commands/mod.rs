//! The command engine (§4, C1-C12): tokenize → parse → (chain/pipe split)
//! → resolve → validate → dispatch.

pub mod batch;
pub mod chain;
pub mod chained;
pub mod context;
pub mod executor;
pub mod parser;
pub mod pipe;
pub mod piped;
pub mod registry;
pub mod result;
pub mod suggest;
pub mod tokenizer;
pub mod validate;

pub use batch::execute_batch;
pub use batch::BatchCommandResult;
pub use batch::BatchOptions;
pub use chain::parse_chain;
pub use chain::ChainOperator;
pub use chain::ChainSegment;
pub use chain::ChainedInput;
pub use chained::execute_chain;
pub use chained::ChainOutcome;
pub use context::CommandContext;
pub use context::CommandHandler;
pub use context::ContextProvider;
pub use context::Session;
pub use executor::execute;
pub use parser::parse_command;
pub use pipe::parse_pipe;
pub use pipe::PipeSegment;
pub use pipe::PipeSegmentKind;
pub use pipe::PipedInput;
pub use pipe::RedirectMode;
pub use piped::execute_pipe;
pub use registry::CommandRegistry;
pub use result::CancelFn;
pub use result::CancelHandler;
pub use result::CommandResult;
pub use result::InteractivePrompt;
pub use result::PendingOperation;
pub use result::PromptHandler;
pub use suggest::suggest;
pub use tokenizer::tokenize;
pub use validate::validate;
