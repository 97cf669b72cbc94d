mod assistant;
mod openai;
mod parse;
mod prompt;
mod provider;
mod queue;

pub use assistant::*;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parse::extract_json;
pub use prompt::{HouseholdContext, MemberProfile};
pub use provider::{ChatRole, Completion, CompletionProvider, CompletionRequest, Message};
pub use queue::{JobId, JobInfo, Priority, QueueError, QueueSnapshot, QueueStats, RequestQueue, Ticket};
