mod async_tts;
mod ids;
mod session;

pub use async_tts::{AsyncTtsTask, AsyncTtsTaskStatus, TtsSentenceTiming};
pub use ids::{MessageId, TaskId};
pub use session::{AsrAccumulator, AsrParams, Session, SessionState, SynthesisKind, TtsFormat, TtsParams};
