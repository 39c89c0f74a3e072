use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::services::llm::InferenceBackend;
use crate::session::{
    console::Console,
    error::SessionError,
    request_generation::{history_messages, RequestParams},
    transcript::Transcript,
};

pub const HISTORY_PROMPT: &str = "Chat with history: ";
pub const EXIT_KEYWORD: &str = "exit";
pub const SHORT_ANSWER_INSTRUCTION: &str =
    "You are a helpful assistant. You only give a short sentence by answer.";

/// Interactive chat that remembers the conversation.
///
/// Every cycle sends the whole transcript, then the system instruction, then
/// the new user line, and streams the reply to the console as it arrives.
/// Only the user line and the assembled reply are kept in the transcript.
pub struct ChatSession<B> {
    id: Uuid,
    backend: B,
    params: RequestParams,
    system_instruction: String,
    transcript: Transcript,
}

impl<B: InferenceBackend> ChatSession<B> {
    /// `params` is a model name or full [`RequestParams`]; replies are always streamed.
    pub fn new<P: Into<RequestParams>>(backend: B, params: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend,
            params: params.into().with_stream(true),
            system_instruction: SHORT_ANSWER_INSTRUCTION.into(),
            transcript: Transcript::new(),
        }
    }

    pub fn with_system_instruction<T: Into<String>>(mut self, instruction: T) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs until the user types `exit` (any casing) or the input ends.
    ///
    /// Console input is released when the loop stops and the output is
    /// returned. A failed request ends the loop with the error.
    #[instrument(name = "chat.session", skip_all, fields(session_id = %self.id, model = %self.params.model))]
    pub async fn run<R, W>(&mut self, mut console: Console<R, W>) -> Result<W, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let Some(line) = console.read_line(HISTORY_PROMPT).await? else {
                debug!("console input closed");
                break;
            };

            if is_exit(&line) {
                info!(turns = self.transcript.len(), "session ended by user");
                break;
            }

            self.exchange(&line, &mut console).await?;
            console.write("\n\n").await?;
        }

        Ok(console.close())
    }

    /// One request/stream cycle for `input`; returns the assembled reply.
    pub async fn exchange<R, W>(&mut self, input: &str, console: &mut Console<R, W>) -> Result<String, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let messages = history_messages(self.transcript.turns(), &self.system_instruction, input);
        let request = self.params.clone().into_chat_request(messages);

        let mut stream = self.backend.chat_stream(request).await?;
        let mut pending = String::new();
        let mut fragments = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let fragment = chunk.content();
            if !fragment.is_empty() {
                console.write(fragment).await?;
                pending.push_str(fragment);
                fragments += 1;
            }
            if chunk.done {
                break;
            }
        }

        self.transcript.record_exchange(input, pending.clone());
        info!(fragments, chars = pending.len(), turns = self.transcript.len(), "exchange complete");
        Ok(pending)
    }
}

fn is_exit(line: &str) -> bool {
    line.trim().to_lowercase() == EXIT_KEYWORD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::models::base::{InferenceOptions, Message, Role};
    use crate::session::testing::{Reply, ScriptedBackend};

    fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new())
    }

    #[tokio::test]
    async fn streams_reply_and_records_exchange() {
        let backend = ScriptedBackend::new(vec![Reply::Fragments(vec!["Hi", " there", "!"])]);
        let mut session = ChatSession::new(backend, "llama3.2:1b");

        let out = session.run(console("Hello\nexit\n")).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Chat with history: Hi there!\n\nChat with history: "
        );
        assert_eq!(
            session.transcript().turns(),
            &[Message::user("Hello"), Message::assistant("Hi there!")]
        );

        let requests = session.backend().chat_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].base.stream, Some(true));
        assert_eq!(requests[0].base.model, "llama3.2:1b");
        assert_eq!(
            requests[0].messages,
            vec![Message::system(SHORT_ANSWER_INSTRUCTION), Message::user("Hello")]
        );
    }

    #[tokio::test]
    async fn request_params_are_sent_with_streaming_forced_on() {
        let backend = ScriptedBackend::new(vec![Reply::Fragments(vec!["ok"])]);
        let params = RequestParams {
            options: Some(InferenceOptions { temperature: Some(0.1), ..Default::default() }),
            keep_alive: Some("1h".into()),
            ..RequestParams::new("llama3.2:1b", false)
        };
        let mut session = ChatSession::new(backend, params);
        session.run(console("hi\n")).await.unwrap();

        let request = &session.backend().chat_requests()[0];
        assert_eq!(request.base.stream, Some(true));
        assert_eq!(request.base.keep_alive.as_deref(), Some("1h"));
        assert_eq!(request.base.options.as_ref().unwrap().temperature, Some(0.1));
    }

    #[tokio::test]
    async fn exit_in_any_casing_stops_without_a_request() {
        for input in ["exit\n", "EXIT\n", "Exit\n", "  eXiT  \n"] {
            let backend = ScriptedBackend::new(vec![]);
            let mut session = ChatSession::new(backend, "m");
            session.run(console(input)).await.unwrap();
            assert!(session.transcript().is_empty(), "input {input:?}");
            assert!(session.backend().chat_requests().is_empty(), "input {input:?}");
        }
    }

    #[tokio::test]
    async fn transcript_grows_by_two_per_cycle() {
        let backend = ScriptedBackend::new(vec![
            Reply::Fragments(vec!["one"]),
            Reply::Fragments(vec!["t", "wo"]),
            Reply::Fragments(vec!["th", "r", "ee"]),
        ]);
        let mut session = ChatSession::new(backend, "m");
        session.run(console("a\nb\nc\nexit\n")).await.unwrap();

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 6);
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
        let replies: Vec<&str> = turns.iter().skip(1).step_by(2).map(|m| m.content.as_str()).collect();
        assert_eq!(replies, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn system_instruction_is_sent_every_cycle_but_never_stored() {
        let backend = ScriptedBackend::new(vec![
            Reply::Fragments(vec!["1"]),
            Reply::Fragments(vec!["2"]),
            Reply::Fragments(vec!["3"]),
        ]);
        let mut session = ChatSession::new(backend, "m").with_system_instruction("stay short");
        session.run(console("a\nb\nc\n")).await.unwrap();

        assert!(session.transcript().turns().iter().all(|m| m.role != Role::System));

        let requests = session.backend().chat_requests();
        assert_eq!(requests.len(), 3);
        for (n, request) in requests.iter().enumerate() {
            let msgs = &request.messages;
            assert_eq!(msgs.len(), 2 * n + 2);
            assert_eq!(msgs.iter().filter(|m| m.role == Role::System).count(), 1);
            assert_eq!(msgs[msgs.len() - 2], Message::system("stay short"));
            assert_eq!(msgs[msgs.len() - 1].role, Role::User);
        }
        assert_eq!(
            requests[2].messages[..4],
            [
                Message::user("a"),
                Message::assistant("1"),
                Message::user("b"),
                Message::assistant("2"),
            ]
        );
    }

    #[tokio::test]
    async fn end_of_input_ends_the_session() {
        let backend = ScriptedBackend::new(vec![Reply::Fragments(vec!["ok"])]);
        let mut session = ChatSession::new(backend, "m");
        let out = session.run(console("hi\n")).await.unwrap();
        assert_eq!(session.transcript().len(), 2);
        assert!(String::from_utf8(out).unwrap().ends_with("ok\n\nChat with history: "));
    }

    #[tokio::test]
    async fn broken_stream_propagates_and_leaves_transcript_untouched() {
        let backend = ScriptedBackend::new(vec![
            Reply::Fragments(vec!["fine"]),
            Reply::BreaksAfter(vec!["par", "tial"]),
        ]);
        let mut session = ChatSession::new(backend, "m");
        let err = session.run(console("first\nsecond\nexit\n")).await.unwrap_err();

        assert!(matches!(err, SessionError::Inference(_)));
        assert_eq!(
            session.transcript().turns(),
            &[Message::user("first"), Message::assistant("fine")]
        );
    }

    #[tokio::test]
    async fn rejected_request_propagates() {
        let backend = ScriptedBackend::new(vec![Reply::Rejected]);
        let mut session = ChatSession::new(backend, "m");
        let err = session.run(console("hello\n")).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Inference(crate::services::llm::InferenceClientError::Api(_))
        ));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn exchange_returns_concatenated_fragments() {
        let backend = ScriptedBackend::new(vec![Reply::Fragments(vec!["a", "", "b", "c"])]);
        let mut session = ChatSession::new(backend, "m");
        let mut con = console("");
        let reply = session.exchange("q", &mut con).await.unwrap();
        assert_eq!(reply, "abc");
        assert_eq!(session.transcript().last().unwrap().content, "abc");
        assert_eq!(con.close(), b"abc".to_vec());
    }

    #[test]
    fn exit_detection_trims_and_folds_case() {
        assert!(is_exit(" Exit\t"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("quit"));
    }
}
