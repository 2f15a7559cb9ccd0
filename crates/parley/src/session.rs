use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::models::role::Role;

/// Where a session is in the exchange for the message being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    /// Request is out, the handler has not answered yet
    AwaitingDecision,
    /// A one-shot reply is being recorded
    DirectFinal,
    /// Deltas are being appended to the live assistant message
    Streaming,
}

/// The client side of one conversation.
///
/// Owns the transcript, which always starts with the system prompt. Messages
/// are only ever appended, with one exception: while streaming, the last
/// assistant message is live and grows until the stream completes.
#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Message>,
    state: SendState,
    live: bool,
}

impl Session {
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Session {
            messages: vec![Message::system(system_prompt)],
            state: SendState::Idle,
            live: false,
        }
    }

    /// Full transcript, as sent to the handler
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages meant for the user to see
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    /// While busy the input is disabled and a loading indicator is shown
    pub fn is_busy(&self) -> bool {
        self.state != SendState::Idle
    }

    pub fn push(&mut self, message: Message) {
        self.live = false;
        self.messages.push(message);
    }

    /// Record the user's message and move to awaiting the handler.
    pub fn begin_send<S: Into<String>>(&mut self, text: S) -> ChatResult<()> {
        if self.is_busy() {
            return Err(ChatError::Busy);
        }
        self.push(Message::user(text));
        self.state = SendState::AwaitingDecision;
        Ok(())
    }

    /// The handler answered with a one-shot body that is being read.
    pub fn begin_direct(&mut self) {
        self.state = SendState::DirectFinal;
    }

    /// Record a one-shot reply and go back to idle.
    pub fn finish_direct(&mut self, message: Message) {
        self.push(message);
        self.state = SendState::Idle;
    }

    /// Start the live assistant message deltas will be appended to.
    pub fn begin_streaming(&mut self) {
        self.push(Message::assistant(""));
        self.live = true;
        self.state = SendState::Streaming;
    }

    /// Append a fragment to the live message. Returns false, leaving the
    /// transcript untouched, when no message is live.
    pub fn append_to_last(&mut self, fragment: &str) -> bool {
        if !self.live {
            return false;
        }
        match self.messages.last_mut() {
            Some(message) => {
                message
                    .content
                    .get_or_insert_with(String::new)
                    .push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Swap the last message for another, keeping it live if it was.
    pub fn replace_last(&mut self, message: Message) {
        match self.messages.last_mut() {
            Some(last) if last.role != Role::System => *last = message,
            _ => self.messages.push(message),
        }
    }

    /// Freeze the live message and go back to idle.
    pub fn finish_streaming(&mut self) {
        self.live = false;
        self.state = SendState::Idle;
    }

    /// Abandon the send: freeze anything live, record `text` as the
    /// assistant's reply and go back to idle.
    pub fn fail<S: Into<String>>(&mut self, text: S) {
        self.push(Message::assistant(text));
        self.state = SendState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_is_first_and_hidden() {
        let mut session = Session::new("You are a poker coach.");
        session.begin_send("hi").unwrap();

        assert_eq!(session.messages()[0].role, Role::System);
        let visible: Vec<_> = session.visible().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text(), "hi");
    }

    #[test]
    fn test_direct_round_trip() {
        let mut session = Session::new("sys");
        assert!(!session.is_busy());

        session.begin_send("Should I call?").unwrap();
        assert_eq!(session.state(), SendState::AwaitingDecision);
        assert!(session.is_busy());

        session.begin_direct();
        assert_eq!(session.state(), SendState::DirectFinal);
        assert!(session.is_busy());

        session.finish_direct(Message::assistant("Fold."));
        assert_eq!(session.state(), SendState::Idle);
        assert_eq!(session.last().unwrap().text(), "Fold.");
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_busy_session_rejects_send() {
        let mut session = Session::new("sys");
        session.begin_send("one").unwrap();
        assert_eq!(session.begin_send("two"), Err(ChatError::Busy));
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_streaming_grows_one_message_then_freezes() {
        let mut session = Session::new("sys");
        session.begin_send("Who won?").unwrap();
        session.begin_streaming();
        assert_eq!(session.state(), SendState::Streaming);

        assert!(session.append_to_last("Hel"));
        assert!(session.append_to_last("lo"));
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.last().unwrap().text(), "Hello");

        session.finish_streaming();
        assert!(!session.append_to_last("!!"));
        assert_eq!(session.last().unwrap().text(), "Hello");
        assert!(!session.is_busy());
    }

    #[test]
    fn test_append_needs_live_message() {
        let mut session = Session::new("sys");
        session.begin_send("hi").unwrap();
        assert!(!session.append_to_last("x"));
        assert_eq!(session.last().unwrap().text(), "hi");
    }

    #[test]
    fn test_replace_last_never_touches_system_prompt() {
        let mut session = Session::new("sys");
        session.replace_last(Message::assistant("hello"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].text(), "sys");

        session.replace_last(Message::assistant("hello again"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.last().unwrap().text(), "hello again");
    }

    #[test]
    fn test_fail_freezes_partial_stream() {
        let mut session = Session::new("sys");
        session.begin_send("hi").unwrap();
        session.begin_streaming();
        session.append_to_last("partial");

        session.fail("Could not reach the chat service.");
        assert!(!session.is_busy());
        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.messages()[2].text(), "partial");
        assert!(!session.append_to_last("more"));
    }
}
