use std::future::Future;
use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use crossterm::style::Stylize;
use tracing::debug;

use crate::ai::ChatBackend;
use crate::commands::{self, Command};
use crate::input::{InputEvent, InputHandler};
use crate::state::Conversation;

/// Instruction that opens every conversation.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert prompt engineer for coding tasks.
Your goal is to rewrite the user's request into a highly precise, concise prompt for an AI coding agent.

Rules:
1. Remove filler, pleasantries, and ambiguity.
2. Keep technical details, filenames, and constraints.
3. If the user asks to modify a previous request (e.g. \"make it shorter\"), output the UPDATED version of the prompt.
4. Output ONLY the rewritten prompt. No explanations, no \"Here is the result:\".";

/// Whether the loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Command,
    EndOfInput,
    Interrupted,
}

pub struct App<B> {
    backend: B,
    model: String,
    conversation: Conversation,
}

impl<B: ChatBackend> App<B> {
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            conversation: Conversation::new(SYSTEM_INSTRUCTION),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn print_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", format!("Ollama Cloud Polisher ({})", self.model).blue())?;
        writeln!(out, "Type your rough prompt to get a refined version.")?;
        writeln!(out, "Commands: /clear (reset history), /exit (quit)")?;
        writeln!(out, "{}", "-".repeat(40))?;
        Ok(())
    }

    /// Read lines until an exit command, end of input, or `interrupt` resolves.
    ///
    /// The interrupt is only polled while waiting for input; a request in
    /// flight always runs to completion first.
    pub async fn run<W, I>(
        &mut self,
        input: &mut InputHandler,
        out: &mut W,
        interrupt: I,
    ) -> Result<LoopExit>
    where
        W: Write,
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        loop {
            write!(out, "{} ", "You:".green())?;
            out.flush()?;

            let line = tokio::select! {
                event = input.next() => match event {
                    InputEvent::Line(line) => line,
                    InputEvent::Eof => {
                        writeln!(out, "\nExiting...")?;
                        return Ok(LoopExit::EndOfInput);
                    }
                },
                _ = &mut interrupt => {
                    writeln!(out, "\nExiting...")?;
                    return Ok(LoopExit::Interrupted);
                }
            };

            if self.handle_line(&line, out).await? == Flow::Exit {
                return Ok(LoopExit::Command);
            }
        }
    }

    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        match commands::parse(line) {
            Command::Exit => {
                writeln!(out, "Goodbye!")?;
                Ok(Flow::Exit)
            }
            Command::Clear => {
                self.conversation.clear();
                writeln!(out, "{}", "History cleared.".blue())?;
                Ok(Flow::Continue)
            }
            Command::Blank => Ok(Flow::Continue),
            Command::Chat(text) => {
                self.conversation.push_user(text);

                let started = Instant::now();
                let reply = self.backend.reply(self.conversation.messages()).await;
                let elapsed = started.elapsed();
                debug!(elapsed_ms = elapsed.as_millis() as u64, "reply received");

                self.conversation.push_assistant(reply.as_str());

                writeln!(out, "{} {}", "AI:".blue(), reply)?;
                writeln!(out, "   [{:.2}s]", elapsed.as_secs_f64())?;
                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FALLBACK_REPLY;
    use crate::state::{ChatMessage, ChatRole};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Replays canned replies and records every history it was sent.
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<String>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedBackend {
        fn with_replies(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<ChatMessage>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn reply(&self, messages: &[ChatMessage]) -> String {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| FALLBACK_REPLY.to_string())
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_session_scenario() {
        let backend = ScriptedBackend::with_replies(&["Optimize fn for speed.", "Speed up fn."]);
        let mut app = App::new(backend, "deepseek-coder");
        let mut out = Vec::new();

        app.handle_line("refactor this function to be faster", &mut out)
            .await
            .unwrap();
        assert_eq!(app.conversation().len(), 3);
        assert!(output(out.clone()).contains("Optimize fn for speed."));

        app.handle_line("make it shorter", &mut out).await.unwrap();
        let calls = app.backend().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].len(), 4);
        assert_eq!(calls[1][2], ChatMessage::assistant("Optimize fn for speed."));
        assert_eq!(calls[1][3], ChatMessage::user("make it shorter"));

        assert_eq!(app.handle_line("/clear", &mut out).await.unwrap(), Flow::Continue);
        assert_eq!(app.conversation().len(), 1);

        assert_eq!(app.handle_line("/exit", &mut out).await.unwrap(), Flow::Exit);
        assert!(output(out).ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_length_after_n_turns() {
        let mut app = App::new(ScriptedBackend::default(), "m");
        let mut out = Vec::new();
        for n in 1..=4 {
            app.handle_line(&format!("turn {n}"), &mut out).await.unwrap();
            assert_eq!(app.conversation().len(), 1 + 2 * n);
        }
    }

    #[tokio::test]
    async fn test_blank_lines_do_not_call_backend() {
        let mut app = App::new(ScriptedBackend::default(), "m");
        let mut out = Vec::new();
        for line in ["", "   ", "\t"] {
            assert_eq!(app.handle_line(line, &mut out).await.unwrap(), Flow::Continue);
        }
        assert_eq!(app.conversation().len(), 1);
        assert!(app.backend().calls().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_reply_stays_in_history() {
        let mut app = App::new(ScriptedBackend::default(), "m");
        let mut out = Vec::new();
        app.handle_line("hello", &mut out).await.unwrap();

        let last = app.conversation().messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_quitnow_is_chat_input() {
        let mut app = App::new(ScriptedBackend::with_replies(&["ok"]), "m");
        let mut out = Vec::new();
        assert_eq!(app.handle_line("/quitnow", &mut out).await.unwrap(), Flow::Continue);
        assert_eq!(app.conversation().len(), 3);
    }

    #[tokio::test]
    async fn test_run_until_exit_command() {
        let mut app = App::new(ScriptedBackend::with_replies(&["first", "second"]), "m");
        let mut input = InputHandler::spawn(Cursor::new(
            "refactor this function to be faster\n\nmake it shorter\n/clear\n/exit\nnever read\n",
        ));
        let mut out = Vec::new();

        let exit = app
            .run(&mut input, &mut out, std::future::pending())
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::Command);
        assert_eq!(app.conversation().len(), 1);
        assert_eq!(app.backend().calls().len(), 2);
        let text = output(out);
        assert!(text.contains("first"));
        assert!(text.contains("second"));
        assert!(text.contains("History cleared."));
    }

    #[tokio::test]
    async fn test_run_stops_at_end_of_input() {
        let mut app = App::new(ScriptedBackend::with_replies(&["done"]), "m");
        let mut input = InputHandler::spawn(Cursor::new("one request"));
        let mut out = Vec::new();

        let exit = app
            .run(&mut input, &mut out, std::future::pending())
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::EndOfInput);
        assert_eq!(app.conversation().len(), 3);
        assert!(output(out).ends_with("\nExiting...\n"));
    }

    #[tokio::test]
    async fn test_run_stops_on_interrupt() {
        let mut app = App::new(ScriptedBackend::default(), "m");
        let (_keep_open, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut input = InputHandler::from_receiver(rx);
        let mut out = Vec::new();

        let exit = app
            .run(&mut input, &mut out, async {})
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(app.conversation().len(), 1);
        assert!(output(out).contains("Exiting..."));
    }

    #[test]
    fn test_banner_names_model() {
        let app = App::new(ScriptedBackend::default(), "qwen2.5-coder");
        let mut out = Vec::new();
        app.print_banner(&mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Ollama Cloud Polisher (qwen2.5-coder)"));
        assert!(text.contains("/clear (reset history)"));
    }
}
