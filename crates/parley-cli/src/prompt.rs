use std::io::{self, Write};

use anyhow::{anyhow, Result};
use bat::WrappingMode;
use cliclack::{input, spinner, ProgressBar};
use console::style;
use parley::models::message::Message;

use crate::strings::Strings;

pub enum Input {
    /// Ask the user for input again
    AskAgain,
    Message(String),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    fn bat_theme(self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Interpret a line typed by the user. Commands never reach the model.
pub fn parse_input(text: &str) -> Input {
    let text = text.trim();
    if text.is_empty() {
        return Input::AskAgain;
    }
    match text.to_ascii_lowercase().as_str() {
        "exit" | "/exit" | "/quit" => Input::Exit,
        _ => Input::Message(text.to_string()),
    }
}

pub struct ChatPrompt {
    strings: &'static Strings,
    theme: Theme,
}

impl ChatPrompt {
    pub fn new(strings: &'static Strings) -> Self {
        ChatPrompt {
            strings,
            theme: Theme::Dark,
        }
    }

    pub fn welcome(&self) -> Result<()> {
        cliclack::intro(style(self.strings.title).bold().to_string())?;
        println!("{}\n", style(self.strings.exit_hint).dim());
        Ok(())
    }

    pub fn get_input(&mut self) -> Result<Input> {
        let text: String = input(self.strings.input_label)
            .placeholder(self.strings.placeholder)
            .required(false)
            .interact()?;

        match text.trim() {
            "/t" => {
                self.theme = self.theme.toggled();
                Ok(Input::AskAgain)
            }
            "/?" => {
                println!("{}", self.strings.help);
                Ok(Input::AskAgain)
            }
            _ => Ok(parse_input(&text)),
        }
    }

    pub fn show_busy(&self) -> ProgressBar {
        let bar = spinner();
        bar.start(self.strings.awaiting);
        bar
    }

    /// Print a streamed fragment as soon as it arrives
    pub fn print_delta(&self, fragment: &str) {
        print!("{}", fragment);
        let _ = io::stdout().flush();
    }

    pub fn render(&self, message: &Message) -> Result<()> {
        bat::PrettyPrinter::new()
            .input(bat::Input::from_bytes(message.text().as_bytes()))
            .theme(self.theme.bat_theme())
            .language("Markdown")
            .wrapping_mode(WrappingMode::Character)
            .print()
            .map_err(|e| anyhow!("could not render reply: {}", e))?;
        println!();
        io::stdout().flush()?;
        Ok(())
    }

    pub fn close(&self) -> Result<()> {
        cliclack::outro(self.strings.goodbye)?;
        Ok(())
    }
}
