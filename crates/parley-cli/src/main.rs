mod prompt;
mod strings;

use anyhow::Result;
use clap::Parser;
use console::style;
use parley::agent::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use parley::client::{ChatClient, Delivery};
use parley::errors::ChatError;
use parley::session::Session;

use prompt::{ChatPrompt, Input};
use strings::{strings, Lang};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Chat handler endpoint
    #[arg(long, default_value = "http://127.0.0.1:3000/api/chat")]
    url: String,

    /// Model to ask the handler for
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Interface language, also used for the system prompt
    #[arg(short, long, value_enum, default_value = "es")]
    lang: Lang,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let strings = strings(cli.lang);

    let client = ChatClient::new(cli.url)?
        .with_model(cli.model, cli.temperature)
        .with_fallbacks(strings.fallbacks());
    let mut session = Session::new(strings.system_prompt);
    let mut prompt = ChatPrompt::new(strings);

    prompt.welcome()?;

    loop {
        let text = match prompt.get_input()? {
            Input::Exit => break,
            Input::AskAgain => continue,
            Input::Message(text) => text,
        };

        let mut spinner = Some(prompt.show_busy());
        let result = client
            .send(&mut session, &text, |fragment| {
                if let Some(bar) = spinner.take() {
                    bar.stop("");
                }
                prompt.print_delta(fragment);
            })
            .await;
        if let Some(bar) = spinner.take() {
            bar.stop("");
        }

        match result {
            Ok(Delivery::Streamed) => println!("\n"),
            Ok(Delivery::Direct) => {
                if let Some(reply) = session.last() {
                    prompt.render(reply)?;
                }
            }
            Err(ChatError::Busy) => continue,
            Err(e) => {
                // The session already holds a readable error reply
                if let Some(reply) = session.last() {
                    prompt.render(reply)?;
                }
                eprintln!("{}", style(e).dim());
            }
        }
    }

    prompt.close()?;
    Ok(())
}
