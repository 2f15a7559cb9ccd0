// User facing texts, one table per interface language.

use clap::ValueEnum;
use parley::client::Fallbacks;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lang {
    Es,
    Pt,
    En,
}

pub struct Strings {
    pub system_prompt: &'static str,
    pub title: &'static str,
    pub input_label: &'static str,
    pub placeholder: &'static str,
    pub exit_hint: &'static str,
    pub help: &'static str,
    pub awaiting: &'static str,
    pub goodbye: &'static str,
    pub provider_error: &'static str,
    pub no_reply: &'static str,
    pub connection_failed: &'static str,
}

impl Strings {
    pub fn fallbacks(&self) -> Fallbacks {
        Fallbacks {
            provider_error: self.provider_error.to_string(),
            no_reply: self.no_reply.to_string(),
            connection_failed: self.connection_failed.to_string(),
        }
    }
}

const ES: Strings = Strings {
    system_prompt: "Eres un asistente experto en póquer. Responde siempre en español, \
        de forma clara y breve. Usa la herramienta search_web cuando te pregunten por \
        resultados o noticias recientes de torneos.",
    title: "Chat de póquer",
    input_label: "Tú",
    placeholder: "Escribe tu mensaje...",
    exit_hint: "Escribe `exit` para salir, `/?` para ver la ayuda",
    help: "exit - Terminar la sesión\n/t - Cambiar entre tema claro y oscuro\n/? - Mostrar esta ayuda",
    awaiting: "Esperando respuesta",
    goodbye: "¡Hasta luego!",
    provider_error: "Error del modelo",
    no_reply: "No se pudo obtener una respuesta válida del modelo.",
    connection_failed: "Ocurrió un error al conectarse con el servicio de chat.",
};

const PT: Strings = Strings {
    system_prompt: "Você é um assistente especialista em pôquer. Responda sempre em \
        português, de forma clara e breve. Use a ferramenta search_web quando perguntarem \
        sobre resultados ou notícias recentes de torneios.",
    title: "Chat de pôquer",
    input_label: "Você",
    placeholder: "Escreva sua mensagem...",
    exit_hint: "Digite `exit` para sair, `/?` para ver a ajuda",
    help: "exit - Encerrar a sessão\n/t - Alternar entre tema claro e escuro\n/? - Mostrar esta ajuda",
    awaiting: "Aguardando resposta",
    goodbye: "Até logo!",
    provider_error: "Erro do modelo",
    no_reply: "Não foi possível obter uma resposta válida do modelo.",
    connection_failed: "Ocorreu um erro ao conectar com o serviço de chat.",
};

const EN: Strings = Strings {
    system_prompt: "You are an expert poker assistant. Always answer in English, \
        clearly and briefly. Use the search_web tool when asked about recent tournament \
        results or news.",
    title: "Poker chat",
    input_label: "You",
    placeholder: "Type your message...",
    exit_hint: "Type `exit` to leave, `/?` for help",
    help: "exit - End the session\n/t - Toggle light/dark theme\n/? - Show this help",
    awaiting: "Awaiting reply",
    goodbye: "Goodbye!",
    provider_error: "Model error",
    no_reply: "Could not get a valid reply from the model.",
    connection_failed: "An error occurred while connecting to the chat service.",
};

pub fn strings(lang: Lang) -> &'static Strings {
    match lang {
        Lang::Es => &ES,
        Lang::Pt => &PT,
        Lang::En => &EN,
    }
}
