//! Recognizing commands in rider text.

use crate::model::Locale;

/// Everything a rider can ask for outside of answering a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Stop,
    Reset,
    OrderRide,
    ActiveOrders,
    CancelOrders,
    AskQuestion,
    About,
}

impl Command {
    pub const MENU: [Command; 5] = [
        Command::OrderRide,
        Command::ActiveOrders,
        Command::CancelOrders,
        Command::AskQuestion,
        Command::About,
    ];

    /// Parses a slash command (`/order`, `/order@taxi_bot`) or a menu label in either locale.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('/') {
            let name = rest.split_whitespace().next().unwrap_or_default();
            let name = name.split('@').next().unwrap_or_default();
            return Self::from_slash(&name.to_lowercase());
        }
        let lowered = text.to_lowercase();
        [Command::Reset]
            .into_iter()
            .chain(Self::MENU)
            .find(|command| {
                Locale::ALL
                    .iter()
                    .filter_map(|locale| command.label(*locale))
                    .any(|label| label.to_lowercase() == lowered)
            })
    }

    fn from_slash(name: &str) -> Option<Command> {
        let command = match name {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "reset" => Command::Reset,
            "order" => Command::OrderRide,
            "orders" => Command::ActiveOrders,
            "cancel" => Command::CancelOrders,
            "question" => Command::AskQuestion,
            "about" => Command::About,
            _ => return None,
        };
        Some(command)
    }

    /// Keyboard label, for commands that have one.
    pub fn label(self, locale: Locale) -> Option<&'static str> {
        let label = match (self, locale) {
            (Command::OrderRide, Locale::En) => "Order a taxi",
            (Command::OrderRide, Locale::Ru) => "Заказать такси",
            (Command::ActiveOrders, Locale::En) => "Active orders",
            (Command::ActiveOrders, Locale::Ru) => "Активные заказы",
            (Command::CancelOrders, Locale::En) => "Cancel my orders",
            (Command::CancelOrders, Locale::Ru) => "Отменить заказы",
            (Command::AskQuestion, Locale::En) => "Ask a question",
            (Command::AskQuestion, Locale::Ru) => "Задать вопрос",
            (Command::About, Locale::En) => "Contacts",
            (Command::About, Locale::Ru) => "Контакты",
            (Command::Reset, Locale::En) => "Cancel request",
            (Command::Reset, Locale::Ru) => "Отменить заявку",
            (Command::Start | Command::Stop, _) => return None,
        };
        Some(label)
    }

    /// Commands honoured even while a request is being filled in.
    pub fn interrupts(self) -> bool {
        matches!(self, Command::Start | Command::Stop | Command::Reset)
    }
}

/// Slash-prefixed text that [`Command::parse`] does not know.
pub fn is_unknown_command(text: &str) -> bool {
    text.trim_start().starts_with('/') && Command::parse(text).is_none()
}

pub fn skip_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Skip",
        Locale::Ru => "Пропустить",
    }
}

/// Whether `text` is the "Skip" button in any locale.
pub fn is_skip(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    Locale::ALL
        .iter()
        .any(|locale| skip_label(*locale).to_lowercase() == lowered)
}
