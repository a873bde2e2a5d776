//! Localized texts and keyboards.

use super::input::{skip_label, Command};
use crate::model::{Locale, Order, OrderId};
use crate::transport::{CallbackPayload, InlineButton, Keyboard};
use std::fmt::Write;

/// Every text the dispatcher sends.
#[derive(Debug, Clone, Copy)]
pub enum Prompt<'a> {
    Welcome { name: &'a str },
    Farewell,
    AskPickup,
    AskDropoff,
    AskContact,
    AskComment,
    OrderSubmitted { order_id: OrderId },
    Unrecognized,
    StepInProgress,
    ExpectedText,
    AskQuestion,
    QuestionForwarded,
    QuestionToAdmin { name: &'a str, profile: Option<&'a str>, text: &'a str },
    About,
    ActiveOrders(&'a [Order]),
    NoActiveOrders,
    OrdersCancelled(usize),
    NoOrdersToCancel,
    RequestReset,
    TemporaryFailure,
    AddressNotFound,
    RiderConfirmation(&'a Order),
    Announcement(&'a Order),
    AcceptedBanner { announcement: &'a str, driver_name: &'a str },
    DriverDetails(&'a Order),
    AlreadyTaken { order_id: OrderId },
    OrderNotFound { order_id: OrderId },
}

impl Prompt<'_> {
    pub fn render(&self, locale: Locale) -> String {
        let ru = locale == Locale::Ru;
        let pick = |en: &str, ru_text: &str| if ru { ru_text.to_string() } else { en.to_string() };
        match *self {
            Prompt::Welcome { name } => {
                if ru {
                    format!("Привет, {name}! С моей помощью можно удобно заказать такси!")
                } else {
                    format!("Hi, {name}! I can help you order a taxi.")
                }
            }
            Prompt::Farewell => pick(
                "Bye! Send /start to use me again.",
                "Чтобы вновь пользоваться мной - введи /start",
            ),
            Prompt::AskPickup => pick(
                "Where should we pick you up? Type an address or share your location.",
                "Откуда Вас забрать?",
            ),
            Prompt::AskDropoff => pick("Where are you going?", "Куда Вас отвезти?"),
            Prompt::AskContact => pick("How can the driver reach you?", "Как с Вами связаться?"),
            Prompt::AskComment => pick(
                "Anything the driver should know? Press Skip if not.",
                "Комментарий для водителя? Нажмите «Пропустить», если его нет.",
            ),
            Prompt::OrderSubmitted { order_id } => {
                if ru {
                    format!("Заявка №{} отправлена! Ожидайте ответа", order_id.0)
                } else {
                    format!("Request #{} sent! Please wait for a driver.", order_id.0)
                }
            }
            Prompt::Unrecognized => pick("I don't know that command.", "Я не знаю такой команды"),
            Prompt::StepInProgress => pick(
                "Please finish the current request or press \"Cancel request\".",
                "Сначала завершите текущую заявку или нажмите «Отменить заявку».",
            ),
            Prompt::ExpectedText => pick(
                "Please answer with a text message.",
                "Пожалуйста, ответьте текстом.",
            ),
            Prompt::AskQuestion => pick("What is your question?", "Какой у Вас вопрос?"),
            Prompt::QuestionForwarded => pick(
                "Thanks! Your question was sent to the operator.",
                "Спасибо! Вопрос передан оператору.",
            ),
            Prompt::QuestionToAdmin { name, profile, text } => {
                let who = profile.map_or_else(|| name.to_string(), |link| format!("{name} ({link})"));
                if ru {
                    format!("Вопрос от {who}:\n{text}")
                } else {
                    format!("Question from {who}:\n{text}")
                }
            }
            Prompt::About => pick(
                "Questions and feedback: use \"Ask a question\" in the menu.",
                "Вопросы и пожелания: «Задать вопрос» в меню.",
            ),
            Prompt::ActiveOrders(orders) => {
                let mut text = pick("Your active orders:", "Ваши активные заказы:");
                for order in orders {
                    let _ = write!(text, "\n#{} {}", order.id.0, route(order));
                }
                text
            }
            Prompt::NoActiveOrders => pick("No active orders.", "Нет активных заказов"),
            Prompt::OrdersCancelled(count) => {
                if ru {
                    format!("Отменено заказов: {count}")
                } else {
                    format!("Cancelled orders: {count}")
                }
            }
            Prompt::NoOrdersToCancel => pick("Nothing to cancel.", "Нечего отменять."),
            Prompt::RequestReset => pick("Request cancelled.", "Заявка отменена."),
            Prompt::TemporaryFailure => pick(
                "Something went wrong, please try again in a moment.",
                "Что-то пошло не так, попробуйте ещё раз чуть позже.",
            ),
            Prompt::AddressNotFound => pick("Address not found", "Адрес не найден"),
            Prompt::RiderConfirmation(order) => {
                if ru {
                    format!(
                        "Заказ №{} принят! Водитель: {}\n{}",
                        order.id.0,
                        order.driver_name,
                        route(order)
                    )
                } else {
                    format!(
                        "Order #{} accepted! Driver: {}\n{}",
                        order.id.0,
                        order.driver_name,
                        route(order)
                    )
                }
            }
            Prompt::Announcement(order) => {
                let mut text = if ru {
                    format!("Новый заказ №{}\n{}", order.id.0, route(order))
                } else {
                    format!("New order #{}\n{}", order.id.0, route(order))
                };
                if !order.comment.is_empty() {
                    let _ = write!(text, "\n{}", order.comment);
                }
                text
            }
            Prompt::AcceptedBanner {
                announcement,
                driver_name,
            } => {
                if ru {
                    format!("{announcement}\n\nПринят! Водитель: {driver_name}")
                } else {
                    format!("{announcement}\n\nAccepted! Driver: {driver_name}")
                }
            }
            Prompt::DriverDetails(order) => {
                let mut text = if ru {
                    format!(
                        "Вы приняли заказ №{}\n{}\nПассажир: {}\nКонтакт: {}",
                        order.id.0,
                        route(order),
                        order.rider_display_name,
                        order.contact
                    )
                } else {
                    format!(
                        "You accepted order #{}\n{}\nRider: {}\nContact: {}",
                        order.id.0,
                        route(order),
                        order.rider_display_name,
                        order.contact
                    )
                };
                if !order.comment.is_empty() {
                    let _ = write!(text, "\n{}", order.comment);
                }
                text
            }
            Prompt::AlreadyTaken { order_id } => {
                if ru {
                    format!("Заказ №{} уже принят другим водителем", order_id.0)
                } else {
                    format!("Order #{} is already taken", order_id.0)
                }
            }
            Prompt::OrderNotFound { order_id } => {
                if ru {
                    format!("Заказ №{} не найден", order_id.0)
                } else {
                    format!("Order #{} not found", order_id.0)
                }
            }
        }
    }
}

fn route(order: &Order) -> String {
    format!("{} -> {}", order.pickup_text(), order.dropoff_text())
}

pub fn main_menu(locale: Locale) -> Keyboard {
    let labels: Vec<String> = Command::MENU
        .iter()
        .filter_map(|command| command.label(locale))
        .map(str::to_string)
        .collect();
    Keyboard::Reply(labels.chunks(2).map(<[String]>::to_vec).collect())
}

/// Shown while a request is being filled in.
pub fn cancel_request(locale: Locale) -> Keyboard {
    Keyboard::Reply(vec![vec![reset_label(locale)]])
}

/// Previously used contacts, one per row, above the cancel button.
pub fn contact_choices(locale: Locale, history: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<String>> = history.iter().map(|c| vec![c.clone()]).collect();
    rows.push(vec![reset_label(locale)]);
    Keyboard::Reply(rows)
}

pub fn comment_choices(locale: Locale) -> Keyboard {
    Keyboard::Reply(vec![
        vec![skip_label(locale).to_string()],
        vec![reset_label(locale)],
    ])
}

pub fn accept_button(order_id: OrderId, locale: Locale) -> Keyboard {
    let label = match locale {
        Locale::En => "Accept",
        Locale::Ru => "Принять",
    };
    Keyboard::Inline(vec![InlineButton {
        label: label.to_string(),
        payload: CallbackPayload::Accept { order_id },
    }])
}

fn reset_label(locale: Locale) -> String {
    Command::Reset
        .label(locale)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, RiderId};

    fn order() -> Order {
        let mut order = Order::new(OrderId(7), RiderId(1), "Anna");
        order.pickup = Some(Address::typed("Main St"));
        order.dropoff = Some(Address::typed("Oak Ave"));
        order.contact = "+1555".into();
        order.driver_name = "Ivan".into();
        order
    }

    #[test]
    fn banner_appends_driver_to_announcement() {
        let announcement = Prompt::Announcement(&order()).render(Locale::Ru);
        let banner = Prompt::AcceptedBanner {
            announcement: &announcement,
            driver_name: "Ivan",
        }
        .render(Locale::Ru);
        assert!(banner.starts_with("Новый заказ №7\nMain St -> Oak Ave"));
        assert!(banner.ends_with("Принят! Водитель: Ivan"));
    }

    #[test]
    fn announcement_includes_comment_only_when_present() {
        let mut order = order();
        assert_eq!(
            Prompt::Announcement(&order).render(Locale::En),
            "New order #7\nMain St -> Oak Ave"
        );
        order.comment = "two suitcases".into();
        assert!(Prompt::Announcement(&order)
            .render(Locale::En)
            .ends_with("two suitcases"));
    }

    #[test]
    fn main_menu_has_two_columns() {
        let Keyboard::Reply(rows) = main_menu(Locale::En) else {
            panic!("expected a reply keyboard");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Order a taxi", "Active orders"]);
        assert_eq!(rows[2], vec!["Contacts"]);
    }

    #[test]
    fn contact_choices_list_history_before_cancel() {
        let Keyboard::Reply(rows) = contact_choices(Locale::En, &["+1555".to_string()]) else {
            panic!("expected a reply keyboard");
        };
        assert_eq!(rows, vec![vec!["+1555".to_string()], vec!["Cancel request".to_string()]]);
    }

    #[test]
    fn accept_button_carries_structured_payload() {
        let Keyboard::Inline(buttons) = accept_button(OrderId(7), Locale::En) else {
            panic!("expected inline buttons");
        };
        assert_eq!(buttons[0].payload.to_string(), "accept:7");
    }
}
