//! # Conversation State Machine
//!
//! Turns one inbound rider event plus the rider's [`Session`] into store mutations and the
//! replies to send. Steps run `idle -> pickup -> dropoff -> contact -> comment -> idle`; a
//! freeform question is a one-message side trip from `idle`.
//!
//! The machine holds no state of its own. Everything it needs to interpret the next message is
//! in the session store, and everything it produces is returned as [`Envelope`]s.

pub mod input;
pub mod prompts;

pub use input::Command;
pub use prompts::Prompt;

use crate::clients::{OrderClient, SessionClient};
use crate::error::DispatchError;
use crate::model::{
    Address, ChatId, GeoPoint, Locale, OrderCreate, OrderId, OrderStatus, OrderUpdate, Session,
    SessionCreate, SessionUpdate, Step,
};
use crate::order_actor::OrderError;
use crate::session_actor::SessionError;
use crate::transport::{
    ChatTransport, Geocoded, Geocoder, Keyboard, OutboundMessage, RiderPayload, RiderProfile,
    RiderUpdate,
};
use resource_actor::ActorClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// An outbound message and the chat it goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub target: ChatId,
    pub message: OutboundMessage,
}

pub struct ConversationMachine {
    orders: OrderClient,
    sessions: SessionClient,
    geocoder: Arc<dyn Geocoder>,
    admin_channel: ChatId,
    default_locale: Locale,
}

impl ConversationMachine {
    pub fn new(
        orders: OrderClient,
        sessions: SessionClient,
        geocoder: Arc<dyn Geocoder>,
        admin_channel: ChatId,
        default_locale: Locale,
    ) -> Self {
        Self {
            orders,
            sessions,
            geocoder,
            admin_channel,
            default_locale,
        }
    }

    /// Handles one rider event and returns the replies to deliver, in order.
    ///
    /// Invalid input is answered with a clarifying prompt and changes nothing. Store failures
    /// abort the step and come back as `Err`; whatever was written before the failure is a
    /// complete single-record change.
    #[instrument(skip(self, update), fields(rider_id = %update.profile.rider_id))]
    pub async fn handle(&self, update: RiderUpdate) -> Result<Vec<Envelope>, DispatchError> {
        let RiderUpdate { profile, payload } = update;
        let session = self
            .sessions
            .ensure(SessionCreate {
                rider_id: profile.rider_id,
                display_name: profile.display_name.clone(),
                profile_link: profile.profile_link.clone(),
                locale: self.default_locale,
            })
            .await?;
        debug!(step = %session.current_step, "Session loaded");

        match payload {
            RiderPayload::Text(text) => match Command::parse(&text) {
                Some(command) if session.is_idle() || command.interrupts() => {
                    self.run_command(command, &session, &profile).await
                }
                Some(command) => {
                    debug!(?command, "Command ignored while a request is in progress");
                    Ok(vec![reply(&session, Prompt::StepInProgress, Keyboard::Keep)])
                }
                None if input::is_unknown_command(&text) => {
                    debug!("Unknown command");
                    Ok(unknown_command(&session))
                }
                None => self.handle_text(&session, &profile, text.trim()).await,
            },
            RiderPayload::Location(point) => self.handle_location(&session, point).await,
        }
    }

    async fn run_command(
        &self,
        command: Command,
        session: &Session,
        profile: &RiderProfile,
    ) -> Result<Vec<Envelope>, DispatchError> {
        let rider_id = session.rider_id;
        let locale = session.locale;
        info!(?command, "Running command");

        match command {
            Command::Start => {
                if !session.is_idle() {
                    self.sessions.reset(rider_id).await?;
                }
                let session = self
                    .sessions
                    .refresh_profile(
                        rider_id,
                        SessionUpdate {
                            display_name: Some(profile.display_name.clone()),
                            profile_link: Some(profile.profile_link.clone()),
                            locale: None,
                        },
                    )
                    .await?;
                let welcome = Prompt::Welcome {
                    name: &session.display_name,
                };
                Ok(vec![reply(&session, welcome, prompts::main_menu(locale))])
            }
            Command::Stop => {
                self.sessions.delete(rider_id).await?;
                info!("Session removed");
                Ok(vec![reply(session, Prompt::Farewell, Keyboard::Remove)])
            }
            Command::Reset => {
                if !session.is_idle() {
                    self.sessions.reset(rider_id).await?;
                    if let Some(order_id) = session.active_order_id {
                        info!(%order_id, "Request abandoned");
                    }
                }
                Ok(vec![reply(session, Prompt::RequestReset, prompts::main_menu(locale))])
            }
            Command::OrderRide => {
                let order_id = self
                    .orders
                    .create_order(OrderCreate {
                        rider_id,
                        rider_display_name: session.display_name.clone(),
                    })
                    .await?;
                self.sessions.begin_order(rider_id, order_id).await?;
                info!(%order_id, "Order started");
                Ok(vec![reply(
                    session,
                    Prompt::AskPickup,
                    prompts::cancel_request(locale),
                )])
            }
            Command::ActiveOrders => {
                let open = self.orders.rider_orders(rider_id, OrderStatus::Open).await?;
                let prompt = if open.is_empty() {
                    Prompt::NoActiveOrders
                } else {
                    Prompt::ActiveOrders(&open)
                };
                Ok(vec![reply(session, prompt, Keyboard::Keep)])
            }
            // Each order is declined on its own. If the store fails part way, the rider is
            // told how many went through; sending /cancel again declines the rest.
            Command::CancelOrders => {
                let open = self.orders.rider_orders(rider_id, OrderStatus::Open).await?;
                let mut cancelled = 0;
                for order in &open {
                    match self.orders.decline(order.id).await {
                        Ok(true) => {
                            info!(order_id = %order.id, "Order declined by rider");
                            cancelled += 1;
                        }
                        Ok(false) => {}
                        Err(e) if cancelled > 0 => {
                            warn!(order_id = %order.id, error = %e, cancelled, "Cancel interrupted");
                            return Ok(vec![
                                reply(session, Prompt::OrdersCancelled(cancelled), Keyboard::Keep),
                                reply(session, Prompt::TemporaryFailure, Keyboard::Keep),
                            ]);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                let prompt = if cancelled == 0 {
                    Prompt::NoOrdersToCancel
                } else {
                    Prompt::OrdersCancelled(cancelled)
                };
                Ok(vec![reply(session, prompt, Keyboard::Keep)])
            }
            Command::AskQuestion => {
                self.sessions.begin_question(rider_id).await?;
                Ok(vec![reply(
                    session,
                    Prompt::AskQuestion,
                    prompts::cancel_request(locale),
                )])
            }
            Command::About => Ok(vec![reply(session, Prompt::About, Keyboard::Keep)]),
        }
    }

    async fn handle_text(
        &self,
        session: &Session,
        profile: &RiderProfile,
        text: &str,
    ) -> Result<Vec<Envelope>, DispatchError> {
        let step = session.current_step;
        if step == Step::Idle {
            debug!("Unrecognized input");
            return Ok(vec![reply(
                session,
                Prompt::Unrecognized,
                prompts::main_menu(session.locale),
            )]);
        }
        // An empty comment is a valid answer; every other step needs text.
        if text.is_empty() && step != Step::AwaitingComment {
            return Ok(vec![ask_again(session)]);
        }

        match step {
            Step::AwaitingFreeformQuestion => self.forward_question(session, profile, text).await,
            Step::AwaitingPickup | Step::AwaitingDropoff => {
                self.fill_address(session, Address::typed(text)).await
            }
            Step::AwaitingContact => {
                let order_id = active_order(session)?;
                self.orders
                    .update_fields(
                        order_id,
                        OrderUpdate {
                            contact: Some(text.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
                let session = self.sessions.advance(session.rider_id).await?;
                Ok(vec![ask_again(&session)])
            }
            Step::AwaitingComment => {
                let comment = if text.is_empty() || input::is_skip(text) {
                    ""
                } else {
                    text
                };
                self.submit(session, comment).await
            }
            Step::Idle => Ok(Vec::new()),
        }
    }

    async fn handle_location(
        &self,
        session: &Session,
        point: GeoPoint,
    ) -> Result<Vec<Envelope>, DispatchError> {
        match session.current_step {
            Step::AwaitingPickup | Step::AwaitingDropoff => {
                let text = match self.geocoder.resolve_address(point).await {
                    Geocoded::Address(text) => text,
                    Geocoded::Unresolved => {
                        debug!(%point, "Location not resolved");
                        Prompt::AddressNotFound.render(session.locale)
                    }
                };
                self.fill_address(session, Address::located(text, point)).await
            }
            Step::Idle => Ok(vec![reply(
                session,
                Prompt::Unrecognized,
                prompts::main_menu(session.locale),
            )]),
            _ => Ok(vec![reply(session, Prompt::ExpectedText, Keyboard::Keep)]),
        }
    }

    /// Writes pickup or dropoff, whichever the session is waiting for, and moves on.
    async fn fill_address(
        &self,
        session: &Session,
        address: Address,
    ) -> Result<Vec<Envelope>, DispatchError> {
        let order_id = active_order(session)?;
        let update = if session.current_step == Step::AwaitingPickup {
            OrderUpdate {
                pickup: Some(address),
                ..Default::default()
            }
        } else {
            OrderUpdate {
                dropoff: Some(address),
                ..Default::default()
            }
        };
        self.orders.update_fields(order_id, update).await?;
        let session = self.sessions.advance(session.rider_id).await?;
        Ok(vec![ask_again(&session)])
    }

    /// Last step: stores the comment, opens the order and returns the rider to `idle`.
    async fn submit(&self, session: &Session, comment: &str) -> Result<Vec<Envelope>, DispatchError> {
        let order_id = active_order(session)?;
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        // A retry after a failed session write finds the order already open.
        let contact = if order.status == OrderStatus::New {
            let order = self
                .orders
                .update_fields(
                    order_id,
                    OrderUpdate {
                        comment: Some(comment.to_string()),
                        ..Default::default()
                    },
                )
                .await?;
            self.orders.publish(order_id).await?;
            info!(%order_id, "Order published");
            order.contact
        } else {
            order.contact
        };

        self.sessions
            .complete_order(session.rider_id, contact)
            .await?;
        Ok(vec![reply(
            session,
            Prompt::OrderSubmitted { order_id },
            prompts::main_menu(session.locale),
        )])
    }

    async fn forward_question(
        &self,
        session: &Session,
        profile: &RiderProfile,
        text: &str,
    ) -> Result<Vec<Envelope>, DispatchError> {
        let question = Prompt::QuestionToAdmin {
            name: &profile.display_name,
            profile: profile.profile_link.as_deref(),
            text,
        };
        let to_admin = Envelope {
            target: self.admin_channel,
            message: OutboundMessage::text(format!(
                "[{}] {}",
                session.rider_id,
                question.render(self.default_locale)
            )),
        };
        self.sessions.finish_question(session.rider_id).await?;
        info!("Question forwarded");
        Ok(vec![
            to_admin,
            reply(
                session,
                Prompt::QuestionForwarded,
                prompts::main_menu(session.locale),
            ),
        ])
    }

    /// Consumes rider updates until the inbox closes, delivering each reply in order.
    pub async fn listen(
        self,
        transport: Arc<dyn ChatTransport>,
        mut inbox: mpsc::Receiver<RiderUpdate>,
    ) {
        info!("Rider listener started");
        while let Some(update) = inbox.recv().await {
            let chat = update.profile.rider_id.chat();
            let envelopes = match self.handle(update).await {
                Ok(envelopes) => envelopes,
                Err(e) => {
                    error!(%chat, error = %e, "Failed to handle rider update");
                    vec![Envelope {
                        target: chat,
                        message: OutboundMessage::text(
                            Prompt::TemporaryFailure.render(self.default_locale),
                        ),
                    }]
                }
            };
            for Envelope { target, message } in envelopes {
                if let Err(e) = transport.deliver(target, message).await {
                    warn!(%target, error = %e, "Reply not delivered");
                }
            }
        }
        info!("Rider listener stopped");
    }
}

fn active_order(session: &Session) -> Result<OrderId, SessionError> {
    session
        .active_order_id
        .ok_or(SessionError::InvalidTransition {
            from: session.current_step,
            action: "fill in an order without one",
        })
}

fn reply(session: &Session, prompt: Prompt<'_>, keyboard: Keyboard) -> Envelope {
    Envelope {
        target: session.rider_id.chat(),
        message: OutboundMessage::text(prompt.render(session.locale)).with_keyboard(keyboard),
    }
}

/// Unknown slash commands are never stored as answers; the current question is repeated.
fn unknown_command(session: &Session) -> Vec<Envelope> {
    if session.is_idle() {
        return vec![ask_again(session)];
    }
    vec![
        reply(session, Prompt::Unrecognized, Keyboard::Keep),
        ask_again(session),
    ]
}

/// The prompt for whatever the session is waiting for now.
fn ask_again(session: &Session) -> Envelope {
    let locale = session.locale;
    match session.current_step {
        Step::Idle => reply(session, Prompt::Unrecognized, prompts::main_menu(locale)),
        Step::AwaitingPickup => reply(session, Prompt::AskPickup, prompts::cancel_request(locale)),
        Step::AwaitingDropoff => reply(session, Prompt::AskDropoff, prompts::cancel_request(locale)),
        Step::AwaitingContact => reply(
            session,
            Prompt::AskContact,
            prompts::contact_choices(locale, &session.contact_history),
        ),
        Step::AwaitingComment => reply(session, Prompt::AskComment, prompts::comment_choices(locale)),
        Step::AwaitingFreeformQuestion => {
            reply(session, Prompt::AskQuestion, prompts::cancel_request(locale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RiderId;
    use crate::transport::NoopGeocoder;
    use crate::{order_actor, session_actor};

    fn profile() -> RiderProfile {
        RiderProfile {
            rider_id: RiderId(10),
            display_name: "Anna".into(),
            profile_link: Some("@anna".into()),
        }
    }

    fn machine() -> ConversationMachine {
        let (order_actor, orders) = order_actor::new(8);
        let (session_actor, sessions) = session_actor::new(8);
        tokio::spawn(order_actor.run(()));
        tokio::spawn(session_actor.run(()));
        ConversationMachine::new(orders, sessions, Arc::new(NoopGeocoder), ChatId(-99), Locale::En)
    }

    #[tokio::test]
    async fn first_message_creates_the_session() {
        let machine = machine();
        let replies = machine
            .handle(RiderUpdate::text(profile(), "hello"))
            .await
            .unwrap();

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].target, ChatId(10));
        assert_eq!(replies[0].message.text, "I don't know that command.");
        let session = machine.sessions.get(RiderId(10)).await.unwrap().unwrap();
        assert_eq!(session.display_name, "Anna");
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn commands_are_held_back_mid_request() {
        let machine = machine();
        machine
            .handle(RiderUpdate::text(profile(), "/order"))
            .await
            .unwrap();
        let replies = machine
            .handle(RiderUpdate::text(profile(), "Active orders"))
            .await
            .unwrap();

        assert!(replies[0].message.text.starts_with("Please finish"));
        let session = machine.sessions.get(RiderId(10)).await.unwrap().unwrap();
        assert_eq!(session.current_step, Step::AwaitingPickup);
    }

    #[tokio::test]
    async fn blank_answer_repeats_the_question() {
        let machine = machine();
        machine
            .handle(RiderUpdate::text(profile(), "/order"))
            .await
            .unwrap();
        let replies = machine
            .handle(RiderUpdate::text(profile(), "   "))
            .await
            .unwrap();

        assert!(replies[0].message.text.starts_with("Where should we pick you up?"));
        let session = machine.sessions.get(RiderId(10)).await.unwrap().unwrap();
        assert_eq!(session.current_step, Step::AwaitingPickup);
    }
}
