use super::actions::SessionAction;
use super::error::SessionError;
use crate::model::{RiderId, Session, SessionCreate, SessionQuery, SessionUpdate, Step};
use async_trait::async_trait;
use resource_actor::ActorEntity;

impl Session {
    /// Applies one step transition. On `Err` the session is unchanged.
    pub fn apply(&mut self, action: SessionAction) -> Result<(), SessionError> {
        let from = self.current_step;
        match action {
            SessionAction::BeginOrder(order_id) => {
                self.require(Step::Idle, "begin an order")?;
                self.current_step = Step::AwaitingPickup;
                self.active_order_id = Some(order_id);
            }
            SessionAction::Advance => {
                let next = from.next_order_step().ok_or(SessionError::InvalidTransition {
                    from,
                    action: "advance",
                })?;
                self.current_step = next;
            }
            SessionAction::CompleteOrder { contact } => {
                self.require(Step::AwaitingComment, "complete the order")?;
                self.current_step = Step::Idle;
                self.active_order_id = None;
                let contact = contact.trim();
                if !contact.is_empty() && !self.contact_history.iter().any(|c| c == contact) {
                    self.contact_history.push(contact.to_string());
                }
            }
            SessionAction::BeginQuestion => {
                self.require(Step::Idle, "ask a question")?;
                self.current_step = Step::AwaitingFreeformQuestion;
            }
            SessionAction::FinishQuestion => {
                self.require(Step::AwaitingFreeformQuestion, "finish the question")?;
                self.current_step = Step::Idle;
            }
            SessionAction::Reset => {
                self.current_step = Step::Idle;
                self.active_order_id = None;
            }
        }
        Ok(())
    }

    fn require(&self, step: Step, action: &'static str) -> Result<(), SessionError> {
        if self.current_step == step {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.current_step,
                action,
            })
        }
    }
}

#[async_trait]
impl ActorEntity for Session {
    type Id = RiderId;
    type Create = SessionCreate;
    type Update = SessionUpdate;
    type Action = SessionAction;
    type ActionResult = Session;
    type Query = SessionQuery;
    type Context = ();
    type Error = SessionError;

    fn id(&self) -> &RiderId {
        &self.rider_id
    }

    /// Sessions are keyed by the rider, not by a sequence.
    fn next_id(_last: Option<&RiderId>, params: &SessionCreate) -> RiderId {
        params.rider_id
    }

    fn from_create_params(_id: RiderId, params: SessionCreate) -> Result<Self, Self::Error> {
        Ok(Session::new(params))
    }

    fn matches(&self, query: &SessionQuery) -> bool {
        match query {
            SessionQuery::All => true,
            SessionQuery::AtStep(step) => self.current_step == *step,
        }
    }

    async fn on_update(
        &mut self,
        update: SessionUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(link) = update.profile_link {
            self.profile_link = link;
        }
        if let Some(locale) = update.locale {
            self.locale = locale;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: SessionAction,
        _ctx: &Self::Context,
    ) -> Result<Session, Self::Error> {
        self.apply(action)?;
        Ok(self.clone())
    }
}
