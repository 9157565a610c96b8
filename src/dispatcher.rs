use std::rc::Rc;

use crate::command_store::CommandStore;
use crate::event_bus::{EventBus, HandlerId};
use crate::logger::{output_excerpt, sanitize_log_value, Logger};
use crate::session::{LifecycleEvent, SessionPayload};
use crate::shell::CommandRunner;
use crate::template::interpolate;

/// What happened to one hook invocation. The event bus only sees [`HookOutcome::succeeded`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HookOutcome {
    NotConfigured,
    Succeeded,
    Failed,
}

impl HookOutcome {
    pub(crate) fn succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Binds lifecycle events to their configured shell command.
///
/// Every failure is absorbed here: the caller gets an outcome, never an error.
pub(crate) struct HookDispatcher {
    store: Rc<CommandStore>,
    runner: Box<dyn CommandRunner>,
    logger: Rc<Logger>,
}

impl HookDispatcher {
    pub(crate) fn new(
        store: Rc<CommandStore>,
        runner: Box<dyn CommandRunner>,
        logger: Rc<Logger>,
    ) -> Self {
        Self {
            store,
            runner,
            logger,
        }
    }

    pub(crate) fn fire(
        &self,
        event: LifecycleEvent,
        payload: Option<&SessionPayload>,
    ) -> HookOutcome {
        let slot = event.slot();
        self.logger
            .log_transition(&format!("hook start event={} slot={}", event, slot));
        let Some(template) = self.store.get(slot) else {
            self.logger.log_transition(&format!(
                "hook skip event={} slot={} reason=not_configured",
                event, slot
            ));
            return HookOutcome::NotConfigured;
        };

        let command = interpolate(&template, event, payload);
        let session = match payload {
            Some(payload) => format!(
                "type={} session={} duration={} pomodoros={}",
                payload.session_type,
                sanitize_log_value(&payload.id),
                payload.duration,
                payload.pomodoros
            ),
            None => "type=none".to_string(),
        };
        self.logger.log_transition(&format!(
            "cmd start event={} {} command={}",
            event,
            session,
            sanitize_log_value(&command)
        ));

        let output = match self.runner.run(&command) {
            Ok(output) => output,
            Err(err) => {
                self.logger.log_transition(&format!(
                    "cmd spawn_failed event={} err={}",
                    event,
                    sanitize_log_value(&err)
                ));
                return HookOutcome::Failed;
            }
        };

        if output.success() {
            self.logger.log_transition(&format!(
                "cmd exit event={} exit=0 output={}",
                event,
                sanitize_log_value(&output_excerpt(&output.output))
            ));
            return HookOutcome::Succeeded;
        }

        if output.timed_out {
            self.logger.log_transition(&format!(
                "cmd timeout event={} command={} output={}",
                event,
                sanitize_log_value(&command),
                sanitize_log_value(&output_excerpt(&output.output))
            ));
        } else {
            let exit = output
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            self.logger.log_transition(&format!(
                "cmd failed event={} command={} exit={} output={}",
                event,
                sanitize_log_value(&command),
                exit,
                sanitize_log_value(&output_excerpt(&output.output))
            ));
        }
        HookOutcome::Failed
    }

    /// Subscribes one handler per lifecycle event.
    pub(crate) fn activate(self: &Rc<Self>, bus: &mut EventBus) -> Vec<HandlerId> {
        LifecycleEvent::ALL
            .iter()
            .map(|&event| {
                let dispatcher = Rc::clone(self);
                bus.register(event, move |payload| {
                    dispatcher.fire(event, payload).succeeded()
                })
            })
            .collect()
    }

    pub(crate) fn deactivate(bus: &mut EventBus, handlers: &[HandlerId]) {
        for id in handlers {
            bus.disconnect(*id);
        }
    }
}
