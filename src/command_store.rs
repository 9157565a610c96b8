use std::cell::RefCell;
use std::rc::Rc;

use crate::config_store::ConfigStore;
use crate::logger::{sanitize_log_value, Logger};
use crate::session::CommandSlot;

pub(crate) const COMMAND_SECTION: &str = "exec_plugin";

/// Durable slot -> command mapping. Every value handed out is trimmed and non-empty.
#[derive(Debug)]
pub(crate) struct CommandStore {
    config: RefCell<ConfigStore>,
    logger: Rc<Logger>,
}

impl CommandStore {
    pub(crate) fn new(config: ConfigStore, logger: Rc<Logger>) -> Self {
        Self {
            config: RefCell::new(config),
            logger,
        }
    }

    pub(crate) fn get(&self, slot: CommandSlot) -> Option<String> {
        let config = self.config.borrow();
        let value = config.get(COMMAND_SECTION, slot.option_name())?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Stores the trimmed text; text that trims to nothing removes the slot instead.
    pub(crate) fn set(&self, slot: CommandSlot, text: &str) -> Result<(), String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self.remove(slot);
        }

        let mut config = self.config.borrow_mut();
        let previous = config
            .get(COMMAND_SECTION, slot.option_name())
            .map(str::to_string);
        config.set(COMMAND_SECTION, slot.option_name(), trimmed);
        if let Err(err) = config.save() {
            restore(&mut config, slot, previous);
            return Err(err);
        }
        self.logger.log_transition(&format!(
            "store set slot={} command={}",
            slot,
            sanitize_log_value(trimmed)
        ));
        Ok(())
    }

    pub(crate) fn remove(&self, slot: CommandSlot) -> Result<(), String> {
        let mut config = self.config.borrow_mut();
        if !config.has_option(COMMAND_SECTION, slot.option_name()) {
            return Ok(());
        }
        let previous = config
            .get(COMMAND_SECTION, slot.option_name())
            .map(str::to_string);
        config.remove(COMMAND_SECTION, slot.option_name());
        if let Err(err) = config.save() {
            restore(&mut config, slot, previous);
            return Err(err);
        }
        self.logger
            .log_transition(&format!("store remove slot={}", slot));
        Ok(())
    }
}

/// Puts back the in-memory value a failed save was about to replace.
fn restore(config: &mut ConfigStore, slot: CommandSlot, previous: Option<String>) {
    match previous {
        Some(value) => config.set(COMMAND_SECTION, slot.option_name(), &value),
        None => {
            config.remove(COMMAND_SECTION, slot.option_name());
        }
    }
}
