use std::rc::Rc;

use crate::command_store::CommandStore;
use crate::session::CommandSlot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SlotSetting {
    pub(crate) slot: CommandSlot,
    pub(crate) enabled: bool,
    pub(crate) text: String,
}

/// Editable view of the three command slots, as a preferences dialog would hold it.
///
/// Disabling a slot removes its command right away. Text edits are buffered
/// until [`SettingsSync::commit`], which persists every enabled slot and then
/// re-reads the store so the view never shows values the store does not hold.
#[derive(Debug)]
pub(crate) struct SettingsSync {
    store: Rc<CommandStore>,
    records: [SlotSetting; 3],
}

impl SettingsSync {
    pub(crate) fn new(store: Rc<CommandStore>) -> Self {
        let records = CommandSlot::ALL.map(|slot| read_record(&store, slot));
        Self { store, records }
    }

    pub(crate) fn refresh(&mut self) {
        self.records = CommandSlot::ALL.map(|slot| read_record(&self.store, slot));
    }

    pub(crate) fn records(&self) -> &[SlotSetting] {
        &self.records
    }

    pub(crate) fn record(&self, slot: CommandSlot) -> &SlotSetting {
        &self.records[slot.index()]
    }

    pub(crate) fn set_enabled(&mut self, slot: CommandSlot, enabled: bool) -> Result<(), String> {
        if enabled {
            self.records[slot.index()].enabled = true;
            return Ok(());
        }

        self.store.remove(slot)?;
        let record = &mut self.records[slot.index()];
        record.enabled = false;
        record.text.clear();
        Ok(())
    }

    pub(crate) fn edit_text(&mut self, slot: CommandSlot, text: &str) -> Result<(), String> {
        let record = &mut self.records[slot.index()];
        if !record.enabled {
            return Err(format!(
                "Cannot edit the {} command while it is disabled.",
                slot
            ));
        }
        record.text = text.to_string();
        Ok(())
    }

    pub(crate) fn commit(&mut self) -> Result<(), String> {
        for record in self.records.iter().filter(|record| record.enabled) {
            self.store.set(record.slot, &record.text)?;
        }
        self.refresh();
        Ok(())
    }
}

fn read_record(store: &CommandStore, slot: CommandSlot) -> SlotSetting {
    match store.get(slot) {
        Some(text) => SlotSetting {
            slot,
            enabled: true,
            text,
        },
        None => SlotSetting {
            slot,
            enabled: false,
            text: String::new(),
        },
    }
}
