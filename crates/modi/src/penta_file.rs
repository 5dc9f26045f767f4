use crate::common::{describe_command, expect_args, item_key};
use sylladex_core::fuzzy::find_closest;
use sylladex_core::{
    Card, CommandError, CommandResult, ConfigError, Continuation, InventoryView, Modus,
    ModusBuffer, ModusDescriptor,
};

pub const FOLDER_NAMES: [&str; 5] = ["weapons", "survival", "misc", "info", "keyCritical"];
pub const FOLDER_SIZE: usize = 5;
pub const PENTA_CAPACITY: usize = FOLDER_NAMES.len() * FOLDER_SIZE;

const MANUAL_LOAD_STEP: &str = "manualLoad";

type Folder = [Card; FOLDER_SIZE];

fn empty_folder() -> Folder {
    std::array::from_fn(|_| Card::empty())
}

/// Five named folders of five cards each. Overfilling a folder ejects its
/// contents into the open hand.
#[derive(Debug, Clone)]
pub struct PentaFile {
    folders: [Folder; 5],
}

impl Default for PentaFile {
    fn default() -> Self {
        Self {
            folders: std::array::from_fn(|_| empty_folder()),
        }
    }
}

impl PentaFile {
    pub fn folder(&self, name: &str) -> Option<&[Card]> {
        self.folder_index(name).map(|idx| &self.folders[idx][..])
    }

    pub fn folder_index(&self, name: &str) -> Option<usize> {
        FOLDER_NAMES
            .iter()
            .position(|folder| folder.eq_ignore_ascii_case(name.trim()))
    }

    fn require_folder(&self, name: &str) -> Result<usize, CommandError> {
        self.folder_index(name)
            .ok_or_else(|| CommandError::runtime(format!("'{name}' is not a valid folder")))
    }

    fn slots(&self) -> impl Iterator<Item = &Card> + '_ {
        self.folders.iter().flat_map(|folder| folder.iter())
    }

    fn slot_mut(&mut self, position: usize) -> &mut Card {
        &mut self.folders[position / FOLDER_SIZE][position % FOLDER_SIZE]
    }

    fn reset(&mut self) {
        self.folders = std::array::from_fn(|_| empty_folder());
    }

    /// Puts `card` in the first free slot, folder by folder.
    fn add_card(&mut self, card: Card) -> bool {
        let Some(position) = self.slots().position(|slot| !slot.in_use()) else {
            return false;
        };
        *self.slot_mut(position) = card;
        true
    }

    /// Files `card` into one folder. A full folder is emptied into the open
    /// hand first and the card takes its first slot.
    fn file_into(&mut self, card: Card, folder: usize, buffer: &mut ModusBuffer) {
        let target = &mut self.folders[folder];
        if let Some(slot) = target.iter_mut().find(|slot| !slot.in_use()) {
            *slot = card;
            return;
        }
        let ejected = std::mem::replace(target, empty_folder());
        tracing::info!(folder = FOLDER_NAMES[folder], "folder overfilled; ejecting");
        for old in ejected.iter().filter(|old| old.in_use()) {
            buffer.open_hand().push(old.item());
        }
        target[0] = card;
    }

    fn take_by_name(&mut self, item: &str) -> Option<Card> {
        let position = self.slots().position(|slot| slot.in_use() && slot.item() == item)?;
        Some(std::mem::take(self.slot_mut(position)))
    }

    fn save_command(&mut self, _args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        Modus::save(self, buffer);
        buffer.mark_changed();
        buffer.writeln("Deck was saved to sylladex.");
        Ok(())
    }

    fn load_command(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        if args.len() > 1 {
            return Err(CommandError::arg_count(args.len()));
        }
        buffer.set_modus_input(args.first().cloned().unwrap_or_default());
        Modus::load(self, buffer)
    }

    fn capture(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 1)?;
        let item = &args[0];
        buffer.write(&format!("Attempting to capture {item}..."));
        let card = Card::new(item)
            .map_err(|_| CommandError::runtime(format!("item '{item}' created invalid card")))?;
        if !self.add_card(card) {
            return Err(CommandError::runtime(
                "cannot capture at this time. no free space for item",
            ));
        }
        buffer.mark_changed();
        buffer.writeln("success.");
        Ok(())
    }

    fn capture_by_folder(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 2)?;
        let (item, folder_name) = (&args[0], &args[1]);
        buffer.write(&format!(
            "Capturing {item} and placing into folder {folder_name}..."
        ));
        let folder = self.require_folder(folder_name)?;
        let card = Card::new(item)
            .map_err(|_| CommandError::runtime(format!("item '{item}' created invalid card")))?;
        self.file_into(card, folder, buffer);
        buffer.mark_changed();
        buffer.writeln("success.");
        Ok(())
    }

    fn take_out_card(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 2)?;
        let (index, folder_name) = (&args[0], &args[1]);
        buffer.write(&format!(
            "Retrieving CARD at index {index} in folder {folder_name}..."
        ));
        let position: usize = index
            .parse()
            .map_err(|_| CommandError::runtime(format!("{index} is not a number")))?;
        let folder = self.require_folder(folder_name)?;
        if !(1..=FOLDER_SIZE).contains(&position) {
            return Err(CommandError::runtime(format!("{index} is not a valid index")));
        }
        let card = std::mem::take(&mut self.folders[folder][position - 1]);
        if card.in_use() {
            buffer.open_hand().push(card.item());
            buffer.mark_changed();
        }
        buffer.writeln("success.");
        Ok(())
    }

    fn take_out_card_by_name(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 1)?;
        let wanted = item_key(&args[0]);
        buffer.write(&format!("Retrieving {wanted}..."));
        let card = match self.take_by_name(&wanted) {
            Some(card) => card,
            None => {
                let items: Vec<String> = self
                    .slots()
                    .filter(|slot| slot.in_use())
                    .map(|slot| slot.item().to_string())
                    .collect();
                let hit = find_closest(&items, &wanted).ok_or_else(|| {
                    CommandError::runtime(format!("item '{wanted}' does not exist"))
                })?;
                buffer.write(&format!("assuming `{}`...", hit.name));
                self.take_by_name(&hit.name).ok_or_else(|| {
                    CommandError::runtime(format!("item '{wanted}' does not exist"))
                })?
            }
        };
        buffer.open_hand().push(card.item());
        buffer.mark_changed();
        buffer.writeln("success.");
        Ok(())
    }

    fn help(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        describe_command(self, args, buffer)
    }

    fn not_understood(&mut self, _args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        buffer.writeln("command entered not understood.");
        Ok(())
    }

    fn load_by_mode(&mut self, mode: u8, buffer: &mut ModusBuffer) -> CommandResult {
        self.reset();
        let deck = buffer.deck().snapshot();
        match mode {
            0 => {}
            1 => {
                for (position, card) in deck.iter().take(PENTA_CAPACITY).enumerate() {
                    *self.slot_mut(position) = card.clone();
                }
                if deck.len() > PENTA_CAPACITY {
                    tracing::warn!(cards = deck.len(), "deck larger than the PentaFile");
                    buffer.write("sylladex deck is larger than modus deck, remaining cards were ignored...");
                }
            }
            2 => {
                let pending: Vec<String> = deck
                    .iter()
                    .filter(|card| card.is_valid() && card.in_use())
                    .map(|card| card.item().to_string())
                    .collect();
                if !pending.is_empty() {
                    buffer.writeln("manual loading.");
                    self.ask_folder(pending, buffer);
                    return Ok(());
                }
            }
            3 => {
                for card in deck.into_iter().filter(Card::in_use) {
                    if !(card.is_valid() && self.add_card(card)) {
                        break;
                    }
                }
            }
            _ => {
                return Err(CommandError::runtime(format!(
                    "{mode} is not a valid loading mode"
                )))
            }
        }
        buffer.mark_changed();
        buffer.writeln("success.");
        Ok(())
    }

    fn ask_folder(&self, pending: Vec<String>, buffer: &mut ModusBuffer) {
        if let Some(item) = pending.first() {
            buffer.writeln(&format!(
                "Please select a folder to save \"{item}\" into: {}, skip or cancel.",
                FOLDER_NAMES.join(", ")
            ));
        }
        buffer.set_redirector(Continuation::Step {
            step: MANUAL_LOAD_STEP.to_string(),
            data: pending,
        });
    }

    fn manual_load(&mut self, data: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        let Some((item, rest)) = data.split_first() else {
            return Ok(());
        };
        let answer = buffer.take_modus_input();
        let answer = answer.trim().trim_matches('`');
        if answer.eq_ignore_ascii_case("cancel") {
            buffer.writeln("Manual loading cancelled.");
            buffer.mark_changed();
            return Ok(());
        }
        if !answer.eq_ignore_ascii_case("skip") {
            let Some(folder) = self.folder_index(answer) else {
                buffer.writeln(&format!("`{answer}` is not a folder."));
                self.ask_folder(data.to_vec(), buffer);
                return Ok(());
            };
            let card = Card::new(item)
                .map_err(|_| CommandError::runtime(format!("item '{item}' created invalid card")))?;
            self.file_into(card, folder, buffer);
        }
        if rest.is_empty() {
            buffer.writeln("Manual loading finished.");
            buffer.mark_changed();
        } else {
            self.ask_folder(rest.to_vec(), buffer);
        }
        Ok(())
    }
}

impl Modus for PentaFile {
    const RUNNABLE: bool = true;

    fn create() -> Result<Self, ConfigError> {
        Ok(Self::default())
    }

    fn descriptor(&self) -> Result<ModusDescriptor<Self>, ConfigError> {
        Ok(ModusDescriptor::<Self>::new("PentaFile")
            .command(
                "save",
                PentaFile::save_command,
                "syntax: save\n\u{2022} saves the current inventory to the sylladex's deck.",
            )?
            .command(
                "load",
                PentaFile::load_command,
                "syntax: load [mode]\n\u{2022} loads the inventory from the sylladex, which may differ.\
                 \n\u{2022} mode 0 will simply reset the inventory.\
                 \n\u{2022} mode 1 will auto load the inventory, based on CARD positions in the deck.\
                 \n\u{2022} mode 2 will manually load the inv. you will choose where items go.\
                 \n\u{2022} mode 3 will fast load the inventory. disregards saved CARD positions.",
            )?
            .command(
                "capture",
                PentaFile::capture,
                "syntax: capture <item>\n\u{2022} captchalogues the item into the first available spot.",
            )?
            .command(
                "takeOutCard",
                PentaFile::take_out_card,
                "syntax: takeOutCard <index>, <folder>\n\u{2022} takes out the CARD at the index \
                 within the folder. index is from 1 to 5.",
            )?
            .command(
                "captureByFolder",
                PentaFile::capture_by_folder,
                "syntax: captureByFolder <item>, <folder>\n\u{2022} captchalogues the item into \
                 the specified folder. a full folder is ejected first.",
            )?
            .command(
                "takeOutCardByName",
                PentaFile::take_out_card_by_name,
                "syntax: takeOutCardByName <item>\n\u{2022} takes out the CARD holding the named item.",
            )?
            .command(
                "help",
                PentaFile::help,
                "syntax: help <command>\n\u{2022} describes the given command. arguments of a \
                 command are separated by commas.",
            )?
            .fallback(PentaFile::not_understood, "ERROR"))
    }

    fn load(&mut self, buffer: &mut ModusBuffer) -> CommandResult {
        let input = buffer.take_modus_input();
        let mode = input.trim();
        if mode.is_empty() {
            buffer.writeln("Please submit a loading mode number: `0`, `1`, `2`, or `3`.");
            buffer.set_redirector(Continuation::Load);
            return Ok(());
        }
        buffer.write(&format!("Loading from sylladex deck in mode `{mode}`..."));
        let mode: u8 = mode
            .parse()
            .map_err(|_| CommandError::runtime(format!("{mode} is not a number")))?;
        self.load_by_mode(mode, buffer)
    }

    fn to_deck(&self) -> Vec<Card> {
        self.slots().cloned().collect()
    }

    fn draw_to_display(&mut self, buffer: &mut ModusBuffer) {
        let view = FOLDER_NAMES
            .iter()
            .zip(self.folders.iter())
            .fold(InventoryView::new("PentaFile"), |view, (name, folder)| {
                view.with_group(*name, folder.to_vec())
            });
        buffer.show(view);
    }

    fn description(&self) -> String {
        "The PentaFile Fetch Modus is designed to simulate a Filing Cabinet.\n\
         It comprises 5 folders that each store exactly 5 cards. You can store items to a \
         specific folder or retrieve from either just the item name or from a folder and index.\n\
         The notable quirk of this modus is that if a 6th item is placed into a filled folder, \
         the contents of the folder will be ejected to the sylladex and then the 6th item will \
         be placed into the now empty folder."
            .to_string()
    }

    fn resume(&mut self, step: &str, data: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        match step {
            MANUAL_LOAD_STEP => self.manual_load(data, buffer),
            other => Err(CommandError::fatal(format!(
                "PentaFile cannot resume step `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylladex_core::{DisplayBuffer, TextLog};

    fn buffer() -> (ModusBuffer, TextLog) {
        let log = TextLog::new();
        (ModusBuffer::new(DisplayBuffer::new(), log.clone()), log)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn card(item: &str) -> Card {
        Card::new(item).expect("card")
    }

    #[test]
    fn capture_fills_folders_in_order() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        for idx in 0..6 {
            modus
                .capture(&args(&[&format!("item{idx}")]), &mut buffer)
                .expect("capture");
        }
        assert_eq!(modus.folder("weapons").map(|f| f[4].item().to_string()), Some("ITEM4".into()));
        assert_eq!(modus.folder("survival").map(|f| f[0].item().to_string()), Some("ITEM5".into()));
        assert_eq!(modus.to_deck().len(), PENTA_CAPACITY);
    }

    #[test]
    fn capture_into_full_modus_fails() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        for idx in 0..PENTA_CAPACITY {
            modus
                .capture(&args(&[&format!("item{idx}")]), &mut buffer)
                .expect("capture");
        }
        let err = modus.capture(&args(&["straw"]), &mut buffer).unwrap_err();
        assert_eq!(
            err,
            CommandError::runtime("cannot capture at this time. no free space for item")
        );
    }

    #[test]
    fn overfilled_folder_ejects_into_hand() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        for idx in 0..FOLDER_SIZE {
            modus
                .capture_by_folder(&args(&[&format!("tool{idx}"), "misc"]), &mut buffer)
                .expect("capture");
        }
        assert!(buffer.open_hand().is_empty());
        modus
            .capture_by_folder(&args(&["hammer", "MISC"]), &mut buffer)
            .expect("capture");
        assert_eq!(buffer.open_hand().len(), FOLDER_SIZE);
        let misc = modus.folder("misc").expect("folder");
        assert_eq!(misc[0], card("hammer"));
        assert!(misc[1..].iter().all(|slot| !slot.in_use()));
    }

    #[test]
    fn unknown_folder_is_a_runtime_error() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        let err = modus
            .capture_by_folder(&args(&["hammer", "drawer"]), &mut buffer)
            .unwrap_err();
        assert_eq!(err, CommandError::runtime("'drawer' is not a valid folder"));
    }

    macro_rules! take_out_error_case {
        ($name:ident, $index:expr, $folder:expr, $message:expr) => {
            #[test]
            fn $name() {
                let (mut buffer, _) = buffer();
                let mut modus = PentaFile::default();
                let err = modus
                    .take_out_card(&args(&[$index, $folder]), &mut buffer)
                    .unwrap_err();
                assert_eq!(err, CommandError::runtime($message));
            }
        };
    }

    take_out_error_case!(take_out_not_a_number, "two", "info", "two is not a number");
    take_out_error_case!(take_out_index_zero, "0", "info", "0 is not a valid index");
    take_out_error_case!(take_out_index_six, "6", "info", "6 is not a valid index");
    take_out_error_case!(take_out_bad_folder, "1", "attic", "'attic' is not a valid folder");

    #[test]
    fn take_out_card_moves_item_to_hand() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        modus
            .capture_by_folder(&args(&["map", "info"]), &mut buffer)
            .expect("capture");
        modus
            .take_out_card(&args(&["1", "info"]), &mut buffer)
            .expect("take");
        assert_eq!(buffer.open_hand().snapshot(), vec!["MAP".to_string()]);
        modus
            .take_out_card(&args(&["1", "info"]), &mut buffer)
            .expect("empty slot is fine");
        assert_eq!(buffer.open_hand().len(), 1);
    }

    #[test]
    fn take_out_by_name_falls_back_to_nearest_item() {
        let (mut buffer, log) = buffer();
        let mut modus = PentaFile::default();
        modus.capture(&args(&["compass"]), &mut buffer).expect("capture");
        modus
            .take_out_card_by_name(&args(&["compas"]), &mut buffer)
            .expect("take");
        assert_eq!(buffer.open_hand().snapshot(), vec!["COMPASS".to_string()]);
        assert!(log.contents().contains("assuming `COMPASS`"));
        let err = modus
            .take_out_card_by_name(&args(&["compass"]), &mut buffer)
            .unwrap_err();
        assert_eq!(err, CommandError::runtime("item 'COMPASS' does not exist"));
    }

    #[test]
    fn load_without_mode_parks_a_continuation() {
        let (mut buffer, log) = buffer();
        let mut modus = PentaFile::default();
        modus.load(&mut buffer).expect("load");
        assert_eq!(buffer.pending(), Some(&Continuation::Load));
        assert!(log.contents().contains("Please submit a loading mode number"));
    }

    macro_rules! load_mode_case {
        ($name:ident, $mode:expr, $expected_in_use:expr) => {
            #[test]
            fn $name() {
                let (mut buffer, _) = buffer();
                buffer.deck().replace(vec![
                    card("a"),
                    Card::empty(),
                    card("b"),
                    card("c"),
                ]);
                let mut modus = PentaFile::default();
                buffer.set_modus_input($mode);
                modus.load(&mut buffer).expect("load");
                let in_use: Vec<String> = modus
                    .to_deck()
                    .iter()
                    .enumerate()
                    .filter(|(_, card)| card.in_use())
                    .map(|(idx, card)| format!("{idx}:{}", card.item()))
                    .collect();
                let expected: Vec<&str> = $expected_in_use;
                assert_eq!(in_use, expected);
            }
        };
    }

    load_mode_case!(load_mode_reset, "0", vec![]);
    load_mode_case!(load_mode_positional, "1", vec!["0:A", "2:B", "3:C"]);
    load_mode_case!(load_mode_fast, "3", vec!["0:A", "1:B", "2:C"]);

    #[test]
    fn load_rejects_unknown_modes() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        buffer.set_modus_input("x");
        assert_eq!(
            modus.load(&mut buffer),
            Err(CommandError::runtime("x is not a number"))
        );
        buffer.set_modus_input("7");
        assert_eq!(
            modus.load(&mut buffer),
            Err(CommandError::runtime("7 is not a valid loading mode"))
        );
    }

    #[test]
    fn manual_load_walks_every_card() {
        let (mut buffer, log) = buffer();
        buffer.deck().replace(vec![card("axe"), Card::empty(), card("rope"), card("lamp")]);
        let mut modus = PentaFile::default();
        buffer.set_modus_input("2");
        modus.load(&mut buffer).expect("load");

        let answers = ["weapons", "basement", "skip", "INFO"];
        for answer in answers {
            let Some(Continuation::Step { step, data }) = buffer.take_redirector() else {
                panic!("expected a manual load step");
            };
            buffer.set_modus_input(answer);
            modus.resume(&step, &data, &mut buffer).expect("resume");
        }
        assert!(buffer.pending().is_none());
        assert_eq!(modus.folder("weapons").map(|f| f[0].clone()), Some(card("axe")));
        assert_eq!(modus.folder("info").map(|f| f[0].clone()), Some(card("lamp")));
        assert!(modus.to_deck().iter().all(|slot| slot.item() != "ROPE"));
        let text = log.contents();
        assert!(text.contains("`basement` is not a folder."));
        assert!(text.contains("Manual loading finished."));
    }

    #[test]
    fn manual_load_cancel_stops_early() {
        let (mut buffer, _) = buffer();
        buffer.deck().replace(vec![card("axe"), card("rope")]);
        let mut modus = PentaFile::default();
        buffer.set_modus_input("2");
        modus.load(&mut buffer).expect("load");
        let Some(Continuation::Step { step, data }) = buffer.take_redirector() else {
            panic!("expected a manual load step");
        };
        buffer.set_modus_input("cancel");
        modus.resume(&step, &data, &mut buffer).expect("resume");
        assert!(buffer.pending().is_none());
        assert!(modus.to_deck().iter().all(|slot| !slot.in_use()));
    }

    #[test]
    fn only_state_changes_are_flagged() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        modus.help(&args(&["capture"]), &mut buffer).expect("help");
        modus.not_understood(&[], &mut buffer).expect("fallback");
        modus
            .take_out_card(&args(&["1", "info"]), &mut buffer)
            .expect("empty slot");
        assert!(!buffer.take_changed());
        modus.capture(&args(&["kite"]), &mut buffer).expect("capture");
        assert!(buffer.take_changed());
    }

    #[test]
    fn unknown_step_is_fatal() {
        let (mut buffer, _) = buffer();
        let mut modus = PentaFile::default();
        let err = modus.resume("teleport", &[], &mut buffer).unwrap_err();
        assert!(matches!(err, CommandError::Fatal(_)));
    }

    #[test]
    fn display_shows_five_labelled_folders() {
        let display = DisplayBuffer::new();
        let mut buffer = ModusBuffer::new(display.clone(), TextLog::new());
        let mut modus = PentaFile::default();
        modus.draw_to_display(&mut buffer);
        let view = display.current().expect("view");
        let labels: Vec<&str> = view.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, FOLDER_NAMES.to_vec());
        assert_eq!(view.card_count(), PENTA_CAPACITY);
    }
}
